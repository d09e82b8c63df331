//! A library for reading/writing [Windows
//! cabinet](https://en.wikipedia.org/wiki/Cabinet_(file_format)) (CAB) files.
//!
//! [`ArchiveReader`] parses a cabinet's header, folder table, and file table
//! up front and decodes member data on demand.  [`ArchiveWriter`] collects
//! members in memory and serializes the whole cabinet in one pass.
//! [`CabFile`] wraps both behind a file-backed handle with `namelist`,
//! `read`, `extractall`, and `writestr` operations.
//!
//! ```
//! use std::io::Cursor;
//! use cabfile::{ArchiveReader, ArchiveWriter};
//!
//! # fn main() -> cabfile::Result<()> {
//! let mut writer = ArchiveWriter::new();
//! writer.stage_member("hello.txt", "hi")?;
//! writer.stage_member("data.bin", vec![0u8, 1, 2])?;
//! let bytes = writer.finalize()?;
//!
//! let mut reader = ArchiveReader::new(Cursor::new(bytes))?;
//! assert_eq!(reader.list_members(), vec!["hello.txt", "data.bin"]);
//! assert_eq!(reader.read_member("hello.txt")?, b"hi");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

#[macro_use]
mod macros;

mod block;
mod cabfile;
mod checksum;
mod consts;
mod ctype;
mod cursor;
mod datetime;
mod error;
mod extract;
mod file;
mod folder;
mod header;
mod mszip;
mod reader;
mod writer;

pub use crate::block::{ChecksumPolicy, IntegrityGap};
pub use crate::cabfile::{CabFile, CabInfo, Mode};
pub use crate::ctype::{
    default_codec, BlockCodec, CodecFactory, CompressionType, StoredCodec,
};
pub use crate::datetime::DosDateTime;
pub use crate::error::{Error, Result};
pub use crate::extract::destination_path;
pub use crate::file::{FileEntries, FileEntry, NameEncoding};
pub use crate::folder::{FolderEntries, FolderEntry};
pub use crate::header::{CabinetHeader, CabinetLink};
pub use crate::reader::{ArchiveReader, ReadOptions};
pub use crate::writer::{ArchiveWriter, MemberBuilder, WriteOptions};
