//! A file-backed handle with the familiar "open, list, read, extract,
//! write" archive workflow, layered over [`ArchiveReader`] and
//! [`ArchiveWriter`].

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use tempfile::NamedTempFile;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::ctype::CompressionType;
use crate::error::{Error, Result};
use crate::file::FileEntry;
use crate::reader::ArchiveReader;
use crate::writer::{ArchiveWriter, MemberBuilder, WriteOptions};

/// How a [`CabFile`] is opened.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mode {
    /// Read an existing cabinet.
    Read,
    /// Create a new cabinet, replacing any existing file on close.
    Write,
    /// Keep the members of an existing cabinet (if there is one) and add
    /// more.  The cabinet is rewritten on close.
    Append,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(mode: &str) -> Result<Mode> {
        match mode {
            "r" => Ok(Mode::Read),
            "w" => Ok(Mode::Write),
            "a" => Ok(Mode::Append),
            _ => invalid_input!(
                "Invalid mode {:?} (expected \"r\", \"w\", or \"a\")",
                mode
            ),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self {
            Mode::Read => "r",
            Mode::Write => "w",
            Mode::Append => "a",
        };
        f.write_str(mode)
    }
}

/// Metadata about one member, as returned by [`CabFile::getinfo`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CabInfo {
    filename: String,
    file_size: u32,
    date_time: Option<PrimitiveDateTime>,
    attributes: u16,
    compress_type: CompressionType,
    folder_index: u16,
}

impl CabInfo {
    fn new(entry: &FileEntry, compress_type: CompressionType) -> CabInfo {
        CabInfo {
            filename: entry.name().to_string(),
            file_size: entry.uncompressed_size(),
            date_time: entry.datetime(),
            attributes: entry.attributes(),
            compress_type,
            folder_index: entry.folder_index(),
        }
    }

    /// The member's name.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The member's uncompressed size in bytes.
    pub fn file_size(&self) -> u32 {
        self.file_size
    }

    /// The member's timestamp, or `None` if the stored one is invalid.
    pub fn date_time(&self) -> Option<PrimitiveDateTime> {
        self.date_time
    }

    /// The raw attribute bits.
    pub fn attributes(&self) -> u16 {
        self.attributes
    }

    /// The compression of the folder holding the member.
    pub fn compress_type(&self) -> CompressionType {
        self.compress_type
    }

    /// The index of the folder holding the member.
    pub fn folder_index(&self) -> u16 {
        self.folder_index
    }
}

enum Handle {
    Reading(ArchiveReader<BufReader<File>>),
    Writing(ArchiveWriter),
    Closed,
}

/// A cabinet file on disk, opened for reading, writing, or appending.
///
/// Writes are collected in memory and the cabinet is written when the
/// handle is closed, either explicitly with [`close`](CabFile::close) or
/// when it is dropped.  The new cabinet goes to a temporary file next to
/// the target and is renamed into place, so a failed close leaves any
/// existing file untouched.
///
/// ```no_run
/// use cabfile::{CabFile, Mode};
///
/// # fn main() -> cabfile::Result<()> {
/// let mut cab = CabFile::open("example.cab", Mode::Write)?;
/// cab.writestr("readme.txt", "Hello, world!\n")?;
/// cab.close()?;
///
/// let mut cab = CabFile::open("example.cab", Mode::Read)?;
/// assert_eq!(cab.namelist()?, vec!["readme.txt".to_string()]);
/// assert_eq!(cab.read("readme.txt")?, b"Hello, world!\n");
/// # Ok(())
/// # }
/// ```
pub struct CabFile {
    path: PathBuf,
    mode: Mode,
    handle: Handle,
}

impl CabFile {
    /// Opens the cabinet at `path`.  New members are stored uncompressed.
    pub fn open<P: AsRef<Path>>(path: P, mode: Mode) -> Result<CabFile> {
        CabFile::open_with_compression(path, mode, CompressionType::None)
    }

    /// Opens the cabinet at `path`, storing new members with the given
    /// compression.  The compression is ignored in read mode.
    pub fn open_with_compression<P: AsRef<Path>>(
        path: P,
        mode: Mode,
        compression: CompressionType,
    ) -> Result<CabFile> {
        let path = path.as_ref().to_path_buf();
        let options = WriteOptions::new().compression(compression);
        let handle = match mode {
            Mode::Read => {
                let file = BufReader::new(File::open(&path)?);
                Handle::Reading(ArchiveReader::new(file)?)
            }
            Mode::Write => Handle::Writing(ArchiveWriter::with_options(options)),
            Mode::Append => Handle::Writing(restage(&path, options)?),
        };
        log::debug!("Opened {} in mode {:?}", path.display(), mode);
        Ok(CabFile { path, mode, handle })
    }

    /// Returns the path this handle was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the mode this handle was opened with.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns true once the handle has been closed.
    pub fn is_closed(&self) -> bool {
        matches!(self.handle, Handle::Closed)
    }

    /// Returns the member names: in file-table order when reading, in
    /// staging order when writing.
    pub fn namelist(&self) -> Result<Vec<String>> {
        let names = match &self.handle {
            Handle::Reading(reader) => reader.list_members(),
            Handle::Writing(writer) => writer.staged_names(),
            Handle::Closed => invalid_state!("Cannot list a closed cabinet"),
        };
        Ok(names.into_iter().map(str::to_string).collect())
    }

    /// Returns metadata for every member, in file-table order.
    pub fn infolist(&self) -> Result<Vec<CabInfo>> {
        let reader = self.reader("list members of")?;
        Ok(reader
            .file_entries()
            .map(|entry| CabInfo::new(entry, folder_compression(reader, entry)))
            .collect())
    }

    /// Returns metadata for the named member.
    pub fn getinfo(&self, name: &str) -> Result<CabInfo> {
        let reader = self.reader("get info from")?;
        let entry = reader.stat(name)?;
        Ok(CabInfo::new(entry, folder_compression(reader, entry)))
    }

    /// Returns the contents of the named member.
    pub fn read(&mut self, name: &str) -> Result<Vec<u8>> {
        self.reader_mut("read from")?.read_member(name)
    }

    /// Extracts the named member below `dest_dir`.
    pub fn extract<P: AsRef<Path>>(
        &mut self,
        name: &str,
        dest_dir: P,
    ) -> Result<PathBuf> {
        self.reader_mut("extract from")?.extract_member(name, dest_dir)
    }

    /// Extracts every member below `dest_dir`.
    pub fn extractall<P: AsRef<Path>>(
        &mut self,
        dest_dir: P,
    ) -> Result<Vec<PathBuf>> {
        self.reader_mut("extract from")?.extract_all(dest_dir)
    }

    /// Adds a member with the given contents.
    pub fn writestr<S, D>(
        &mut self,
        name: S,
        data: D,
    ) -> Result<&mut MemberBuilder>
    where
        S: Into<String>,
        D: Into<Vec<u8>>,
    {
        self.writer("write to")?.stage_member(name, data)
    }

    /// Adds the file at `path` as a member, taking its timestamp from the
    /// file's modification time.  Without an `arcname`, the member is named
    /// after `path` with any root, `.` and `..` components removed and `\`
    /// between the rest.
    pub fn write<P: AsRef<Path>>(
        &mut self,
        path: P,
        arcname: Option<&str>,
    ) -> Result<&mut MemberBuilder> {
        let path = path.as_ref();
        let name = match arcname {
            Some(name) => name.to_string(),
            None => default_arcname(path)?,
        };
        let writer = self.writer("write to")?;
        let data = fs::read(path)?;
        let modified = fs::metadata(path)?.modified()?;
        let modified = OffsetDateTime::from(modified);
        let member = writer.stage_member(name, data)?;
        member.set_datetime(PrimitiveDateTime::new(
            modified.date(),
            modified.time(),
        ));
        Ok(member)
    }

    /// Closes the handle.  In write and append mode this serializes the
    /// cabinet and atomically replaces the file at the handle's path.  If
    /// serializing or writing fails the handle stays open with its members
    /// staged, so `close` can be retried; closing an already closed handle
    /// does nothing.
    pub fn close(&mut self) -> Result<()> {
        if let Handle::Writing(writer) = &mut self.handle {
            let path = &self.path;
            writer.finalize_with(|bytes| write_atomically(path, bytes))?;
        }
        self.handle = Handle::Closed;
        Ok(())
    }

    fn reader(&self, action: &str) -> Result<&ArchiveReader<BufReader<File>>> {
        match &self.handle {
            Handle::Reading(reader) => Ok(reader),
            Handle::Writing(_) => {
                invalid_state!("Cannot {} a cabinet opened for writing", action)
            }
            Handle::Closed => invalid_state!("Cannot {} a closed cabinet", action),
        }
    }

    fn reader_mut(
        &mut self,
        action: &str,
    ) -> Result<&mut ArchiveReader<BufReader<File>>> {
        match &mut self.handle {
            Handle::Reading(reader) => Ok(reader),
            Handle::Writing(_) => {
                invalid_state!("Cannot {} a cabinet opened for writing", action)
            }
            Handle::Closed => invalid_state!("Cannot {} a closed cabinet", action),
        }
    }

    fn writer(&mut self, action: &str) -> Result<&mut ArchiveWriter> {
        match &mut self.handle {
            Handle::Writing(writer) => Ok(writer),
            Handle::Reading(_) => {
                invalid_state!("Cannot {} a cabinet opened for reading", action)
            }
            Handle::Closed => invalid_state!("Cannot {} a closed cabinet", action),
        }
    }
}

impl Drop for CabFile {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            log::error!("Failed to close {}: {}", self.path.display(), error);
        }
    }
}

fn folder_compression<R>(reader: &ArchiveReader<R>, entry: &FileEntry) -> CompressionType
where
    R: std::io::Read + std::io::Seek,
{
    reader
        .folder_entries()
        .nth(entry.folder_index() as usize)
        .map_or(CompressionType::None, |folder| folder.compression_type())
}

/// Stages every member of the cabinet at `path`, if it exists, with its
/// original metadata.  Members from stored and MSZIP folders keep their
/// compression; others are recompressed with the writer's default.
fn restage(path: &Path, options: WriteOptions) -> Result<ArchiveWriter> {
    let mut writer = ArchiveWriter::with_options(options);
    if !path.exists() {
        return Ok(writer);
    }
    let mut reader = ArchiveReader::new(BufReader::new(File::open(path)?))?;
    let entries: Vec<(FileEntry, CompressionType)> = reader
        .file_entries()
        .map(|entry| (entry.clone(), folder_compression(&reader, entry)))
        .collect();
    for (entry, ctype) in entries {
        let data = reader.read_member(entry.name())?;
        let member = writer.stage_member(entry.name(), data)?;
        member.set_attributes(entry.attributes());
        member.set_dos_datetime(entry.dos_datetime());
        if matches!(ctype, CompressionType::None | CompressionType::MsZip) {
            member.set_compression_type(ctype);
        }
    }
    log::debug!("Restaged {} members from {}", writer.len(), path.display());
    Ok(writer)
}

fn default_arcname(path: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        if let Component::Normal(part) = component {
            match part.to_str() {
                Some(part) => parts.push(part),
                None => invalid_input!(
                    "Path {} is not valid Unicode; pass an explicit member name",
                    path.display()
                ),
            }
        }
    }
    if parts.is_empty() {
        invalid_input!("Cannot derive a member name from {}", path.display());
    }
    Ok(parts.join("\\"))
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|error| error.error)?;
    log::debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
