use std::io;

use thiserror::Error;

/// Errors that can occur while reading or writing a cabinet.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The underlying stream or filesystem failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The cabinet header, folder table, file table, or data block framing
    /// is malformed or unsupported.  This includes input that ends before
    /// the structures it declares.
    #[error("Malformed cabinet: {0}")]
    Format(String),

    /// A data block's stored checksum does not match its contents.
    #[error(
        "Checksum error in data block {block} of folder {folder} \
         (expected {expected:08x}, actual {actual:08x})"
    )]
    Integrity {
        /// Index of the folder containing the damaged block.
        folder: usize,
        /// Index of the damaged block within its folder.
        block: usize,
        /// The checksum stored in the block.
        expected: u32,
        /// The checksum computed over the block's contents.
        actual: u32,
    },

    /// No member with the requested name exists in the cabinet.
    #[error("No such member in cabinet: {0:?}")]
    MemberNotFound(String),

    /// The operation is not allowed in the handle's current state (for
    /// example, staging a member after the archive was finalized).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A caller-supplied value cannot be represented in a cabinet.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Extracting the member would write outside the destination directory.
    #[error("Unsafe member path: {0:?}")]
    UnsafePath(String),

    /// The folder uses a compression scheme with no available codec.
    #[error("Unsupported compression: {0}")]
    UnsupportedCompression(String),
}

/// A specialized `Result` type for cabinet operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for io::Error {
    fn from(error: Error) -> io::Error {
        let kind = match error {
            Error::Io(error) => return error,
            Error::Format(_) | Error::Integrity { .. } => {
                io::ErrorKind::InvalidData
            }
            Error::MemberNotFound(_) => io::ErrorKind::NotFound,
            Error::InvalidInput(_) | Error::UnsafePath(_) => {
                io::ErrorKind::InvalidInput
            }
            Error::InvalidState(_) | Error::UnsupportedCompression(_) => {
                io::ErrorKind::Other
            }
        };
        io::Error::new(kind, error)
    }
}
