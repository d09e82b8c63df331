use std::io::{Read, Write};
use std::slice;

use time::PrimitiveDateTime;

use crate::consts;
use crate::cursor::{ByteReader, ByteWriter};
use crate::datetime::DosDateTime;
use crate::error::Result;

/// An iterator over file entries.
#[derive(Clone)]
pub struct FileEntries<'a> {
    pub(crate) iter: slice::Iter<'a, FileEntry>,
}

/// How a file name is encoded on disk, as selected by the "name is UTF"
/// attribute bit.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NameEncoding {
    /// Single-byte legacy encoding; each byte maps to the code point of the
    /// same value.
    Legacy,
    /// UTF-8.
    Utf8,
}

impl NameEncoding {
    /// Picks the encoding a writer should use for `name`.
    pub(crate) fn for_name(name: &str) -> NameEncoding {
        if name.is_ascii() {
            NameEncoding::Legacy
        } else {
            NameEncoding::Utf8
        }
    }

    fn decode(self, bytes: &[u8]) -> String {
        match self {
            NameEncoding::Legacy => bytes.iter().map(|&b| b as char).collect(),
            NameEncoding::Utf8 => match String::from_utf8(bytes.to_vec()) {
                Ok(name) => name,
                Err(error) => {
                    log::warn!("File name is not valid UTF-8: {}", error);
                    String::from_utf8_lossy(error.as_bytes()).into_owned()
                }
            },
        }
    }

    fn encode(self, name: &str) -> Vec<u8> {
        match self {
            NameEncoding::Legacy => name.chars().map(|c| c as u8).collect(),
            NameEncoding::Utf8 => name.as_bytes().to_vec(),
        }
    }
}

/// Metadata about one file stored in a cabinet.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FileEntry {
    name: String,
    encoding: NameEncoding,
    datetime: DosDateTime,
    uncompressed_size: u32,
    attributes: u16,
    pub(crate) folder_index: u16,
    pub(crate) uncompressed_offset: u32,
}

impl<'a> Iterator for FileEntries<'a> {
    type Item = &'a FileEntry;

    fn next(&mut self) -> Option<&'a FileEntry> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a> ExactSizeIterator for FileEntries<'a> {}

impl FileEntry {
    /// Builds a record for the writer.  The UTF attribute bit is set or
    /// cleared to agree with the encoding chosen for `name`.
    pub(crate) fn new(
        name: String,
        attributes: u16,
        datetime: DosDateTime,
        folder_index: u16,
        uncompressed_offset: u32,
        uncompressed_size: u32,
    ) -> FileEntry {
        let encoding = NameEncoding::for_name(&name);
        let attributes = match encoding {
            NameEncoding::Legacy => attributes & !consts::ATTR_NAME_IS_UTF,
            NameEncoding::Utf8 => attributes | consts::ATTR_NAME_IS_UTF,
        };
        FileEntry {
            name,
            encoding,
            datetime,
            uncompressed_size,
            attributes,
            folder_index,
            uncompressed_offset,
        }
    }

    /// Returns the name of file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns how the name is encoded in the cabinet.
    pub fn name_encoding(&self) -> NameEncoding {
        self.encoding
    }

    /// Returns the datetime for this file.  In the CAB format, this
    /// "is typically considered the 'last modified' time in local time, but
    /// the actual definition is application-defined."
    ///
    /// Note that this will return [`None`] if the datetime in the cabinet file
    /// was not a valid date/time.
    pub fn datetime(&self) -> Option<PrimitiveDateTime> {
        self.datetime.to_datetime()
    }

    /// Returns the raw DOS date and time words for this file.
    pub fn dos_datetime(&self) -> DosDateTime {
        self.datetime
    }

    /// Returns the total size of the file when decompressed, in bytes.
    pub fn uncompressed_size(&self) -> u32 {
        self.uncompressed_size
    }

    /// Returns the index of the folder holding this file's data.
    pub fn folder_index(&self) -> u16 {
        self.folder_index
    }

    /// Returns the offset of this file's data within its folder's
    /// decompressed stream.
    pub fn uncompressed_offset(&self) -> u32 {
        self.uncompressed_offset
    }

    /// Returns the raw attribute bits.
    pub fn attributes(&self) -> u16 {
        self.attributes
    }

    /// Returns true if this file has the "read-only" attribute set.
    pub fn is_read_only(&self) -> bool {
        (self.attributes & consts::ATTR_READ_ONLY) != 0
    }

    /// Returns true if this file has the "hidden" attribute set.
    pub fn is_hidden(&self) -> bool {
        (self.attributes & consts::ATTR_HIDDEN) != 0
    }

    /// Returns true if this file has the "system file" attribute set.
    pub fn is_system(&self) -> bool {
        (self.attributes & consts::ATTR_SYSTEM) != 0
    }

    /// Returns true if this file has the "archive" (modified since last
    /// backup) attribute set.
    pub fn is_archive(&self) -> bool {
        (self.attributes & consts::ATTR_ARCH) != 0
    }

    /// Returns true if this file has the "execute after extraction" attribute
    /// set.
    pub fn is_exec(&self) -> bool {
        (self.attributes & consts::ATTR_EXEC) != 0
    }

    /// Returns true if this file has the "name is UTF" attribute set.
    pub fn is_name_utf(&self) -> bool {
        (self.attributes & consts::ATTR_NAME_IS_UTF) != 0
    }

    /// The number of bytes this record occupies in the file table.
    pub(crate) fn serialized_size(&self) -> u32 {
        consts::FILE_ENTRY_FIXED_SIZE + self.encoded_name().len() as u32 + 1
    }

    fn encoded_name(&self) -> Vec<u8> {
        self.encoding.encode(&self.name)
    }

    pub(crate) fn write<W: Write>(&self, writer: &mut ByteWriter<W>) -> Result<()> {
        writer.write_u32(self.uncompressed_size)?;
        writer.write_u32(self.uncompressed_offset)?;
        writer.write_u16(self.folder_index)?;
        writer.write_u16(self.datetime.date_bits())?;
        writer.write_u16(self.datetime.time_bits())?;
        writer.write_u16(self.attributes)?;
        writer.write_null_terminated(&self.encoded_name())
    }
}

/// Checks that `name` can be stored as a file name and returns its encoded
/// length.
pub(crate) fn validate_file_name(name: &str) -> Result<usize> {
    if name.is_empty() {
        invalid_input!("File name must not be empty");
    }
    if name.contains('\0') {
        invalid_input!("File name {:?} contains a NUL character", name);
    }
    let len = NameEncoding::for_name(name).encode(name).len();
    if len > consts::MAX_STRING_SIZE {
        invalid_input!(
            "File name {:?} is too long ({} bytes; max is {} bytes)",
            name,
            len,
            consts::MAX_STRING_SIZE
        );
    }
    Ok(len)
}

pub(crate) fn parse_file_entry<R: Read>(
    reader: &mut ByteReader<R>,
) -> Result<FileEntry> {
    let uncompressed_size = reader.read_u32()?;
    let uncompressed_offset = reader.read_u32()?;
    let folder_index = reader.read_u16()?;
    let date = reader.read_u16()?;
    let time = reader.read_u16()?;
    let attributes = reader.read_u16()?;
    let encoding = if (attributes & consts::ATTR_NAME_IS_UTF) != 0 {
        NameEncoding::Utf8
    } else {
        NameEncoding::Legacy
    };
    let name_bytes = reader.read_null_terminated(consts::MAX_STRING_SIZE)?;
    Ok(FileEntry {
        name: encoding.decode(&name_bytes),
        encoding,
        datetime: DosDateTime::from_bits(date, time),
        uncompressed_size,
        attributes,
        folder_index,
        uncompressed_offset,
    })
}
