use std::io::{Read, Write};

use crate::consts;
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::Result;

/// The names recorded for a neighbouring cabinet in a multi-cabinet set.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CabinetLink {
    cabinet_name: String,
    disk_name: String,
}

impl CabinetLink {
    /// Returns the file name of the linked cabinet.
    pub fn cabinet_name(&self) -> &str {
        &self.cabinet_name
    }

    /// Returns the user-readable name of the disk holding the linked cabinet.
    pub fn disk_name(&self) -> &str {
        &self.disk_name
    }

    fn parse<R: Read>(reader: &mut ByteReader<R>) -> Result<CabinetLink> {
        let cabinet_name = reader.read_null_terminated(consts::MAX_STRING_SIZE)?;
        let disk_name = reader.read_null_terminated(consts::MAX_STRING_SIZE)?;
        Ok(CabinetLink {
            cabinet_name: String::from_utf8_lossy(&cabinet_name).into_owned(),
            disk_name: String::from_utf8_lossy(&disk_name).into_owned(),
        })
    }

    fn serialized_size(&self) -> u32 {
        (self.cabinet_name.len() + self.disk_name.len() + 2) as u32
    }
}

/// The fixed cabinet header (CFHEADER), with its optional reserve area and
/// spanning links.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CabinetHeader {
    pub(crate) total_size: u32,
    pub(crate) first_file_offset: u32,
    pub(crate) minor_version: u8,
    pub(crate) major_version: u8,
    pub(crate) num_folders: u16,
    pub(crate) num_files: u16,
    pub(crate) flags: u16,
    pub(crate) set_id: u16,
    pub(crate) set_index: u16,
    pub(crate) reserve_data: Vec<u8>,
    pub(crate) folder_reserve_size: u8,
    pub(crate) data_reserve_size: u8,
    pub(crate) prev_cabinet: Option<CabinetLink>,
    pub(crate) next_cabinet: Option<CabinetLink>,
}

impl CabinetHeader {
    /// A header for a new, self-contained cabinet.  Sizes, offsets, and
    /// counts are filled in by the writer once the layout is known.
    pub(crate) fn new(set_id: u16, reserve_data: Vec<u8>) -> CabinetHeader {
        let flags = if reserve_data.is_empty() {
            0
        } else {
            consts::FLAG_RESERVE_PRESENT
        };
        CabinetHeader {
            minor_version: consts::VERSION_MINOR,
            major_version: consts::VERSION_MAJOR,
            flags,
            set_id,
            reserve_data,
            ..CabinetHeader::default()
        }
    }

    pub(crate) fn parse<R: Read>(
        reader: &mut ByteReader<R>,
    ) -> Result<CabinetHeader> {
        let signature = reader.read_u32()?;
        if signature != consts::FILE_SIGNATURE {
            format_error!("Not a cabinet file (invalid file signature)");
        }
        let _reserved1 = reader.read_u32()?;
        let total_size = reader.read_u32()?;
        if total_size > consts::MAX_TOTAL_CAB_SIZE {
            format_error!(
                "Cabinet total size field is too large \
                 ({} bytes; max is {} bytes)",
                total_size,
                consts::MAX_TOTAL_CAB_SIZE
            );
        }
        let _reserved2 = reader.read_u32()?;
        let first_file_offset = reader.read_u32()?;
        let _reserved3 = reader.read_u32()?;
        let minor_version = reader.read_u8()?;
        let major_version = reader.read_u8()?;
        if major_version > consts::VERSION_MAJOR
            || major_version == consts::VERSION_MAJOR
                && minor_version > consts::VERSION_MINOR
        {
            format_error!(
                "Version {}.{} cabinet files are not supported",
                major_version,
                minor_version
            );
        }
        let num_folders = reader.read_u16()?;
        let num_files = reader.read_u16()?;
        let flags = reader.read_u16()?;
        let set_id = reader.read_u16()?;
        let set_index = reader.read_u16()?;
        if set_index != 0 {
            format_error!(
                "Cabinet is number {} of a multi-cabinet set; spanned \
                 cabinets are not supported",
                set_index
            );
        }
        let mut header_reserve_size = 0u16;
        let mut folder_reserve_size = 0u8;
        let mut data_reserve_size = 0u8;
        if (flags & consts::FLAG_RESERVE_PRESENT) != 0 {
            header_reserve_size = reader.read_u16()?;
            folder_reserve_size = reader.read_u8()?;
            data_reserve_size = reader.read_u8()?;
        }
        if header_reserve_size as usize > consts::MAX_HEADER_RESERVE_SIZE {
            format_error!(
                "Cabinet header reserve data is too large \
                 ({} bytes; max is {} bytes)",
                header_reserve_size,
                consts::MAX_HEADER_RESERVE_SIZE
            );
        }
        let reserve_data = reader.read_bytes(header_reserve_size as usize)?;
        let prev_cabinet = if (flags & consts::FLAG_PREV_CABINET) != 0 {
            Some(CabinetLink::parse(reader)?)
        } else {
            None
        };
        let next_cabinet = if (flags & consts::FLAG_NEXT_CABINET) != 0 {
            Some(CabinetLink::parse(reader)?)
        } else {
            None
        };
        if prev_cabinet.is_some() || next_cabinet.is_some() {
            log::warn!(
                "Cabinet is linked to other cabinets in set {:#06x}; \
                 only members stored entirely in this cabinet are readable",
                set_id
            );
        }
        let header = CabinetHeader {
            total_size,
            first_file_offset,
            minor_version,
            major_version,
            num_folders,
            num_files,
            flags,
            set_id,
            set_index,
            reserve_data,
            folder_reserve_size,
            data_reserve_size,
            prev_cabinet,
            next_cabinet,
        };
        header.check_layout()?;
        Ok(header)
    }

    /// Checks that the counts and offsets describe a possible table layout.
    fn check_layout(&self) -> Result<()> {
        if self.num_files > 0 && self.num_folders == 0 {
            format_error!(
                "Cabinet lists {} files but has no folders to hold them",
                self.num_files
            );
        }
        let folder_table_end = self.first_folder_offset() as u64
            + self.num_folders as u64 * self.folder_entry_size() as u64;
        if (self.first_file_offset as u64) < folder_table_end {
            format_error!(
                "File table offset {} overlaps the folder table \
                 (which ends at offset {})",
                self.first_file_offset,
                folder_table_end
            );
        }
        let min_file_table_size =
            self.num_files as u64 * (consts::FILE_ENTRY_FIXED_SIZE as u64 + 1);
        if self.first_file_offset as u64 + min_file_table_size
            > self.total_size as u64
        {
            format_error!(
                "File table of {} entries at offset {} does not fit in a \
                 cabinet of {} bytes",
                self.num_files,
                self.first_file_offset,
                self.total_size
            );
        }
        Ok(())
    }

    pub(crate) fn write<W: Write>(&self, writer: &mut ByteWriter<W>) -> Result<()> {
        writer.write_u32(consts::FILE_SIGNATURE)?;
        writer.write_u32(0)?; // reserved1
        writer.write_u32(self.total_size)?;
        writer.write_u32(0)?; // reserved2
        writer.write_u32(self.first_file_offset)?;
        writer.write_u32(0)?; // reserved3
        writer.write_u8(self.minor_version)?;
        writer.write_u8(self.major_version)?;
        writer.write_u16(self.num_folders)?;
        writer.write_u16(self.num_files)?;
        writer.write_u16(self.flags)?;
        writer.write_u16(self.set_id)?;
        writer.write_u16(self.set_index)?;
        if self.has_reserve() {
            writer.write_u16(self.reserve_data.len() as u16)?;
            writer.write_u8(self.folder_reserve_size)?;
            writer.write_u8(self.data_reserve_size)?;
            writer.write_bytes(&self.reserve_data)?;
        }
        debug_assert!(self.prev_cabinet.is_none() && self.next_cabinet.is_none());
        Ok(())
    }

    fn has_reserve(&self) -> bool {
        (self.flags & consts::FLAG_RESERVE_PRESENT) != 0
    }

    /// The size of the header as serialized, which is also the offset of the
    /// first folder record.
    pub(crate) fn first_folder_offset(&self) -> u32 {
        let mut size = consts::HEADER_FIXED_SIZE;
        if self.has_reserve() {
            size += consts::HEADER_RESERVE_FIELDS_SIZE;
            size += self.reserve_data.len() as u32;
        }
        size += self.prev_cabinet.as_ref().map_or(0, |l| l.serialized_size());
        size += self.next_cabinet.as_ref().map_or(0, |l| l.serialized_size());
        size
    }

    pub(crate) fn folder_entry_size(&self) -> u32 {
        consts::FOLDER_ENTRY_FIXED_SIZE + self.folder_reserve_size as u32
    }

    /// Returns the total size of the cabinet file, in bytes, as recorded in
    /// the header.
    pub fn total_size(&self) -> u32 {
        self.total_size
    }

    /// Returns the format version as `(major, minor)`.
    pub fn version(&self) -> (u8, u8) {
        (self.major_version, self.minor_version)
    }

    /// Returns the number of folders in the cabinet.
    pub fn num_folders(&self) -> u16 {
        self.num_folders
    }

    /// Returns the number of file records in the cabinet.
    pub fn num_files(&self) -> u16 {
        self.num_files
    }

    /// Returns the cabinet set ID (an arbitrary number used to group
    /// together a set of cabinets).
    pub fn set_id(&self) -> u16 {
        self.set_id
    }

    /// Returns this cabinet's (zero-based) index within its set.
    pub fn set_index(&self) -> u16 {
        self.set_index
    }

    /// Returns the application-defined reserve data stored in the header.
    pub fn reserve_data(&self) -> &[u8] {
        &self.reserve_data
    }

    /// Returns the previous cabinet in the set, if the header names one.
    pub fn prev_cabinet(&self) -> Option<&CabinetLink> {
        self.prev_cabinet.as_ref()
    }

    /// Returns the next cabinet in the set, if the header names one.
    pub fn next_cabinet(&self) -> Option<&CabinetLink> {
        self.next_cabinet.as_ref()
    }
}
