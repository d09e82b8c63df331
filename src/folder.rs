use std::io::{Read, Write};
use std::slice;

use crate::ctype::CompressionType;
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::Result;

/// An iterator over the folder entries in a cabinet.
#[derive(Clone)]
pub struct FolderEntries<'a> {
    pub(crate) iter: slice::Iter<'a, FolderEntry>,
}

/// Metadata about one folder (compression unit) in a cabinet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FolderEntry {
    first_data_block_offset: u32,
    num_data_blocks: u16,
    compression_type: CompressionType,
    reserve_data: Vec<u8>,
    uncompressed_size: u64,
}

impl<'a> Iterator for FolderEntries<'a> {
    type Item = &'a FolderEntry;

    fn next(&mut self) -> Option<&'a FolderEntry> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a> ExactSizeIterator for FolderEntries<'a> {}

impl FolderEntry {
    pub(crate) fn new(
        compression_type: CompressionType,
        first_data_block_offset: u32,
        num_data_blocks: u16,
        uncompressed_size: u64,
    ) -> FolderEntry {
        FolderEntry {
            first_data_block_offset,
            num_data_blocks,
            compression_type,
            reserve_data: Vec::new(),
            uncompressed_size,
        }
    }

    /// Returns the scheme used to compress this folder's data.
    pub fn compression_type(&self) -> CompressionType {
        self.compression_type
    }

    /// Returns the number of data blocks used to store this folder's data.
    pub fn num_data_blocks(&self) -> u16 {
        self.num_data_blocks
    }

    /// Returns the offset of the folder's first data block within the
    /// cabinet.
    pub fn first_data_block_offset(&self) -> u32 {
        self.first_data_block_offset
    }

    /// Returns the application-defined reserve data for this folder.
    pub fn reserve_data(&self) -> &[u8] {
        &self.reserve_data
    }

    /// Returns the length of the folder's decompressed stream, as declared
    /// by its data blocks.
    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    pub(crate) fn set_uncompressed_size(&mut self, size: u64) {
        self.uncompressed_size = size;
    }

    pub(crate) fn write<W: Write>(
        &self,
        writer: &mut ByteWriter<W>,
        reserve_size: usize,
    ) -> Result<()> {
        writer.write_u32(self.first_data_block_offset)?;
        writer.write_u16(self.num_data_blocks)?;
        writer.write_u16(self.compression_type.to_bitfield())?;
        if reserve_size > 0 {
            writer.write_padded(&self.reserve_data, reserve_size)?;
        }
        Ok(())
    }
}

/// Parses one folder record.  The folder's uncompressed size is unknown
/// until its data blocks have been scanned.
pub(crate) fn parse_folder_entry<R: Read>(
    reader: &mut ByteReader<R>,
    reserve_size: usize,
) -> Result<FolderEntry> {
    let first_data_block_offset = reader.read_u32()?;
    let num_data_blocks = reader.read_u16()?;
    let compression_bits = reader.read_u16()?;
    let compression_type = CompressionType::from_bitfield(compression_bits)?;
    let reserve_data = reader.read_bytes(reserve_size)?;
    Ok(FolderEntry {
        first_data_block_offset,
        num_data_blocks,
        compression_type,
        reserve_data,
        uncompressed_size: 0,
    })
}
