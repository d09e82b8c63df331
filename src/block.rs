use std::io::{Read, Seek, Write};
use std::ops::Range;

use crate::checksum::data_block_checksum;
use crate::consts;
use crate::ctype::BlockCodec;
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{Error, Result};
use crate::folder::FolderEntry;

/// How the reader reacts to a data block whose checksum does not match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ChecksumPolicy {
    /// Fail the read with [`Error::Integrity`].  Blocks whose stored
    /// checksum is zero carry no checksum and are accepted unverified, as
    /// other CAB readers do.  Note that a block's genuine checksum can come
    /// out as zero, in which case the writer stores zero too.
    #[default]
    Strict,
    /// Log a warning, record an [`IntegrityGap`], and keep going.
    Ignore,
}

/// A data block whose checksum did not match, recorded when reading under
/// [`ChecksumPolicy::Ignore`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct IntegrityGap {
    /// Index of the folder containing the block.
    pub folder: usize,
    /// Index of the block within the folder.
    pub block: usize,
    /// The bytes of the folder's decompressed stream that came from the
    /// block.  If the block could not be decoded at all, this range was
    /// filled with zeros.
    pub range: Range<u64>,
    /// True if the range holds zeros instead of decoded data.
    pub zero_filled: bool,
}

/// One framed CFDATA block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DataBlock {
    checksum: u32,
    compressed_size: u16,
    uncompressed_size: u16,
    reserve_data: Vec<u8>,
    payload: Vec<u8>,
}

impl DataBlock {
    pub(crate) fn parse<R: Read>(
        reader: &mut ByteReader<R>,
        reserve_size: usize,
    ) -> Result<DataBlock> {
        let checksum = reader.read_u32()?;
        let compressed_size = reader.read_u16()?;
        let uncompressed_size = reader.read_u16()?;
        let reserve_data = reader.read_bytes(reserve_size)?;
        let payload = reader.read_bytes(compressed_size as usize)?;
        Ok(DataBlock {
            checksum,
            compressed_size,
            uncompressed_size,
            reserve_data,
            payload,
        })
    }

    /// Runs `raw` through the codec and frames the result, computing sizes
    /// and checksum.
    pub(crate) fn encode(
        codec: &mut dyn BlockCodec,
        raw: &[u8],
        is_last_block: bool,
    ) -> Result<DataBlock> {
        debug_assert!(raw.len() <= consts::MAX_UNCOMPRESSED_BLOCK_SIZE);
        let payload = codec.compress_block(raw, is_last_block)?;
        if payload.len() > u16::MAX as usize {
            format_error!(
                "Compressed data block is too large ({} bytes; max is {} bytes)",
                payload.len(),
                u16::MAX
            );
        }
        let compressed_size = payload.len() as u16;
        let uncompressed_size = raw.len() as u16;
        let checksum = data_block_checksum(
            compressed_size,
            uncompressed_size,
            &[],
            &payload,
        );
        Ok(DataBlock {
            checksum,
            compressed_size,
            uncompressed_size,
            reserve_data: Vec::new(),
            payload,
        })
    }

    pub(crate) fn computed_checksum(&self) -> u32 {
        data_block_checksum(
            self.compressed_size,
            self.uncompressed_size,
            &self.reserve_data,
            &self.payload,
        )
    }

    /// Returns `Err((expected, actual))` if the stored checksum is non-zero
    /// and disagrees with the block contents.  A zero checksum means none
    /// was recorded.
    pub(crate) fn verify(&self) -> std::result::Result<(), (u32, u32)> {
        if self.checksum == 0 {
            return Ok(());
        }
        let actual = self.computed_checksum();
        if actual == self.checksum {
            Ok(())
        } else {
            Err((self.checksum, actual))
        }
    }

    pub(crate) fn decode(&self, codec: &mut dyn BlockCodec) -> Result<Vec<u8>> {
        let expected = self.uncompressed_size as usize;
        let data = codec.decompress_block(&self.payload, expected)?;
        if data.len() != expected {
            format_error!(
                "Data block decoded to {} bytes but declares {} bytes",
                data.len(),
                expected
            );
        }
        Ok(data)
    }

    pub(crate) fn uncompressed_size(&self) -> u16 {
        self.uncompressed_size
    }

    pub(crate) fn serialized_size(&self) -> u32 {
        consts::DATA_BLOCK_HEADER_SIZE
            + self.reserve_data.len() as u32
            + self.compressed_size as u32
    }

    pub(crate) fn write<W: Write>(&self, writer: &mut ByteWriter<W>) -> Result<()> {
        writer.write_u32(self.checksum)?;
        writer.write_u16(self.compressed_size)?;
        writer.write_u16(self.uncompressed_size)?;
        writer.write_bytes(&self.reserve_data)?;
        writer.write_bytes(&self.payload)
    }
}

/// Splits a folder's decompressed stream into block-sized pieces and encodes
/// each one.  An empty stream needs no blocks.
pub(crate) fn frame_folder(
    stream: &[u8],
    codec: &mut dyn BlockCodec,
) -> Result<Vec<DataBlock>> {
    let num_blocks = stream.len().div_ceil(consts::MAX_UNCOMPRESSED_BLOCK_SIZE);
    if num_blocks > consts::MAX_NUM_DATA_BLOCKS {
        invalid_input!(
            "Folder needs too many data blocks ({}; max is {})",
            num_blocks,
            consts::MAX_NUM_DATA_BLOCKS
        );
    }
    let mut blocks = Vec::with_capacity(num_blocks);
    for (index, chunk) in
        stream.chunks(consts::MAX_UNCOMPRESSED_BLOCK_SIZE).enumerate()
    {
        let block = DataBlock::encode(codec, chunk, index + 1 == num_blocks)?;
        log::trace!(
            "Framed data block {}: {} -> {} bytes",
            index,
            chunk.len(),
            block.compressed_size
        );
        blocks.push(block);
    }
    Ok(blocks)
}

/// Walks the headers of a folder's data blocks without decoding them,
/// returning the length of the folder's decompressed stream.  Fails if any
/// block runs past `stream_end`.
pub(crate) fn scan_folder<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    base: u64,
    folder: &FolderEntry,
    reserve_size: usize,
    stream_end: u64,
) -> Result<u64> {
    reader.seek_to(base + folder.first_data_block_offset() as u64)?;
    let mut total_size = 0u64;
    for index in 0..folder.num_data_blocks() {
        let _checksum = reader.read_u32()?;
        let compressed_size = reader.read_u16()?;
        let uncompressed_size = reader.read_u16()?;
        if uncompressed_size as usize > consts::MAX_UNCOMPRESSED_BLOCK_SIZE {
            format_error!(
                "Data block {} declares {} uncompressed bytes (max is {})",
                index,
                uncompressed_size,
                consts::MAX_UNCOMPRESSED_BLOCK_SIZE
            );
        }
        let block_end = reader.position()
            + reserve_size as u64
            + compressed_size as u64;
        if block_end > stream_end {
            format_error!(
                "Data block {} ends at offset {}, past the end of the \
                 cabinet ({} bytes)",
                index,
                block_end - base,
                stream_end - base
            );
        }
        reader.skip(reserve_size as u64 + compressed_size as u64)?;
        total_size += uncompressed_size as u64;
    }
    Ok(total_size)
}

/// Reads and decodes a folder's data blocks in order, returning the
/// concatenated decompressed stream.
#[allow(clippy::too_many_arguments)]
pub(crate) fn decode_folder<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    base: u64,
    folder_index: usize,
    folder: &FolderEntry,
    reserve_size: usize,
    codec: &mut dyn BlockCodec,
    policy: ChecksumPolicy,
    gaps: &mut Vec<IntegrityGap>,
) -> Result<Vec<u8>> {
    reader.seek_to(base + folder.first_data_block_offset() as u64)?;
    codec.reset();
    let mut output = Vec::new();
    for index in 0..folder.num_data_blocks() as usize {
        let block = DataBlock::parse(reader, reserve_size)?;
        output.reserve(block.uncompressed_size() as usize);
        let start = output.len() as u64;
        let range = start..(start + block.uncompressed_size() as u64);
        match block.verify() {
            Ok(()) => output.extend(block.decode(codec)?),
            Err((expected, actual)) => match policy {
                ChecksumPolicy::Strict => {
                    return Err(Error::Integrity {
                        folder: folder_index,
                        block: index,
                        expected,
                        actual,
                    });
                }
                ChecksumPolicy::Ignore => {
                    log::warn!(
                        "Ignoring checksum error in data block {} of folder \
                         {} (expected {:08x}, actual {:08x})",
                        index,
                        folder_index,
                        expected,
                        actual
                    );
                    let zero_filled = match block.decode(codec) {
                        Ok(data) => {
                            output.extend(data);
                            false
                        }
                        Err(error) => {
                            log::warn!(
                                "Damaged data block {} of folder {} could \
                                 not be decoded: {}",
                                index,
                                folder_index,
                                error
                            );
                            output.resize(range.end as usize, 0);
                            true
                        }
                    };
                    gaps.push(IntegrityGap {
                        folder: folder_index,
                        block: index,
                        range,
                        zero_filled,
                    });
                }
            },
        }
        log::trace!(
            "Decoded data block {} of folder {} ({} bytes)",
            index,
            folder_index,
            block.uncompressed_size()
        );
    }
    Ok(output)
}
