use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression;

use crate::ctype::BlockCodec;
use crate::error::Result;

const MSZIP_SIGNATURE: [u8; 2] = *b"CK";
const MSZIP_BLOCK_TERMINATOR: u16 = 0x0003;
const DEFLATE_MAX_DICT_LEN: usize = 0x8000;
const STORED_BLOCK_OVERHEAD: usize = 7;

/// The MSZIP codec: each block is a "CK" signature followed by a raw deflate
/// stream, with the last 32 KiB of output carried over as the dictionary for
/// the next block of the same folder.
pub(crate) struct MsZipCodec {
    compressor: flate2::Compress,
    decompressor: flate2::Decompress,
    dictionary: Vec<u8>,
}

impl MsZipCodec {
    pub(crate) fn new() -> MsZipCodec {
        MsZipCodec {
            compressor: flate2::Compress::new(Compression::best(), false),
            decompressor: flate2::Decompress::new(false),
            dictionary: Vec::with_capacity(DEFLATE_MAX_DICT_LEN),
        }
    }

    /// Builds a block holding `data` as a single uncompressed deflate block.
    fn stored_block(data: &[u8]) -> Result<Vec<u8>> {
        let len = data.len() as u16;
        let mut out = Vec::with_capacity(data.len() + STORED_BLOCK_OVERHEAD);
        out.extend_from_slice(&MSZIP_SIGNATURE);
        out.push(1); // final block, type 00 (stored)
        out.write_u16::<LittleEndian>(len)?;
        out.write_u16::<LittleEndian>(!len)?;
        out.extend_from_slice(data);
        Ok(out)
    }

    /// Primes the decompressor with the previous block's output by feeding
    /// it through as a stored (non-final) deflate block.
    fn prime_dictionary(&mut self) -> Result<()> {
        debug_assert!(self.dictionary.len() <= DEFLATE_MAX_DICT_LEN);
        let len = self.dictionary.len() as u16;
        let mut chunk = Vec::with_capacity(self.dictionary.len() + 5);
        chunk.push(0);
        chunk.write_u16::<LittleEndian>(len)?;
        chunk.write_u16::<LittleEndian>(!len)?;
        chunk.extend_from_slice(&self.dictionary);
        let mut discard = Vec::with_capacity(self.dictionary.len());
        let flush = flate2::FlushDecompress::Sync;
        match self.decompressor.decompress_vec(&chunk, &mut discard, flush) {
            Ok(flate2::Status::Ok) => Ok(()),
            Ok(status) => format_error!(
                "MSZIP decompression failed: Could not restore dictionary \
                 ({:?})",
                status
            ),
            Err(error) => format_error!("MSZIP decompression failed: {}", error),
        }
    }

    fn remember_output(&mut self, out: &[u8]) {
        if out.len() >= DEFLATE_MAX_DICT_LEN {
            self.dictionary.clear();
            self.dictionary
                .extend_from_slice(&out[out.len() - DEFLATE_MAX_DICT_LEN..]);
        } else {
            let total = self.dictionary.len() + out.len();
            if total > DEFLATE_MAX_DICT_LEN {
                self.dictionary.drain(..(total - DEFLATE_MAX_DICT_LEN));
            }
            self.dictionary.extend_from_slice(out);
        }
    }
}

impl BlockCodec for MsZipCodec {
    fn compress_block(
        &mut self,
        data: &[u8],
        is_last_block: bool,
    ) -> Result<Vec<u8>> {
        debug_assert!(data.len() <= DEFLATE_MAX_DICT_LEN);
        let mut out = Vec::<u8>::with_capacity(0xffff);
        out.extend_from_slice(&MSZIP_SIGNATURE);
        let flush = if is_last_block {
            flate2::FlushCompress::Finish
        } else {
            flate2::FlushCompress::Sync
        };
        if let Err(error) = self.compressor.compress_vec(data, &mut out, flush)
        {
            format_error!("MSZIP compression failed: {}", error);
        }
        if !is_last_block {
            out.write_u16::<LittleEndian>(MSZIP_BLOCK_TERMINATOR)?;
        }
        if out.len() > data.len() + STORED_BLOCK_OVERHEAD {
            return MsZipCodec::stored_block(data);
        }
        Ok(out)
    }

    fn decompress_block(
        &mut self,
        data: &[u8],
        uncompressed_size: usize,
    ) -> Result<Vec<u8>> {
        if data.len() < MSZIP_SIGNATURE.len()
            || data[..MSZIP_SIGNATURE.len()] != MSZIP_SIGNATURE
        {
            format_error!("MSZIP decompression failed: Invalid block signature");
        }
        let data = &data[MSZIP_SIGNATURE.len()..];
        self.decompressor.reset(false);
        if !self.dictionary.is_empty() {
            self.prime_dictionary()?;
        }
        let mut out = Vec::<u8>::with_capacity(uncompressed_size);
        let flush = flate2::FlushDecompress::Finish;
        if let Err(error) = self.decompressor.decompress_vec(data, &mut out, flush)
        {
            format_error!("MSZIP decompression failed: {}", error);
        }
        if out.len() != uncompressed_size {
            format_error!(
                "MSZIP decompression failed: Incorrect uncompressed size \
                 (expected {}, was actually {})",
                uncompressed_size,
                out.len()
            );
        }
        self.remember_output(&out);
        Ok(out)
    }

    fn reset(&mut self) {
        self.compressor.reset();
        self.decompressor.reset(false);
        self.dictionary.clear();
    }
}
