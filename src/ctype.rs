use std::fmt;

use lzxd::Lzxd;

use crate::error::{Error, Result};
use crate::mszip::MsZipCodec;

const CTYPE_NONE: u16 = 0;
const CTYPE_MSZIP: u16 = 1;
const CTYPE_QUANTUM: u16 = 2;
const CTYPE_LZX: u16 = 3;

const QUANTUM_LEVEL_MIN: u16 = 1;
const QUANTUM_LEVEL_MAX: u16 = 7;
const QUANTUM_MEMORY_MIN: u16 = 10;
const QUANTUM_MEMORY_MAX: u16 = 21;

/// A scheme for compressing data within the cabinet.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub enum CompressionType {
    /// No compression ("stored").
    #[default]
    None,
    /// MSZIP compression.  MSZIP is described further in
    /// [MS-MCI](https://msdn.microsoft.com/en-us/library/cc483131.aspx).
    MsZip,
    /// Quantum compression with the given level and memory.
    Quantum(u16, u16),
    /// LZX compression with the given window size.  The LZX compression scheme
    /// is described further in
    /// [MS-PATCH](https://msdn.microsoft.com/en-us/library/cc483133.aspx).
    Lzx(lzxd::WindowSize),
}

impl CompressionType {
    pub(crate) fn from_bitfield(bits: u16) -> Result<CompressionType> {
        match bits & 0x000f {
            CTYPE_NONE => Ok(CompressionType::None),
            CTYPE_MSZIP => Ok(CompressionType::MsZip),
            CTYPE_QUANTUM => {
                let level = (bits & 0x00f0) >> 4;
                if !(QUANTUM_LEVEL_MIN..=QUANTUM_LEVEL_MAX).contains(&level) {
                    format_error!("Invalid Quantum level: 0x{:02x}", level);
                }
                let memory = (bits & 0x1f00) >> 8;
                if !(QUANTUM_MEMORY_MIN..=QUANTUM_MEMORY_MAX).contains(&memory)
                {
                    format_error!("Invalid Quantum memory: 0x{:02x}", memory);
                }
                Ok(CompressionType::Quantum(level, memory))
            }
            CTYPE_LZX => {
                let window = match (bits & 0x1f00) >> 8 {
                    15 => lzxd::WindowSize::KB32,
                    16 => lzxd::WindowSize::KB64,
                    17 => lzxd::WindowSize::KB128,
                    18 => lzxd::WindowSize::KB256,
                    19 => lzxd::WindowSize::KB512,
                    20 => lzxd::WindowSize::MB1,
                    21 => lzxd::WindowSize::MB2,
                    22 => lzxd::WindowSize::MB4,
                    23 => lzxd::WindowSize::MB8,
                    24 => lzxd::WindowSize::MB16,
                    25 => lzxd::WindowSize::MB32,
                    window => {
                        format_error!("Invalid LZX window: 0x{:02x}", window)
                    }
                };
                Ok(CompressionType::Lzx(window))
            }
            _ => format_error!("Invalid compression type: 0x{:04x}", bits),
        }
    }

    pub(crate) fn to_bitfield(self) -> u16 {
        match self {
            CompressionType::None => CTYPE_NONE,
            CompressionType::MsZip => CTYPE_MSZIP,
            CompressionType::Quantum(level, memory) => {
                CTYPE_QUANTUM
                    | (level.clamp(QUANTUM_LEVEL_MIN, QUANTUM_LEVEL_MAX) << 4)
                    | (memory.clamp(QUANTUM_MEMORY_MIN, QUANTUM_MEMORY_MAX)
                        << 8)
            }
            CompressionType::Lzx(window_size) => {
                let window: u16 = match window_size {
                    lzxd::WindowSize::KB32 => 15,
                    lzxd::WindowSize::KB64 => 16,
                    lzxd::WindowSize::KB128 => 17,
                    lzxd::WindowSize::KB256 => 18,
                    lzxd::WindowSize::KB512 => 19,
                    lzxd::WindowSize::MB1 => 20,
                    lzxd::WindowSize::MB2 => 21,
                    lzxd::WindowSize::MB4 => 22,
                    lzxd::WindowSize::MB8 => 23,
                    lzxd::WindowSize::MB16 => 24,
                    lzxd::WindowSize::MB32 => 25,
                };
                CTYPE_LZX | (window << 8)
            }
        }
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionType::None => f.write_str("stored"),
            CompressionType::MsZip => f.write_str("MSZIP"),
            CompressionType::Quantum(level, memory) => {
                write!(f, "Quantum (level {}, memory {})", level, memory)
            }
            CompressionType::Lzx(window) => write!(f, "LZX ({:?})", window),
        }
    }
}

/// Transforms data block payloads between their raw form and the form stored
/// in the cabinet.
///
/// One codec instance handles the blocks of one folder, in order; codecs may
/// carry state (such as a compression dictionary) from one block to the
/// next.
pub trait BlockCodec {
    /// Encodes up to 32 KiB of raw data as one block payload.
    /// `is_last_block` is true for the final block of the folder.
    fn compress_block(
        &mut self,
        data: &[u8],
        is_last_block: bool,
    ) -> Result<Vec<u8>>;

    /// Decodes one block payload, which must expand to exactly
    /// `uncompressed_size` bytes.
    fn decompress_block(
        &mut self,
        data: &[u8],
        uncompressed_size: usize,
    ) -> Result<Vec<u8>>;

    /// Forgets any state carried between blocks, ready to start a new folder.
    fn reset(&mut self) {}
}

/// Selects the codec for a folder's compression type.  Supply a custom
/// factory through [`ReadOptions`](crate::ReadOptions) or
/// [`WriteOptions`](crate::WriteOptions) to plug in other codecs.
pub type CodecFactory = fn(CompressionType) -> Result<Box<dyn BlockCodec>>;

/// The built-in codecs: stored and MSZIP in both directions, LZX for reading
/// only, and no Quantum support.
pub fn default_codec(ctype: CompressionType) -> Result<Box<dyn BlockCodec>> {
    match ctype {
        CompressionType::None => Ok(Box::new(StoredCodec)),
        CompressionType::MsZip => Ok(Box::new(MsZipCodec::new())),
        CompressionType::Lzx(window_size) => {
            Ok(Box::new(LzxCodec::new(window_size)))
        }
        CompressionType::Quantum(_, _) => Err(Error::UnsupportedCompression(
            "Quantum compression is not supported".to_string(),
        )),
    }
}

/// The identity codec used by uncompressed folders.
#[derive(Clone, Copy, Debug, Default)]
pub struct StoredCodec;

impl BlockCodec for StoredCodec {
    fn compress_block(&mut self, data: &[u8], _: bool) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress_block(
        &mut self,
        data: &[u8],
        uncompressed_size: usize,
    ) -> Result<Vec<u8>> {
        if data.len() != uncompressed_size {
            format_error!(
                "Stored data block has {} payload bytes but declares {} \
                 uncompressed bytes",
                data.len(),
                uncompressed_size
            );
        }
        Ok(data.to_vec())
    }
}

struct LzxCodec {
    window_size: lzxd::WindowSize,
    decompressor: Box<Lzxd>,
}

impl LzxCodec {
    fn new(window_size: lzxd::WindowSize) -> LzxCodec {
        LzxCodec { window_size, decompressor: Box::new(Lzxd::new(window_size)) }
    }
}

impl BlockCodec for LzxCodec {
    fn compress_block(&mut self, _: &[u8], _: bool) -> Result<Vec<u8>> {
        Err(Error::UnsupportedCompression(format!(
            "LZX compression is not supported (window {:?})",
            self.window_size
        )))
    }

    fn decompress_block(
        &mut self,
        data: &[u8],
        uncompressed_size: usize,
    ) -> Result<Vec<u8>> {
        match self.decompressor.decompress_next(data, uncompressed_size) {
            Ok(output) => Ok(output.to_vec()),
            Err(error) => format_error!("LZX decompression failed: {}", error),
        }
    }

    fn reset(&mut self) {
        self.decompressor.reset();
    }
}
