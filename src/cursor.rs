//! Little-endian byte cursors that track their position in the cabinet.

use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

/// Converts a short read into a format error; the cabinet declared more data
/// than it actually holds.
fn map_read_error(error: io::Error) -> Error {
    if error.kind() == io::ErrorKind::UnexpectedEof {
        Error::Format("Unexpected end of data (cabinet is truncated)".into())
    } else {
        Error::Io(error)
    }
}

pub(crate) struct ByteReader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> ByteReader<R> {
    pub(crate) fn new(inner: R, position: u64) -> ByteReader<R> {
        ByteReader { inner, position }
    }

    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        let value = self.inner.read_u8().map_err(map_read_error)?;
        self.position += 1;
        Ok(value)
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        let value =
            self.inner.read_u16::<LittleEndian>().map_err(map_read_error)?;
        self.position += 2;
        Ok(value)
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        let value =
            self.inner.read_u32::<LittleEndian>().map_err(map_read_error)?;
        self.position += 4;
        Ok(value)
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; len];
        self.inner.read_exact(&mut bytes).map_err(map_read_error)?;
        self.position += len as u64;
        Ok(bytes)
    }

    /// Reads bytes up to (and consuming) a NUL terminator.  The terminator
    /// is not included in the result.
    pub(crate) fn read_null_terminated(
        &mut self,
        max_len: usize,
    ) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(max_len);
        loop {
            let byte = self.read_u8()?;
            if byte == 0 {
                break;
            } else if bytes.len() == max_len {
                format_error!(
                    "String longer than maximum of {} bytes at offset {}",
                    max_len,
                    self.position
                );
            }
            bytes.push(byte);
        }
        Ok(bytes)
    }

    pub(crate) fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ByteReader<R> {
    pub(crate) fn seek_to(&mut self, position: u64) -> Result<()> {
        self.position = self.inner.seek(SeekFrom::Start(position))?;
        Ok(())
    }

    pub(crate) fn skip(&mut self, len: u64) -> Result<()> {
        self.seek_to(self.position + len)
    }

    /// Returns the total length of the underlying stream without moving the
    /// cursor.
    pub(crate) fn stream_len(&mut self) -> Result<u64> {
        let len = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(self.position))?;
        Ok(len)
    }
}

pub(crate) struct ByteWriter<W> {
    inner: W,
    position: u64,
}

impl<W: Write> ByteWriter<W> {
    pub(crate) fn new(inner: W) -> ByteWriter<W> {
        ByteWriter { inner, position: 0 }
    }

    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    pub(crate) fn write_u8(&mut self, value: u8) -> Result<()> {
        self.inner.write_u8(value)?;
        self.position += 1;
        Ok(())
    }

    pub(crate) fn write_u16(&mut self, value: u16) -> Result<()> {
        self.inner.write_u16::<LittleEndian>(value)?;
        self.position += 2;
        Ok(())
    }

    pub(crate) fn write_u32(&mut self, value: u32) -> Result<()> {
        self.inner.write_u32::<LittleEndian>(value)?;
        self.position += 4;
        Ok(())
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    /// Writes `bytes` and pads with zeros up to `len` bytes in total.
    pub(crate) fn write_padded(
        &mut self,
        bytes: &[u8],
        len: usize,
    ) -> Result<()> {
        debug_assert!(bytes.len() <= len);
        self.write_bytes(bytes)?;
        if len > bytes.len() {
            self.write_bytes(&vec![0u8; len - bytes.len()])?;
        }
        Ok(())
    }

    pub(crate) fn write_null_terminated(&mut self, bytes: &[u8]) -> Result<()> {
        debug_assert!(!bytes.contains(&0));
        self.write_bytes(bytes)?;
        self.write_u8(0)
    }

    pub(crate) fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{ByteReader, ByteWriter};
    use crate::error::Error;

    #[test]
    fn reads_little_endian_fields() {
        let data: &[u8] = b"\x01\x34\x12\x78\x56\x34\x12hi\0";
        let mut reader = ByteReader::new(Cursor::new(data), 0);
        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_u32().unwrap(), 0x12345678);
        assert_eq!(reader.position(), 7);
        assert_eq!(reader.read_null_terminated(255).unwrap(), b"hi");
        assert_eq!(reader.position(), 10);
    }

    #[test]
    fn short_input_is_a_format_error() {
        let data: &[u8] = b"\x01\x02\x03";
        let mut reader = ByteReader::new(Cursor::new(data), 0);
        match reader.read_u32() {
            Err(Error::Format(_)) => {}
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn overlong_string_is_rejected() {
        let data = vec![b'a'; 10];
        let mut reader = ByteReader::new(Cursor::new(data), 0);
        assert!(matches!(
            reader.read_null_terminated(4),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn seeking_keeps_position_in_sync() {
        let data: &[u8] = b"\0\0\0\0\xff\xee";
        let mut reader = ByteReader::new(Cursor::new(data), 0);
        reader.skip(4).unwrap();
        assert_eq!(reader.stream_len().unwrap(), 6);
        assert_eq!(reader.position(), 4);
        assert_eq!(reader.read_u16().unwrap(), 0xeeff);
    }

    #[test]
    fn writes_little_endian_fields() {
        let mut writer = ByteWriter::new(Vec::new());
        writer.write_u8(0x01).unwrap();
        writer.write_u16(0x1234).unwrap();
        writer.write_u32(0x12345678).unwrap();
        writer.write_null_terminated(b"hi").unwrap();
        writer.write_padded(b"\xaa", 3).unwrap();
        assert_eq!(writer.position(), 13);
        assert_eq!(
            writer.into_inner(),
            b"\x01\x34\x12\x78\x56\x34\x12hi\0\xaa\0\0"
        );
    }
}
