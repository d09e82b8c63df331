/// Running CFDATA checksum.  Input is folded into the accumulator four bytes
/// at a time as little-endian words; a trailing partial word is folded in
/// with its bytes in reverse order, as the reference implementation does.
#[derive(Clone, Debug, Default)]
pub(crate) struct Checksum {
    value: u32,
    pending: [u8; 4],
    pending_len: usize,
}

impl Checksum {
    pub(crate) fn new() -> Checksum {
        Checksum::default()
    }

    /// Starts a checksum whose accumulator already holds `seed`.
    pub(crate) fn with_seed(seed: u32) -> Checksum {
        Checksum { value: seed, ..Checksum::default() }
    }

    pub(crate) fn update(&mut self, mut buf: &[u8]) {
        while self.pending_len > 0 && !buf.is_empty() {
            self.push_pending(buf[0]);
            buf = &buf[1..];
        }
        let mut words = buf.chunks_exact(4);
        for word in &mut words {
            self.value ^= u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
        }
        for &byte in words.remainder() {
            self.push_pending(byte);
        }
    }

    fn push_pending(&mut self, byte: u8) {
        self.pending[self.pending_len] = byte;
        self.pending_len += 1;
        if self.pending_len == 4 {
            self.value ^= u32::from_le_bytes(self.pending);
            self.pending_len = 0;
        }
    }

    pub(crate) fn value(&self) -> u32 {
        let tail = self.pending[..self.pending_len]
            .iter()
            .fold(0u32, |acc, &byte| (acc << 8) | byte as u32);
        self.value ^ tail
    }
}

/// Computes the checksum stored in a data block header.  The payload is
/// summed first; its sum seeds a second pass over the two size fields and
/// the block's reserve bytes.
pub(crate) fn data_block_checksum(
    compressed_size: u16,
    uncompressed_size: u16,
    reserve_data: &[u8],
    payload: &[u8],
) -> u32 {
    let mut payload_sum = Checksum::new();
    payload_sum.update(payload);
    let mut framing = Checksum::with_seed(payload_sum.value());
    framing.update(&compressed_size.to_le_bytes());
    framing.update(&uncompressed_size.to_le_bytes());
    framing.update(reserve_data);
    framing.value()
}

#[cfg(test)]
mod tests {
    use super::{data_block_checksum, Checksum};

    #[test]
    fn empty_checksum() {
        assert_eq!(Checksum::new().value(), 0);
        assert_eq!(data_block_checksum(0, 0, &[], &[]), 0);
    }

    #[test]
    fn partial_words_fold_in_reverse_byte_order() {
        let mut checksum = Checksum::new();
        checksum.update(b"\x01");
        assert_eq!(checksum.value(), 0x01);
        checksum.update(b"\x02");
        assert_eq!(checksum.value(), 0x0102);
        checksum.update(b"\x03");
        assert_eq!(checksum.value(), 0x010203);
        checksum.update(b"\x04");
        assert_eq!(checksum.value(), 0x04030201);
    }

    #[test]
    fn split_updates_match_single_update() {
        let data = b"The quick brown fox jumps over the lazy dog";
        let mut whole = Checksum::new();
        whole.update(data);
        for split in 0..data.len() {
            let mut parts = Checksum::new();
            parts.update(&data[..split]);
            parts.update(&data[split..]);
            assert_eq!(parts.value(), whole.value(), "split at {}", split);
        }
    }

    #[test]
    fn data_block_checksums() {
        assert_eq!(
            data_block_checksum(0x0e, 0x0e, &[], b"Hello, world!\n"),
            0x7f2e1a4c
        );
        assert_eq!(
            data_block_checksum(
                0x1d,
                0x1d,
                &[],
                b"Hello, world!\nSee you later!\n"
            ),
            0x3509541a
        );
        assert_eq!(
            data_block_checksum(0x09, 0x09, &[], b"Snowman!\n"),
            0x56080f3d
        );
    }

    #[test]
    fn reserve_bytes_are_folded_after_size_fields() {
        let payload = b"Hello, world!\n";
        assert_eq!(
            data_block_checksum(0x0e, 0x0e, b"\x01\x02\x03", payload),
            0x7f2f184f
        );
        // A three-byte tail is folded as one reversed partial word.
        assert_eq!(
            data_block_checksum(0x0e, 0x0e, b"\x01\x02\x03", payload)
                ^ data_block_checksum(0x0e, 0x0e, &[], payload),
            0x00010203
        );
    }

    #[test]
    fn checksum_from_cab_documentation() {
        // Data block from the sample cabinet in the format documentation.
        let payload: &[u8] = b"#include <stdio.h>\r\n\r\n\
              void main(void)\r\n{\r\n    \
              printf(\"Hello, world!\\n\");\r\n}\r\n\
              #include <stdio.h>\r\n\r\n\
              void main(void)\r\n{\r\n    \
              printf(\"Welcome!\\n\");\r\n}\r\n\r\n";
        assert_eq!(payload.len(), 0x97);
        assert_eq!(data_block_checksum(0x97, 0x97, &[], payload), 0x30a65abd);
    }
}
