//! Engine-owned copy of a compressed access unit.

/// A compressed unit copied into a buffer with trailing zero padding.
///
/// Engines read the bitstream in word-sized chunks and may run past the last
/// payload byte; the padding keeps those reads inside the allocation and
/// deterministic.
#[derive(Debug, Clone)]
pub struct PaddedPacket {
    buf: Vec<u8>,
    size: usize,
}

impl PaddedPacket {
    /// Copy `data` into a new buffer of `data.len() + padding` bytes.
    pub fn copy_from(data: &[u8], padding: usize) -> Self {
        let mut buf = vec![0u8; data.len() + padding];
        buf[..data.len()].copy_from_slice(data);
        Self {
            buf,
            size: data.len(),
        }
    }

    /// Payload length, excluding padding.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The compressed unit itself.
    pub fn payload(&self) -> &[u8] {
        &self.buf[..self.size]
    }

    /// Payload followed by the zero padding.
    pub fn padded(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_is_zero_padded() {
        let src = [0xde, 0xad, 0xbe, 0xef];
        let packet = PaddedPacket::copy_from(&src, 64);
        assert_eq!(packet.size(), 4);
        assert_eq!(packet.payload(), &src);
        assert_eq!(packet.padded().len(), 68);
        assert!(packet.padded()[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn caller_buffer_can_be_reused() {
        let mut src = vec![1u8, 2, 3];
        let packet = PaddedPacket::copy_from(&src, 8);
        src.fill(9);
        assert_eq!(packet.payload(), &[1, 2, 3]);
    }
}
