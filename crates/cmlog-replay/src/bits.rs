//! Byte-aligned big-endian packing primitives.
//!
//! [`BitWriter`] appends unsigned integers of 1 to 8 bytes, most
//! significant byte first, to a growable buffer. [`BitReader`] walks an
//! already complete buffer with a forward-only cursor. Running out of
//! input is an ordinary [`BitError::UnexpectedEnd`] result, never a panic.

use std::fmt;

/// Errors produced by [`BitReader`] and [`BitWriter::write_data`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BitError {
    /// A read needed more bytes than remain in the buffer.
    UnexpectedEnd {
        /// Bytes the read asked for.
        requested: usize,
        /// Bytes left at the cursor.
        available: usize,
        /// Cursor position when the read was attempted.
        position: usize,
    },
    /// A blob is longer than its 2-byte length prefix can describe.
    DataTooLong {
        /// Length of the rejected blob.
        len: usize,
    },
}

impl fmt::Display for BitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEnd {
                requested,
                available,
                position,
            } => write!(
                f,
                "unexpected end of bit input stream at byte {position}: \
                 needed {requested} bytes, {available} available"
            ),
            Self::DataTooLong { len } => {
                write!(f, "blob of {len} bytes exceeds the 65535-byte length prefix")
            }
        }
    }
}

impl std::error::Error for BitError {}

/// Appends big-endian integers and length-prefixed blobs to a byte buffer.
///
/// # Examples
///
/// ```
/// use cmlog_replay::bits::{BitReader, BitWriter};
///
/// let mut w = BitWriter::new();
/// w.write_bytes(0x0102_0304, 4);
/// w.write_bytes(0xABCD, 2);
/// assert_eq!(w.as_bytes(), &[1, 2, 3, 4, 0xAB, 0xCD]);
///
/// let mut r = BitReader::new(w.as_bytes());
/// assert_eq!(r.read_bytes(4).unwrap(), 0x0102_0304);
/// assert_eq!(r.read_bytes(2).unwrap(), 0xABCD);
/// assert!(r.is_eof());
/// ```
#[derive(Clone, Debug, Default)]
pub struct BitWriter {
    buf: Vec<u8>,
}

impl BitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Create a writer with room for `bytes` bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: Vec::with_capacity(bytes),
        }
    }

    /// Pre-allocate room for `bytes` more bytes.
    pub fn reserve(&mut self, bytes: usize) {
        self.buf.reserve(bytes);
    }

    /// Append the low `amount` bytes of `value`, most significant first.
    ///
    /// Bits above `amount * 8` are dropped. `amount` is clamped to 4.
    pub fn write_bytes(&mut self, value: u32, amount: usize) {
        self.write_bytes64(u64::from(value), amount.min(4));
    }

    /// 64-bit counterpart of [`write_bytes`](Self::write_bytes); `amount`
    /// is clamped to 8.
    pub fn write_bytes64(&mut self, value: u64, amount: usize) {
        for i in (0..amount.min(8)).rev() {
            self.buf.push((value >> (i * 8)) as u8);
        }
    }

    /// Append a signed monetary amount as its 8-byte two's complement pattern.
    pub fn write_money(&mut self, value: i64) {
        self.write_bytes64(value as u64, 8);
    }

    /// Append a 2-byte length followed by `data`.
    ///
    /// Nothing is written if `data` is longer than a 2-byte length can
    /// describe.
    pub fn write_data(&mut self, data: &[u8]) -> Result<(), BitError> {
        let len =
            u16::try_from(data.len()).map_err(|_| BitError::DataTooLong { len: data.len() })?;
        self.write_bytes(u32::from(len), 2);
        self.buf.extend_from_slice(data);
        Ok(())
    }

    /// Append `count` zero bytes.
    pub fn write_zeros(&mut self, count: usize) {
        self.buf.resize(self.buf.len() + count, 0);
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of bytes written so far.
    pub fn byte_size(&self) -> usize {
        self.buf.len()
    }

    /// Consume the writer and return its buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Forward-only reader over a complete byte buffer.
#[derive(Clone, Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Start reading `data` from its first byte.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current cursor position in bytes.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// The unread tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Whether the cursor has reached the end of the buffer.
    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(&mut self, amount: usize) -> Result<&'a [u8], BitError> {
        if amount > self.remaining() {
            return Err(BitError::UnexpectedEnd {
                requested: amount,
                available: self.remaining(),
                position: self.pos,
            });
        }
        let bytes = &self.data[self.pos..self.pos + amount];
        self.pos += amount;
        Ok(bytes)
    }

    /// Read `amount` bytes as a big-endian unsigned integer.
    ///
    /// `amount` is clamped to 4, so no byte read is ever lost to the
    /// `u32` result. On failure the cursor does not move.
    pub fn read_bytes(&mut self, amount: usize) -> Result<u32, BitError> {
        Ok(self.read_bytes64(amount.min(4))? as u32)
    }

    /// 64-bit counterpart of [`read_bytes`](Self::read_bytes); `amount` is
    /// clamped to 8.
    pub fn read_bytes64(&mut self, amount: usize) -> Result<u64, BitError> {
        let bytes = self.take(amount.min(8))?;
        Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    /// Read an 8-byte signed monetary amount.
    pub fn read_money(&mut self) -> Result<i64, BitError> {
        Ok(self.read_bytes64(8)? as i64)
    }

    /// Read a 2-byte length and then that many bytes, as an owned buffer.
    ///
    /// If the blob itself is truncated the cursor stays after the length.
    pub fn read_data(&mut self) -> Result<Vec<u8>, BitError> {
        let len = self.read_bytes(2)? as usize;
        Ok(self.take(len)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_big_endian() {
        let mut w = BitWriter::new();
        w.write_bytes(0x12, 1);
        w.write_bytes(0x3456, 2);
        w.write_bytes(0x789ABC, 3);
        assert_eq!(w.as_bytes(), &[0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC]);
        assert_eq!(w.byte_size(), 6);
    }

    #[test]
    fn wide_values_truncate_to_low_bytes() {
        let mut w = BitWriter::new();
        w.write_bytes(0xAABB_CCDD, 2);
        w.write_bytes64(0x1122_3344_5566_7788, 3);
        assert_eq!(w.as_bytes(), &[0xCC, 0xDD, 0x66, 0x77, 0x88]);
    }

    #[test]
    fn oversized_widths_are_clamped() {
        let mut w = BitWriter::new();
        w.write_bytes(0xAABB_CCDD, 6);
        w.write_bytes64(0x0102_0304_0506_0708, 11);
        assert_eq!(w.byte_size(), 12);

        let bytes = w.into_bytes();
        let mut r = BitReader::new(&bytes);
        assert_eq!(r.read_bytes(6).unwrap(), 0xAABB_CCDD);
        assert_eq!(r.position(), 4);
        assert_eq!(r.read_bytes64(11).unwrap(), 0x0102_0304_0506_0708);
        assert!(r.is_eof());
    }

    #[test]
    fn max_values_survive_every_width() {
        for amount in 1..=4 {
            let max = if amount == 4 {
                u32::MAX
            } else {
                (1u32 << (amount * 8)) - 1
            };
            let mut w = BitWriter::new();
            w.write_bytes(max, amount);
            let mut r = BitReader::new(w.as_bytes());
            assert_eq!(r.read_bytes(amount).unwrap(), max);
        }
        for amount in 1..=8 {
            let max = if amount == 8 {
                u64::MAX
            } else {
                (1u64 << (amount * 8)) - 1
            };
            let mut w = BitWriter::new();
            w.write_bytes64(max, amount);
            let mut r = BitReader::new(w.as_bytes());
            assert_eq!(r.read_bytes64(amount).unwrap(), max);
        }
    }

    #[test]
    fn money_keeps_sign() {
        let mut w = BitWriter::new();
        w.write_money(-1);
        w.write_money(i64::MIN);
        w.write_money(1_000_000_000_000);
        assert_eq!(&w.as_bytes()[..8], &[0xFF; 8]);
        let mut r = BitReader::new(w.as_bytes());
        assert_eq!(r.read_money().unwrap(), -1);
        assert_eq!(r.read_money().unwrap(), i64::MIN);
        assert_eq!(r.read_money().unwrap(), 1_000_000_000_000);
    }

    #[test]
    fn data_is_length_prefixed() {
        let mut w = BitWriter::new();
        w.write_data(b"abc").unwrap();
        assert_eq!(w.as_bytes(), &[0, 3, b'a', b'b', b'c']);
        let bytes = w.into_bytes();
        let mut r = BitReader::new(&bytes);
        assert_eq!(r.read_data().unwrap(), b"abc".to_vec());
        assert!(r.is_eof());
    }

    #[test]
    fn oversized_data_is_refused() {
        let mut w = BitWriter::new();
        assert_eq!(
            w.write_data(&vec![0u8; 65_536]),
            Err(BitError::DataTooLong { len: 65_536 })
        );
        assert_eq!(w.byte_size(), 0);
        assert!(w.write_data(&vec![7u8; 65_535]).is_ok());
        assert_eq!(w.byte_size(), 65_537);
    }

    #[test]
    fn short_read_reports_unexpected_end() {
        let data = [1u8, 2, 3];
        let mut r = BitReader::new(&data);
        assert_eq!(r.read_bytes(2).unwrap(), 0x0102);
        let err = r.read_bytes(2).unwrap_err();
        assert_eq!(
            err,
            BitError::UnexpectedEnd {
                requested: 2,
                available: 1,
                position: 2,
            }
        );
        assert_eq!(r.position(), 2);
        assert_eq!(r.read_bytes(1).unwrap(), 3);
        assert!(r.is_eof());
    }

    #[test]
    fn truncated_blob_fails() {
        let data = [0u8, 5, 1, 2];
        let mut r = BitReader::new(&data);
        assert!(matches!(
            r.read_data(),
            Err(BitError::UnexpectedEnd { requested: 5, available: 2, .. })
        ));
    }

    #[test]
    fn zeros_extend_buffer() {
        let mut w = BitWriter::with_capacity(8);
        w.write_bytes(1, 1);
        w.write_zeros(3);
        assert_eq!(w.as_bytes(), &[1, 0, 0, 0]);
    }
}
