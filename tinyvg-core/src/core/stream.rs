use super::error::{TvgError, TvgResult};

/// A bounds-checked read cursor over an in-memory TinyVG buffer.
///
/// The stream borrows the caller's bytes and never copies them. Every read
/// that would run past the end fails with `InvalidData`, which is how the
/// decoder turns truncated input into an error instead of a panic.
#[derive(Debug, Clone)]
pub struct Stream<'a> {
    /// The underlying byte buffer
    bytes: &'a [u8],
    /// Current read position
    pos: usize,
}

impl<'a> Stream<'a> {
    /// Creates a new stream positioned at the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Stream { bytes, pos: 0 }
    }

    pub fn length(&self) -> usize {
        self.bytes.len()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn get_byte(&mut self) -> TvgResult<u8> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| self.eof_error(1))?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads `length` bytes as a borrowed slice.
    pub fn get_bytes(&mut self, length: usize) -> TvgResult<&'a [u8]> {
        if length > self.remaining() {
            return Err(self.eof_error(length));
        }
        let bytes = &self.bytes[self.pos..self.pos + length];
        self.pos += length;
        Ok(bytes)
    }

    fn get_array<const N: usize>(&mut self) -> TvgResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.get_bytes(N)?);
        Ok(out)
    }

    pub fn get_u16_le(&mut self) -> TvgResult<u16> {
        Ok(u16::from_le_bytes(self.get_array()?))
    }

    pub fn get_u32_le(&mut self) -> TvgResult<u32> {
        Ok(u32::from_le_bytes(self.get_array()?))
    }

    pub fn get_i8(&mut self) -> TvgResult<i8> {
        Ok(self.get_byte()? as i8)
    }

    pub fn get_i16_le(&mut self) -> TvgResult<i16> {
        Ok(i16::from_le_bytes(self.get_array()?))
    }

    pub fn get_i32_le(&mut self) -> TvgResult<i32> {
        Ok(i32::from_le_bytes(self.get_array()?))
    }

    pub fn get_f32_le(&mut self) -> TvgResult<f32> {
        Ok(f32::from_le_bytes(self.get_array()?))
    }

    /// Reads a variable-length unsigned integer.
    ///
    /// Seven payload bits per byte, least significant group first, bit 7 set
    /// on every byte except the last. At most five bytes; the value must fit
    /// in a `u32`.
    pub fn get_var_uint(&mut self) -> TvgResult<u32> {
        let mut result: u32 = 0;
        for index in 0..5 {
            let byte = self.get_byte()?;
            let payload = u32::from(byte & 0x7F);
            if index == 4 && payload > 0x0F {
                return Err(TvgError::invalid(format!(
                    "VarUInt at offset {} overflows 32 bits",
                    self.pos - 5
                )));
            }
            result |= payload << (7 * index);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(TvgError::invalid(format!(
            "VarUInt at offset {} is longer than 5 bytes",
            self.pos - 5
        )))
    }

    /// Fails unless at least `count * item_size` bytes remain.
    ///
    /// Called before allocating storage for a length read from the input, so
    /// a hostile count can never reserve more memory than the input could
    /// possibly describe.
    pub fn ensure_available(&self, count: usize, item_size: usize, what: &str) -> TvgResult<()> {
        let needed = count
            .checked_mul(item_size)
            .ok_or_else(|| TvgError::invalid(format!("{} count {} overflows", what, count)))?;
        if needed > self.remaining() {
            return Err(TvgError::invalid(format!(
                "{} count {} needs at least {} bytes but only {} remain",
                what,
                count,
                needed,
                self.remaining()
            )));
        }
        Ok(())
    }

    fn eof_error(&self, wanted: usize) -> TvgError {
        TvgError::invalid(format!(
            "unexpected end of data: wanted {} byte(s) at offset {} of {}",
            wanted,
            self.pos,
            self.bytes.len()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_creation() {
        let data = [1, 2, 3, 4, 5];
        let stream = Stream::new(&data);

        assert_eq!(stream.length(), 5);
        assert_eq!(stream.pos(), 0);
        assert_eq!(stream.remaining(), 5);
    }

    #[test]
    fn test_get_byte() {
        let data = [10, 20, 30];
        let mut stream = Stream::new(&data);

        assert_eq!(stream.get_byte().unwrap(), 10);
        assert_eq!(stream.get_byte().unwrap(), 20);
        assert_eq!(stream.pos(), 2);
        assert_eq!(stream.get_byte().unwrap(), 30);
        assert!(stream.get_byte().unwrap_err().is_invalid_data());
    }

    #[test]
    fn test_read_past_end() {
        let data = [1];
        let mut stream = Stream::new(&data);
        stream.get_byte().unwrap();
        assert!(stream.get_byte().unwrap_err().is_invalid_data());
        assert!(stream.is_at_end());
    }

    #[test]
    fn test_little_endian() {
        let data = [0x34, 0x12, 0xFE, 0xFF, 0x00, 0x00, 0x80, 0x3F];
        let mut stream = Stream::new(&data);
        assert_eq!(stream.get_u16_le().unwrap(), 0x1234);
        assert_eq!(stream.get_i16_le().unwrap(), -2);
        assert_eq!(stream.get_f32_le().unwrap(), 1.0);
    }

    #[test]
    fn test_partial_multibyte_read_fails() {
        let data = [0x01, 0x02, 0x03];
        let mut stream = Stream::new(&data);
        assert!(stream.get_u32_le().is_err());
        // A failed read does not advance.
        assert_eq!(stream.pos(), 0);
    }

    #[test]
    fn test_var_uint() {
        let mut stream = Stream::new(&[0x00]);
        assert_eq!(stream.get_var_uint().unwrap(), 0);

        let mut stream = Stream::new(&[0x7F]);
        assert_eq!(stream.get_var_uint().unwrap(), 127);

        let mut stream = Stream::new(&[0x80, 0x01]);
        assert_eq!(stream.get_var_uint().unwrap(), 128);

        let mut stream = Stream::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
        assert_eq!(stream.get_var_uint().unwrap(), u32::MAX);
    }

    #[test]
    fn test_var_uint_overflow() {
        let mut stream = Stream::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x1F]);
        assert!(stream.get_var_uint().unwrap_err().is_invalid_data());

        let mut stream = Stream::new(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x00]);
        assert!(stream.get_var_uint().unwrap_err().is_invalid_data());
    }

    #[test]
    fn test_var_uint_truncated() {
        let mut stream = Stream::new(&[0x80]);
        assert!(stream.get_var_uint().unwrap_err().is_invalid_data());
    }

    #[test]
    fn test_ensure_available() {
        let data = [0u8; 8];
        let stream = Stream::new(&data);
        assert!(stream.ensure_available(2, 4, "colors").is_ok());
        assert!(stream.ensure_available(3, 4, "colors").is_err());
        assert!(stream.ensure_available(usize::MAX, 2, "colors").is_err());
    }
}
