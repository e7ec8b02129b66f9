//! A positioned, endian-aware cursor over a byte buffer.
//!
//! The [`Stream`] is the reading and writing primitive
//! of both the object codec and the PDU codec.
//! Its buffer may be filled incrementally:
//! a read which asks for more bytes than are available
//! fails with [`Error::Incomplete`] without consuming anything,
//! so that the caller may [`extend`](Stream::extend) the buffer
//! and try again.
use byteordered::{ByteOrdered, Endianness};
use dcm_core::Tag;
use snafu::{Backtrace, ResultExt, Snafu};

/// An error raised by a stream operation.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Not enough bytes are buffered for the read.
    /// Nothing was consumed.
    #[snafu(display("Need {} bytes but only {} are available", needed, available))]
    Incomplete { needed: usize, available: usize },
    /// Tried to move the cursor past the end of the buffer.
    #[snafu(display("Position {} is out of bounds (buffer length {})", position, len))]
    OutOfBounds {
        position: usize,
        len: usize,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not read primitive value"))]
    ReadPrimitive {
        source: std::io::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not write primitive value"))]
    WritePrimitive {
        source: std::io::Error,
        backtrace: Backtrace,
    },
}

impl Error {
    /// Whether the error only signals that more data is needed.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Error::Incomplete { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A byte buffer with a read/write position and a default byte order.
///
/// Writes go to the current position,
/// overwriting existing bytes and growing the buffer as needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    buffer: Vec<u8>,
    position: usize,
    endianness: Endianness,
}

impl Default for Stream {
    fn default() -> Self {
        Stream::new(Endianness::Little)
    }
}

macro_rules! impl_read_primitive {
    ($($read: ident, $peek: ident, $t: ty, $size: expr;)*) => {
        $(
            #[doc = concat!("Read a `", stringify!($t), "` in the stream's byte order.")]
            pub fn $read(&mut self) -> Result<$t> {
                let endianness = self.endianness;
                let bytes = self.take($size)?;
                ByteOrdered::runtime(bytes, endianness)
                    .$read()
                    .context(ReadPrimitiveSnafu)
            }

            #[doc = concat!("Read a `", stringify!($t), "` without moving the cursor.")]
            pub fn $peek(&mut self) -> Result<$t> {
                let position = self.position;
                let out = self.$read();
                self.position = position;
                out
            }
        )*
    };
}

macro_rules! impl_write_primitive {
    ($($write: ident, $t: ty;)*) => {
        $(
            #[doc = concat!("Write a `", stringify!($t), "` in the stream's byte order.")]
            pub fn $write(&mut self, value: $t) -> Result<()> {
                let mut bytes = Vec::with_capacity(std::mem::size_of::<$t>());
                ByteOrdered::runtime(&mut bytes, self.endianness)
                    .$write(value)
                    .context(WritePrimitiveSnafu)?;
                self.write_bytes(&bytes);
                Ok(())
            }
        )*
    };
}

impl Stream {
    /// Create an empty stream with the given default byte order.
    pub fn new(endianness: Endianness) -> Self {
        Stream {
            buffer: Vec::new(),
            position: 0,
            endianness,
        }
    }

    /// Create a stream over existing bytes, positioned at the start.
    pub fn from_bytes(buffer: impl Into<Vec<u8>>, endianness: Endianness) -> Self {
        Stream {
            buffer: buffer.into(),
            position: 0,
            endianness,
        }
    }

    /// The stream's current byte order.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Change the byte order of all subsequent reads and writes.
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    /// The current position of the cursor.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The total number of bytes in the buffer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The number of bytes after the cursor.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    /// Whether the cursor reached the end of the buffer.
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.buffer.len()
    }

    /// Move the cursor to an absolute position.
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.buffer.len() {
            return OutOfBoundsSnafu {
                position,
                len: self.buffer.len(),
            }
            .fail();
        }
        self.position = position;
        Ok(())
    }

    /// Move the cursor forward by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Append bytes at the end of the buffer, leaving the cursor in place.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Discard the bytes before the cursor.
    pub fn compact(&mut self) {
        self.buffer.drain(..self.position);
        self.position = 0;
    }

    /// Truncate the buffer at the cursor.
    pub fn truncate(&mut self) {
        self.buffer.truncate(self.position);
    }

    /// The whole buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// The bytes after the cursor.
    pub fn unread(&self) -> &[u8] {
        &self.buffer[self.position..]
    }

    /// Take the buffer out of the stream.
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    fn take(&mut self, n: usize) -> Result<&[u8]> {
        let available = self.remaining();
        if n > available {
            return IncompleteSnafu {
                needed: n,
                available,
            }
            .fail();
        }
        let start = self.position;
        self.position += n;
        Ok(&self.buffer[start..self.position])
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a single byte without moving the cursor.
    pub fn peek_u8(&mut self) -> Result<u8> {
        let position = self.position;
        let out = self.read_u8();
        self.position = position;
        out
    }

    impl_read_primitive! {
        read_u16, peek_u16, u16, 2;
        read_u32, peek_u32, u32, 4;
        read_i16, peek_i16, i16, 2;
        read_i32, peek_i32, i32, 4;
        read_f32, peek_f32, f32, 4;
        read_f64, peek_f64, f64, 8;
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        self.take(n).map(<[u8]>::to_vec)
    }

    /// Look at the next `n` bytes without moving the cursor.
    pub fn peek_bytes(&self, n: usize) -> Result<&[u8]> {
        let available = self.remaining();
        if n > available {
            return IncompleteSnafu {
                needed: n,
                available,
            }
            .fail();
        }
        Ok(&self.buffer[self.position..self.position + n])
    }

    /// Read exactly `n` bytes as text.
    ///
    /// Invalid UTF-8 sequences are replaced.
    pub fn read_string(&mut self, n: usize) -> Result<String> {
        let bytes = self.take(n)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read up to `n` bytes as text, taking whatever is available.
    pub fn read_string_partial(&mut self, n: usize) -> String {
        let n = n.min(self.remaining());
        let start = self.position;
        self.position += n;
        String::from_utf8_lossy(&self.buffer[start..self.position]).into_owned()
    }

    /// Read an attribute tag: a group number followed by an element number.
    pub fn read_tag(&mut self) -> Result<Tag> {
        if self.remaining() < 4 {
            return IncompleteSnafu {
                needed: 4_usize,
                available: self.remaining(),
            }
            .fail();
        }
        let group = self.read_u16()?;
        let element = self.read_u16()?;
        Ok(Tag(group, element))
    }

    /// Read an attribute tag without moving the cursor.
    pub fn peek_tag(&mut self) -> Result<Tag> {
        let position = self.position;
        let out = self.read_tag();
        self.position = position;
        out
    }

    /// Write raw bytes at the cursor.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        let end = self.position + bytes.len();
        let overlap = self.buffer.len().min(end).saturating_sub(self.position);
        self.buffer[self.position..self.position + overlap].copy_from_slice(&bytes[..overlap]);
        self.buffer.extend_from_slice(&bytes[overlap..]);
        self.position = end;
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    impl_write_primitive! {
        write_u16, u16;
        write_u32, u32;
        write_i16, i16;
        write_i32, i32;
        write_f32, f32;
        write_f64, f64;
    }

    /// Write text as is.
    pub fn write_string(&mut self, text: &str) {
        self.write_bytes(text.as_bytes());
    }

    /// Write an attribute tag.
    pub fn write_tag(&mut self, tag: Tag) -> Result<()> {
        self.write_u16(tag.group())?;
        self.write_u16(tag.element())
    }
}

impl std::io::Write for Stream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.write_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
