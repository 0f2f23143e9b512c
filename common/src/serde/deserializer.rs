use std::{
    borrow::Cow,
    io::{self, ErrorKind, Read},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("unexpected end of data at byte {offset} ({requested} more bytes needed)")]
    UnexpectedEof { offset: usize, requested: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Sequential little endian reader. Every read either returns the full
/// amount requested or fails, short reads are never padded.
#[rustfmt::skip]
pub trait Deserializer {
    fn pos(&self) -> usize;
    fn read_bytes(&mut self, length: usize) -> Result<Cow<'_, [u8]>, ReadError>;

    fn advance_by(&mut self, amount: usize) -> Result<(), ReadError> {
        self.read_bytes(amount).map(|_| ())
    }

    fn read_array<const LENGTH: usize>(&mut self) -> Result<[u8; LENGTH], ReadError> {
        let mut out = [0; LENGTH];
        out.copy_from_slice(&self.read_bytes(LENGTH)?);
        Ok(out)
    }

    fn read_u16_le(&mut self) -> Result<u16, ReadError> { Ok(u16::from_le_bytes(self.read_array()?)) }
    fn read_u32_le(&mut self) -> Result<u32, ReadError> { Ok(u32::from_le_bytes(self.read_array()?)) }
    fn read_f32_le(&mut self) -> Result<f32, ReadError> { Ok(f32::from_le_bytes(self.read_array()?)) }
}

pub struct SliceDeserializer<'a> {
    buffer: &'a [u8],
    offset: usize,
}

pub struct ReaderDeserializer<T: Read> {
    reader: T,
    offset: usize,
    buffer: Vec<u8>,
}

impl<'a> SliceDeserializer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            buffer: data,
            offset: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }
}

impl<T: Read> ReaderDeserializer<T> {
    pub fn new(reader: T) -> Self {
        Self {
            reader,
            offset: 0,
            buffer: Vec::new(),
        }
    }
}

impl Deserializer for SliceDeserializer<'_> {
    fn pos(&self) -> usize {
        self.offset
    }

    fn read_bytes(&mut self, length: usize) -> Result<Cow<'_, [u8]>, ReadError> {
        if self.remaining() < length {
            return Err(ReadError::UnexpectedEof {
                offset: self.buffer.len(),
                requested: length - self.remaining(),
            });
        }

        let value = &self.buffer[self.offset..self.offset + length];
        self.offset += length;
        Ok(Cow::Borrowed(value))
    }
}

impl<T: Read> Deserializer for ReaderDeserializer<T> {
    fn pos(&self) -> usize {
        self.offset
    }

    fn read_bytes(&mut self, length: usize) -> Result<Cow<'_, [u8]>, ReadError> {
        self.buffer.resize(length, 0);

        let mut written = 0;
        while written < length {
            match self.reader.read(&mut self.buffer[written..]) {
                Ok(0) => {
                    return Err(ReadError::UnexpectedEof {
                        offset: self.offset + written,
                        requested: length - written,
                    })
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        self.offset += length;
        Ok(Cow::Borrowed(&self.buffer[..length]))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn slice_reads_little_endian() {
        let data = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x3f];
        let mut des = SliceDeserializer::new(&data);
        assert_eq!(des.read_u32_le().unwrap(), 1);
        assert_eq!(des.read_f32_le().unwrap(), 1.0);
        assert_eq!(des.pos(), 8);
        assert_eq!(des.remaining(), 0);
    }

    #[test]
    fn slice_short_read_fails_without_moving() {
        let data = [0xAA; 3];
        let mut des = SliceDeserializer::new(&data);
        let err = des.read_u32_le().unwrap_err();
        assert!(matches!(
            err,
            ReadError::UnexpectedEof {
                offset: 3,
                requested: 1
            }
        ));
        assert_eq!(des.pos(), 0);
    }

    #[test]
    fn reader_matches_slice() {
        let data = (0..64).collect::<Vec<u8>>();
        let mut slice = SliceDeserializer::new(&data);
        let mut reader = ReaderDeserializer::new(Cursor::new(data.clone()));

        slice.advance_by(10).unwrap();
        reader.advance_by(10).unwrap();
        assert_eq!(slice.read_u16_le().unwrap(), reader.read_u16_le().unwrap());
        assert_eq!(slice.read_u32_le().unwrap(), reader.read_u32_le().unwrap());
        assert_eq!(slice.pos(), reader.pos());
    }

    #[test]
    fn reader_reports_eof_offset() {
        let mut reader = ReaderDeserializer::new(Cursor::new(vec![0u8; 6]));
        reader.advance_by(4).unwrap();
        let err = reader.read_u32_le().unwrap_err();
        assert!(matches!(
            err,
            ReadError::UnexpectedEof {
                offset: 6,
                requested: 2
            }
        ));
    }
}
