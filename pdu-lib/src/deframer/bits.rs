use std::fmt::Display;
use std::io::{ErrorKind, Read};
use std::str::FromStr;

use crate::{ConfigError, Error, Result};

/// How bits are stored in an input byte stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BitFormat {
    /// One bit per byte; only the least-significant bit of each byte is used.
    #[default]
    Unpacked,
    /// Eight bits per byte, most-significant bit first.
    Packed,
}

impl FromStr for BitFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unpacked" => Ok(Self::Unpacked),
            "packed" => Ok(Self::Packed),
            _ => Err(ConfigError::UnknownName {
                kind: "bit format",
                value: s.to_string(),
            }),
        }
    }
}

impl Display for BitFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unpacked => f.write_str("unpacked"),
            Self::Packed => f.write_str("packed"),
        }
    }
}

/// Expand packed bytes into unpacked bits, most-significant bit first.
#[must_use]
pub fn unpack_bytes(dat: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(dat.len() * 8);
    for b in dat {
        for i in (0..8).rev() {
            bits.push((b >> i) & 0x1);
        }
    }
    bits
}

/// Iterates over the bits read from a byte stream.
///
/// ## Errors
/// The iterator ends at EOF. Any other read error is produced once as [Error::Io], after
/// which the iterator ends.
pub struct Bits<R>
where
    R: Read,
{
    reader: R,
    format: BitFormat,
    buf: Vec<u8>,
    // Number of valid bytes in buf
    len: usize,
    // Index of the current byte in buf
    idx: usize,
    // Next bit of the current byte for packed input, 7 is the MSB
    bit: u8,
    done: bool,
}

impl<R> Bits<R>
where
    R: Read,
{
    const BUFFER_SIZE: usize = 8192;

    pub fn new(reader: R, format: BitFormat) -> Self {
        Bits {
            reader,
            format,
            buf: vec![0u8; Self::BUFFER_SIZE],
            len: 0,
            idx: 0,
            bit: 7,
            done: false,
        }
    }

    // Refill the buffer, returning false at EOF.
    fn fill(&mut self) -> std::io::Result<bool> {
        loop {
            match self.reader.read(&mut self.buf) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.len = n;
                    self.idx = 0;
                    return Ok(true);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }
}

impl<R> Iterator for Bits<R>
where
    R: Read,
{
    type Item = Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.idx >= self.len {
            match self.fill() {
                Ok(true) => (),
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(Error::Io(err)));
                }
            }
        }

        let byte = self.buf[self.idx];
        let bit = match self.format {
            BitFormat::Unpacked => {
                self.idx += 1;
                byte & 0x1
            }
            BitFormat::Packed => {
                let bit = (byte >> self.bit) & 0x1;
                if self.bit == 0 {
                    self.bit = 7;
                    self.idx += 1;
                } else {
                    self.bit -= 1;
                }
                bit
            }
        };
        Some(Ok(bit))
    }
}
