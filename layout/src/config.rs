//! Configuration fixed at [crate::Codec] construction.

use crate::error::Overflow;
use std::borrow::Cow;

/// Byte order of multi-byte primitives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Endian {
    /// Most significant byte first.
    #[default]
    Big,
    /// Least significant byte first.
    Little,
}

/// Character encoding of text fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Charset {
    /// UTF-8.
    #[default]
    Utf8,
    /// ISO-8859-1, one byte per character in `U+0000..=U+00FF`.
    Latin1,
    /// US-ASCII, one byte per character in `U+0000..=U+007F`.
    Ascii,
}

impl Charset {
    /// Name of the charset, as used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Latin1 => "ISO-8859-1",
            Charset::Ascii => "US-ASCII",
        }
    }

    fn max_char(&self) -> u32 {
        match self {
            Charset::Utf8 => char::MAX as u32,
            Charset::Latin1 => 0xFF,
            Charset::Ascii => 0x7F,
        }
    }

    /// Returns the number of bytes `text` occupies in this charset.
    pub fn encoded_len(&self, text: &str) -> Result<usize, Overflow> {
        match self {
            Charset::Utf8 => Ok(text.len()),
            Charset::Latin1 | Charset::Ascii => {
                let mut len = 0;
                for c in text.chars() {
                    self.check(c)?;
                    len += 1;
                }
                Ok(len)
            }
        }
    }

    /// Encodes `text` in this charset.
    pub fn encode<'a>(&self, text: &'a str) -> Result<Cow<'a, [u8]>, Overflow> {
        match self {
            Charset::Utf8 => Ok(Cow::Borrowed(text.as_bytes())),
            Charset::Latin1 | Charset::Ascii => text
                .chars()
                .map(|c| self.check(c).map(|_| c as u8))
                .collect::<Result<Vec<u8>, _>>()
                .map(Cow::Owned),
        }
    }

    /// Decodes `raw` from this charset.
    ///
    /// Returns the offending byte offset if `raw` is not valid in this charset.
    pub fn decode(&self, raw: &[u8]) -> Result<String, usize> {
        match self {
            Charset::Utf8 => match std::str::from_utf8(raw) {
                Ok(text) => Ok(text.to_owned()),
                Err(err) => Err(err.valid_up_to()),
            },
            Charset::Latin1 => Ok(raw.iter().map(|&b| char::from(b)).collect()),
            Charset::Ascii => match raw.iter().position(|b| !b.is_ascii()) {
                Some(offset) => Err(offset),
                None => Ok(raw.iter().map(|&b| char::from(b)).collect()),
            },
        }
    }

    fn check(&self, c: char) -> Result<(), Overflow> {
        if c as u32 > self.max_char() {
            return Err(Overflow::Unrepresentable(c, self.name()));
        }
        Ok(())
    }
}

/// Configuration of a [crate::Codec].
///
/// # Examples
///
/// ```
/// use commonware_layout::{Charset, Config, Endian};
///
/// let cfg = Config::default()
///     .with_endian(Endian::Little)
///     .with_charset(Charset::Latin1)
///     .with_strict(true);
/// assert_eq!(cfg.endian, Endian::Little);
/// assert_eq!(cfg.charset, Charset::Latin1);
/// assert!(cfg.strict);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Config {
    /// Byte order of multi-byte primitives.
    pub endian: Endian,

    /// Character encoding of text fields.
    pub charset: Charset,

    /// If set, internal errors are returned to the caller. Otherwise they are
    /// logged and the call reports no result.
    pub strict: bool,
}

impl Config {
    /// Sets the byte order.
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Sets the character encoding.
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Sets whether internal errors propagate.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
