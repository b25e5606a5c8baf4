use super::mismatch;
use crate::{
    config::Config,
    error::{Error, Location, Overflow},
    util::at_least,
    value::{Value, ValueRef},
};
use bytes::{Buf, BufMut};
use std::borrow::Cow;

/// Text or raw bytes, either of a declared width or filling the rest of the buffer.
pub(crate) struct SequenceNode {
    text: bool,
    /// `None` for a tail sequence.
    width: Option<usize>,
}

impl SequenceNode {
    pub(crate) fn new(text: bool, bytes: usize, tail: bool, at: Location) -> Result<Self, Error> {
        let width = match bytes {
            0 if tail => None,
            0 => return Err(Error::Internal(at, "byte sequence declares no width".into())),
            bytes => Some(bytes),
        };
        Ok(Self { text, width })
    }

    fn kind(&self) -> &'static str {
        if self.text {
            "text"
        } else {
            "bytes"
        }
    }

    fn encoded<'a>(
        &self,
        value: &ValueRef<'a>,
        cfg: &Config,
        at: Location,
    ) -> Result<Cow<'a, [u8]>, Error> {
        match (self.text, value) {
            (_, ValueRef::Absent) => Ok(Cow::Borrowed(&[][..])),
            (true, ValueRef::Text(text)) => cfg
                .charset
                .encode(*text)
                .map_err(|overflow| Error::Value(at, overflow)),
            (false, ValueRef::Bytes(bytes)) => Ok(Cow::Borrowed(*bytes)),
            (_, other) => Err(mismatch(at, self.kind(), other)),
        }
    }

    pub(crate) fn size(
        &self,
        value: &ValueRef<'_>,
        cfg: &Config,
        at: Location,
    ) -> Result<usize, Error> {
        if let Some(width) = self.width {
            return Ok(width);
        }
        match (self.text, value) {
            (_, ValueRef::Absent) => Ok(0),
            (true, ValueRef::Text(text)) => cfg
                .charset
                .encoded_len(text)
                .map_err(|overflow| Error::Value(at, overflow)),
            (false, ValueRef::Bytes(bytes)) => Ok(bytes.len()),
            (_, other) => Err(mismatch(at, self.kind(), other)),
        }
    }

    pub(crate) fn write(
        &self,
        buf: &mut impl BufMut,
        value: &ValueRef<'_>,
        cfg: &Config,
        at: Location,
    ) -> Result<(), Error> {
        let encoded = self.encoded(value, cfg, at)?;
        let Some(width) = self.width else {
            buf.put_slice(&encoded);
            return Ok(());
        };
        if encoded.len() > width {
            return Err(Error::Value(
                at,
                Overflow::Bytes {
                    found: encoded.len(),
                    max: width,
                },
            ));
        }
        buf.put_slice(&encoded);
        buf.put_bytes(0, width - encoded.len());
        Ok(())
    }

    pub(crate) fn read(&self, buf: &mut impl Buf, cfg: &Config, at: Location) -> Result<Value, Error> {
        let len = self.width.unwrap_or_else(|| buf.remaining());
        at_least(buf, len, at)?;
        let raw = buf.copy_to_bytes(len);
        if !self.text {
            return Ok(Value::Bytes(raw));
        }

        // Fixed-width text is padded with NUL bytes
        let end = match self.width {
            Some(_) => raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1),
            None => raw.len(),
        };
        cfg.charset
            .decode(&raw[..end])
            .map(Value::Text)
            .map_err(|offset| {
                Error::InvalidData(
                    at,
                    format!("invalid {} text at byte {offset}", cfg.charset.name()),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Charset;
    use bytes::BytesMut;

    const AT: Location = Location::field("Foo", "name");

    fn write(node: &SequenceNode, value: ValueRef<'_>, cfg: &Config) -> Result<Vec<u8>, Error> {
        let mut buf = BytesMut::new();
        let size = node.size(&value, cfg, AT)?;
        node.write(&mut buf, &value, cfg, AT)?;
        assert_eq!(buf.len(), size);
        Ok(buf.to_vec())
    }

    #[test]
    fn test_fixed_text() {
        let cfg = Config::default();
        let node = SequenceNode::new(true, 5, false, AT).unwrap();
        let encoded = write(&node, ValueRef::Text("ab"), &cfg).unwrap();
        assert_eq!(encoded, b"ab\0\0\0");
        assert!(matches!(
            node.read(&mut encoded.as_slice(), &cfg, AT),
            Ok(Value::Text(text)) if text == "ab"
        ));

        assert_eq!(write(&node, ValueRef::Absent, &cfg).unwrap(), [0; 5]);
        assert_eq!(
            write(&node, ValueRef::Text("abcdef"), &cfg),
            Err(Error::Value(AT, Overflow::Bytes { found: 6, max: 5 }))
        );
    }

    #[test]
    fn test_tail_text() {
        let cfg = Config::default();
        let node = SequenceNode::new(true, 0, true, AT).unwrap();
        assert_eq!(write(&node, ValueRef::Text("ab"), &cfg).unwrap(), b"ab");
        assert_eq!(write(&node, ValueRef::Text("abcde"), &cfg).unwrap(), b"abcde");
        assert_eq!(write(&node, ValueRef::Absent, &cfg).unwrap(), b"");

        let mut buf: &[u8] = b"hello";
        assert!(matches!(
            node.read(&mut buf, &cfg, AT),
            Ok(Value::Text(text)) if text == "hello"
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_charset() {
        let cfg = Config::default().with_charset(Charset::Ascii);
        let node = SequenceNode::new(true, 4, false, AT).unwrap();
        assert!(matches!(
            write(&node, ValueRef::Text("é"), &cfg),
            Err(Error::Value(_, Overflow::Unrepresentable('é', "US-ASCII")))
        ));
        let mut buf: &[u8] = &[b'a', 0xC3, 0, 0];
        assert!(matches!(
            node.read(&mut buf, &cfg, AT),
            Err(Error::InvalidData(..))
        ));
    }

    #[test]
    fn test_bytes() {
        let cfg = Config::default();
        let node = SequenceNode::new(false, 4, false, AT).unwrap();
        let encoded = write(&node, ValueRef::Bytes(&[1, 2, 0]), &cfg).unwrap();
        assert_eq!(encoded, [1, 2, 0, 0]);

        // Raw bytes keep their padding
        assert!(matches!(
            node.read(&mut encoded.as_slice(), &cfg, AT),
            Ok(Value::Bytes(bytes)) if bytes[..] == [1, 2, 0, 0]
        ));

        let mut buf: &[u8] = &[1, 2];
        assert!(matches!(
            node.read(&mut buf, &cfg, AT),
            Err(Error::EndOfBuffer(_, 4, 2))
        ));
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            SequenceNode::new(true, 0, false, AT),
            Err(Error::Internal(..))
        ));
        let cfg = Config::default();
        let node = SequenceNode::new(false, 2, false, AT).unwrap();
        assert!(matches!(
            write(&node, ValueRef::Text("a"), &cfg),
            Err(Error::Internal(..))
        ));
    }
}
