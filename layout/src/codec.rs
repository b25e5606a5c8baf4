//! Encoding and decoding of records.

use crate::{
    config::Config,
    error::{Error, ErrorKind, Location},
    registry,
    schema::Record,
    value::ValueRef,
};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::error;

/// Encodes and decodes [Record]s with a fixed [Config].
///
/// Encoding and decoding first validate the record type (once per process) and build its node
/// tree (also once per process). Every operation is strict: errors are always returned.
/// [Codec::to_bytes] and [Codec::from_bytes] additionally treat a missing input as no value and,
/// unless [Config::strict] is set, log internal errors and report no value instead of failing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Codec {
    cfg: Config,
}

impl Codec {
    /// Creates a codec with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    /// Returns the configuration of this codec.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Validates the schema of `T` without encoding anything.
    pub fn validate<T: Record>(&self) -> Result<(), Error> {
        registry::check::<T>()
    }

    /// Returns the number of bytes [Codec::encode] produces for `value`.
    pub fn encoded_size<T: Record>(&self, value: &T) -> Result<usize, Error> {
        let root = registry::root::<T>()?;
        let at = Location::record(root.record());
        root.size(&ValueRef::Record(value), &self.cfg, at)
    }

    /// Encodes `value`.
    ///
    /// The output buffer is sized by a first pass over `value` and filled by a second, so it
    /// holds exactly the encoded bytes.
    pub fn encode<T: Record>(&self, value: &T) -> Result<Bytes, Error> {
        let root = registry::root::<T>()?;
        let at = Location::record(root.record());
        let value = ValueRef::Record(value);

        let len = root.size(&value, &self.cfg, at)?;
        let mut buffer = BytesMut::with_capacity(len);
        root.write(&mut buffer, &value, &self.cfg, at)?;
        if buffer.len() != len {
            return Err(Error::Internal(
                at,
                format!("wrote {} bytes, expected {len}", buffer.len()),
            ));
        }
        Ok(buffer.freeze())
    }

    /// Encodes `value` into `buf`, returning the number of bytes written.
    ///
    /// Nothing is written if encoding fails or `buf` cannot hold the encoded value.
    pub fn encode_into<T: Record>(&self, value: &T, buf: &mut impl BufMut) -> Result<usize, Error> {
        let encoded = self.encode(value)?;
        let remaining = buf.remaining_mut();
        if remaining < encoded.len() {
            let root = registry::root::<T>()?;
            return Err(Error::EndOfBuffer(
                Location::record(root.record()),
                encoded.len(),
                remaining,
            ));
        }
        buf.put_slice(&encoded);
        Ok(encoded.len())
    }

    /// Decodes a `T` from the start of `buf`.
    ///
    /// Bytes following a record without a tail field are ignored.
    pub fn decode<T: Record>(&self, mut buf: impl Buf) -> Result<T, Error> {
        self.decode_from(&mut buf)
    }

    /// Decodes a `T` from `buf`, advancing it past the consumed bytes.
    pub fn decode_from<T: Record>(&self, buf: &mut impl Buf) -> Result<T, Error> {
        let root = registry::root::<T>()?;
        let at = Location::record(root.record());
        root.read(buf, &self.cfg, at)?
            .into_record::<T>()
            .ok_or_else(|| Error::Internal(at, "decoded record has the wrong type".into()))
    }

    /// Encodes `value`, if any.
    ///
    /// Returns `Ok(None)` if `value` is `None`, or if encoding hits an internal error and the
    /// codec is not strict.
    pub fn to_bytes<T: Record>(&self, value: Option<&T>) -> Result<Option<Bytes>, Error> {
        let Some(value) = value else {
            return Ok(None);
        };
        self.lenient(self.encode(value))
    }

    /// Decodes a `T` from `bytes`, if any.
    ///
    /// Returns `Ok(None)` if `bytes` is `None` or empty, or if decoding hits an internal error and
    /// the codec is not strict.
    pub fn from_bytes<T: Record>(&self, bytes: Option<&[u8]>) -> Result<Option<T>, Error> {
        let bytes = match bytes {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return Ok(None),
        };
        self.lenient(self.decode(bytes))
    }

    fn lenient<V>(&self, result: Result<V, Error>) -> Result<Option<V>, Error> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::Internal && !self.cfg.strict => {
                error!(?err, "suppressed internal error");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
