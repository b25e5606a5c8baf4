use super::mismatch;
use crate::{
    config::Config,
    error::{Error, Location},
    primitive::Primitive,
    util::at_least,
    value::{Value, ValueRef},
};
use bytes::{Buf, BufMut};

/// A scalar occupying a fixed number of bytes.
pub(crate) struct PrimitiveNode {
    kind: Primitive,
    width: usize,
}

impl PrimitiveNode {
    pub(crate) fn new(kind: Primitive, bytes: usize) -> Self {
        Self {
            kind,
            width: kind.effective_width(bytes),
        }
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.width
    }

    pub(crate) fn write(
        &self,
        buf: &mut impl BufMut,
        value: &ValueRef<'_>,
        cfg: &Config,
        at: Location,
    ) -> Result<(), Error> {
        let scalar = match value {
            ValueRef::Absent => self.kind.default_value(),
            ValueRef::Scalar(scalar) if scalar.kind() == self.kind => *scalar,
            other => return Err(mismatch(at, self.kind.name(), other)),
        };

        // Only narrowed values can lose information
        if self.width < self.kind.natural_width() {
            scalar
                .check_fits(self.width)
                .map_err(|overflow| Error::Value(at, overflow))?;
        }
        scalar.write(buf, self.width, cfg.endian);
        Ok(())
    }

    pub(crate) fn read(&self, buf: &mut impl Buf, cfg: &Config, at: Location) -> Result<Value, Error> {
        at_least(buf, self.width, at)?;
        self.kind
            .read(buf, self.width, cfg.endian)
            .map(Value::Scalar)
            .map_err(|invalid| Error::InvalidData(at, invalid.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Endian, error::Overflow, primitive::Scalar};
    use bytes::BytesMut;

    const AT: Location = Location::field("Foo", "value");

    fn write(node: &PrimitiveNode, value: ValueRef<'_>, cfg: &Config) -> Result<Vec<u8>, Error> {
        let mut buf = BytesMut::new();
        node.write(&mut buf, &value, cfg, AT)?;
        assert_eq!(buf.len(), node.size());
        Ok(buf.to_vec())
    }

    #[test]
    fn test_narrowed() {
        let cfg = Config::default();
        let node = PrimitiveNode::new(Primitive::I32, 2);
        assert_eq!(node.size(), 2);
        assert_eq!(
            write(&node, ValueRef::Scalar(Scalar::I32(0x1234)), &cfg).unwrap(),
            [0x12, 0x34]
        );

        let cfg = cfg.with_endian(Endian::Little);
        assert_eq!(
            write(&node, ValueRef::Scalar(Scalar::I32(0x1234)), &cfg).unwrap(),
            [0x34, 0x12]
        );
    }

    #[test]
    fn test_overflow() {
        let cfg = Config::default();
        let node = PrimitiveNode::new(Primitive::I32, 1);
        assert_eq!(
            write(&node, ValueRef::Scalar(Scalar::I32(200)), &cfg),
            Err(Error::Value(
                AT,
                Overflow::Numeric {
                    value: "200".into(),
                    bytes: 1
                }
            ))
        );

        // Natural width never overflows
        let node = PrimitiveNode::new(Primitive::U32, 0);
        assert_eq!(
            write(&node, ValueRef::Scalar(Scalar::U32(u32::MAX)), &cfg).unwrap(),
            [0xFF; 4]
        );
    }

    #[test]
    fn test_absent() {
        let cfg = Config::default();
        let node = PrimitiveNode::new(Primitive::F64, 0);
        assert_eq!(write(&node, ValueRef::Absent, &cfg).unwrap(), [0; 8]);
    }

    #[test]
    fn test_mismatch() {
        let cfg = Config::default();
        let node = PrimitiveNode::new(Primitive::I16, 0);
        let err = write(&node, ValueRef::Scalar(Scalar::I32(1)), &cfg).unwrap_err();
        assert!(matches!(err, Error::Internal(..)));
        let err = write(&node, ValueRef::Text("1"), &cfg).unwrap_err();
        assert!(matches!(err, Error::Internal(..)));
    }

    #[test]
    fn test_read() {
        let cfg = Config::default();
        let node = PrimitiveNode::new(Primitive::I64, 5);
        let mut buf: &[u8] = &[0x00, 0x00, 0x12, 0xF4, 0xF2, 0xAA];
        assert!(matches!(
            node.read(&mut buf, &cfg, AT),
            Ok(Value::Scalar(Scalar::I64(1_242_354)))
        ));
        assert_eq!(buf, [0xAA]);

        let mut buf: &[u8] = &[0x01, 0x02];
        assert!(matches!(
            node.read(&mut buf, &cfg, AT),
            Err(Error::EndOfBuffer(_, 5, 2))
        ));

        let node = PrimitiveNode::new(Primitive::Bool, 0);
        let mut buf: &[u8] = &[0x07];
        assert!(matches!(
            node.read(&mut buf, &cfg, AT),
            Err(Error::InvalidData(..))
        ));
    }
}
