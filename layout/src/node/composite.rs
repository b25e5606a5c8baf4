use super::{mismatch, Node};
use crate::{
    config::Config,
    error::{Error, Location},
    schema::{Accessor, Constructor, RecordSchema},
    value::{Value, ValueRef},
};
use bytes::{Buf, BufMut};
use std::sync::Arc;

struct Child {
    name: &'static str,
    accessor: Arc<dyn Accessor>,
    node: Node,
}

/// A record: its fields, in schema order.
pub(crate) struct CompositeNode {
    record: &'static str,
    constructor: Constructor,
    children: Vec<Child>,
}

impl CompositeNode {
    /// Builds the node of a validated record. If `tail` is set, the last field may consume the
    /// rest of the buffer.
    pub(crate) fn build(schema: &RecordSchema, tail: bool) -> Result<Self, Error> {
        let record = schema.name;
        let constructor = schema.constructor.clone().ok_or_else(|| {
            Error::Internal(Location::record(record), "record has no constructor".into())
        })?;
        let last = schema.fields.len().saturating_sub(1);
        let children = schema
            .fields
            .iter()
            .enumerate()
            .map(|(position, field)| {
                let at = Location::field(record, field.name);
                let accessor = field
                    .accessor
                    .clone()
                    .ok_or_else(|| Error::Internal(at, "field has no accessor".into()))?;
                let node = Node::build(field, tail && position == last, at)?;
                Ok(Child {
                    name: field.name,
                    accessor,
                    node,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Self {
            record,
            constructor,
            children,
        })
    }

    /// Returns the name of the record.
    pub(crate) fn record(&self) -> &'static str {
        self.record
    }

    fn at(&self, child: &Child) -> Location {
        Location::field(self.record, child.name)
    }

    /// Borrows the value of `child` from `value`.
    fn child<'a>(
        &self,
        child: &Child,
        value: &ValueRef<'a>,
        at: Location,
    ) -> Result<ValueRef<'a>, Error> {
        match value {
            ValueRef::Absent => Ok(ValueRef::Absent),
            ValueRef::Record(record) => child.accessor.get(*record).ok_or_else(|| {
                Error::Internal(self.at(child), format!("value is not a {}", self.record))
            }),
            other => Err(mismatch(at, self.record, other)),
        }
    }

    pub(crate) fn size(
        &self,
        value: &ValueRef<'_>,
        cfg: &Config,
        at: Location,
    ) -> Result<usize, Error> {
        let mut size = 0;
        for child in &self.children {
            let field = self.child(child, value, at)?;
            size += child.node.size(&field, cfg, self.at(child))?;
        }
        Ok(size)
    }

    pub(crate) fn write(
        &self,
        buf: &mut impl BufMut,
        value: &ValueRef<'_>,
        cfg: &Config,
        at: Location,
    ) -> Result<(), Error> {
        if let ValueRef::Absent = value {
            let size = self.size(value, cfg, at)?;
            buf.put_bytes(0, size);
            return Ok(());
        }
        for child in &self.children {
            let field = self.child(child, value, at)?;
            child.node.write(buf, &field, cfg, self.at(child))?;
        }
        Ok(())
    }

    pub(crate) fn read(&self, buf: &mut impl Buf, cfg: &Config, _: Location) -> Result<Value, Error> {
        let mut record = (self.constructor)();
        for child in &self.children {
            let at = self.at(child);
            let value = child.node.read(buf, cfg, at)?;
            if !child.accessor.set(&mut *record, value) {
                return Err(Error::Internal(
                    at,
                    "decoded value does not match field type".into(),
                ));
            }
        }
        Ok(Value::Record(record))
    }
}
