//! Node tree mirroring a validated record schema.
//!
//! Every field of a record becomes one [Node]. Each node computes the encoded size of a value,
//! writes exactly that many bytes, and reads back a value from exactly that many bytes (or from
//! everything that remains in the buffer, for a tail node).
//!
//! Nodes are only built from schemas that passed [crate::validate], so any inconsistency found
//! while building or walking the tree is reported as [Error::Internal].

mod collection;
mod composite;
mod primitive;
mod sequence;

pub(crate) use collection::CollectionNode;
pub(crate) use composite::CompositeNode;
pub(crate) use primitive::PrimitiveNode;
pub(crate) use sequence::SequenceNode;

use crate::{
    config::Config,
    error::{Error, Location},
    schema::{FieldDef, Shape},
    value::{Value, ValueRef},
};
use bytes::{Buf, BufMut};

/// A node of the tree.
pub(crate) enum Node {
    Primitive(PrimitiveNode),
    Sequence(SequenceNode),
    Collection(CollectionNode),
    Composite(CompositeNode),
}

impl Node {
    /// Builds the node for `field`. `tail` is set if the field may consume the rest of the
    /// buffer.
    pub(crate) fn build(field: &FieldDef, tail: bool, at: Location) -> Result<Self, Error> {
        match &field.shape {
            Shape::Primitive(kind) => Ok(Node::Primitive(PrimitiveNode::new(*kind, field.bytes))),
            Shape::Text => SequenceNode::new(true, field.bytes, tail, at).map(Node::Sequence),
            Shape::Bytes => SequenceNode::new(false, field.bytes, tail, at).map(Node::Sequence),
            Shape::Record(record) => {
                CompositeNode::build(&record.describe(), tail).map(Node::Composite)
            }
            Shape::Collection(member) => {
                let length = match field.length {
                    Some(length) => Some(length),
                    None if tail => None,
                    None => {
                        return Err(Error::Internal(at, "collection declares no length".into()))
                    }
                };
                let member = Self::member(member, at)?;
                Ok(Node::Collection(CollectionNode::new(length, member)))
            }
            Shape::Dynamic(name) | Shape::Unsupported(name) => {
                Err(Error::Internal(at, format!("no node for field type {name}")))
            }
        }
    }

    /// Builds the node for members of a collection. Members always use their natural width.
    fn member(shape: &Shape, at: Location) -> Result<Self, Error> {
        match shape {
            Shape::Primitive(kind) => Ok(Node::Primitive(PrimitiveNode::new(*kind, 0))),
            Shape::Record(record) => {
                CompositeNode::build(&record.describe(), false).map(Node::Composite)
            }
            other => Err(Error::Internal(
                at,
                format!("no node for collection member {}", other.name()),
            )),
        }
    }

    /// Returns the number of bytes [Node::write] produces for `value`.
    pub(crate) fn size(
        &self,
        value: &ValueRef<'_>,
        cfg: &Config,
        at: Location,
    ) -> Result<usize, Error> {
        match self {
            Node::Primitive(node) => Ok(node.size()),
            Node::Sequence(node) => node.size(value, cfg, at),
            Node::Collection(node) => node.size(value, cfg, at),
            Node::Composite(node) => node.size(value, cfg, at),
        }
    }

    /// Writes `value`. An absent value is written as zero bytes.
    pub(crate) fn write(
        &self,
        buf: &mut impl BufMut,
        value: &ValueRef<'_>,
        cfg: &Config,
        at: Location,
    ) -> Result<(), Error> {
        match self {
            Node::Primitive(node) => node.write(buf, value, cfg, at),
            Node::Sequence(node) => node.write(buf, value, cfg, at),
            Node::Collection(node) => node.write(buf, value, cfg, at),
            Node::Composite(node) => node.write(buf, value, cfg, at),
        }
    }

    /// Reads a value.
    pub(crate) fn read(&self, buf: &mut impl Buf, cfg: &Config, at: Location) -> Result<Value, Error> {
        match self {
            Node::Primitive(node) => node.read(buf, cfg, at),
            Node::Sequence(node) => node.read(buf, cfg, at),
            Node::Collection(node) => node.read(buf, cfg, at),
            Node::Composite(node) => node.read(buf, cfg, at),
        }
    }
}

/// Reports a value whose variant does not match the node it was handed to.
pub(crate) fn mismatch(at: Location, expected: &str, found: &ValueRef<'_>) -> Error {
    Error::Internal(
        at,
        format!("expected {expected} value, found {}", found.describe()),
    )
}
