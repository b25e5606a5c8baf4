use super::{mismatch, Node};
use crate::{
    config::Config,
    error::{Error, Location, Overflow},
    util::at_least,
    value::{Value, ValueRef},
};
use bytes::{Buf, BufMut};

/// A homogeneous collection of uniformly sized members.
///
/// With a declared length, the collection always occupies `length` member slots and unused slots
/// are zero-filled. Without one (tail), it holds exactly the present members and decoding reads
/// members until the buffer is exhausted.
pub(crate) struct CollectionNode {
    length: Option<usize>,
    member: Box<Node>,
}

impl CollectionNode {
    pub(crate) fn new(length: Option<usize>, member: Node) -> Self {
        Self {
            length,
            member: Box::new(member),
        }
    }

    fn members<'v, 'a>(
        value: &'v ValueRef<'a>,
        at: Location,
    ) -> Result<&'v [ValueRef<'a>], Error> {
        match value {
            ValueRef::Absent => Ok(&[][..]),
            ValueRef::List(members) => Ok(members.as_slice()),
            other => Err(mismatch(at, "collection", other)),
        }
    }

    /// Every slot has the size of an absent member.
    fn slot(&self, cfg: &Config, at: Location) -> Result<usize, Error> {
        self.member.size(&ValueRef::Absent, cfg, at)
    }

    pub(crate) fn size(
        &self,
        value: &ValueRef<'_>,
        cfg: &Config,
        at: Location,
    ) -> Result<usize, Error> {
        let count = Self::members(value, at)?.len();
        let slots = self.length.unwrap_or(count);
        slots
            .checked_mul(self.slot(cfg, at)?)
            .ok_or_else(|| Error::Internal(at, "collection size overflows usize".into()))
    }

    pub(crate) fn write(
        &self,
        buf: &mut impl BufMut,
        value: &ValueRef<'_>,
        cfg: &Config,
        at: Location,
    ) -> Result<(), Error> {
        let members = Self::members(value, at)?;
        if let Some(length) = self.length {
            if members.len() > length {
                return Err(Error::Value(
                    at,
                    Overflow::Length {
                        found: members.len(),
                        max: length,
                    },
                ));
            }
        }
        for member in members {
            self.member.write(buf, member, cfg, at)?;
        }
        if let Some(length) = self.length {
            let padding = (length - members.len()) * self.slot(cfg, at)?;
            buf.put_bytes(0, padding);
        }
        Ok(())
    }

    pub(crate) fn read(&self, buf: &mut impl Buf, cfg: &Config, at: Location) -> Result<Value, Error> {
        let slot = self.slot(cfg, at)?;
        if slot == 0 {
            return Err(Error::Internal(at, "collection member has no size".into()));
        }
        let members = match self.length {
            Some(length) => {
                // Check the whole collection is present before allocating for it
                let remaining = buf.remaining();
                let Some(needed) = length.checked_mul(slot) else {
                    return Err(Error::EndOfBuffer(at, usize::MAX, remaining));
                };
                at_least(buf, needed, at)?;

                let mut members = Vec::with_capacity(length);
                for _ in 0..length {
                    members.push(self.member.read(buf, cfg, at)?);
                }
                members
            }
            None => {
                let mut members = Vec::new();
                while buf.has_remaining() {
                    members.push(self.member.read(buf, cfg, at)?);
                }
                members
            }
        };
        Ok(Value::List(members))
    }
}
