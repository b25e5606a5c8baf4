//! Field values as seen by the node tree.
//!
//! Encoding borrows each field through [ValueRef]; decoding produces an owned [Value] that is
//! converted back into the field's Rust type. [FieldValue] connects the two with the field's
//! declared [Shape].

use crate::{
    primitive::{Primitive, Scalar},
    schema::Shape,
};
use bytes::Bytes;
use std::{any::Any, collections::BTreeSet, fmt};

/// A borrowed field value, produced while encoding.
#[derive(Clone, Debug)]
pub enum ValueRef<'a> {
    /// No value. Encodes as zero bytes of the field's size.
    Absent,
    Scalar(Scalar),
    Text(&'a str),
    Bytes(&'a [u8]),
    List(Vec<ValueRef<'a>>),
    Record(&'a dyn Any),
}

impl ValueRef<'_> {
    /// Returns a short description of the variant, for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            ValueRef::Absent => "absent",
            ValueRef::Scalar(scalar) => scalar.kind().name(),
            ValueRef::Text(_) => "text",
            ValueRef::Bytes(_) => "bytes",
            ValueRef::List(_) => "list",
            ValueRef::Record(_) => "record",
        }
    }
}

/// An owned field value, produced while decoding.
pub enum Value {
    Scalar(Scalar),
    Text(String),
    Bytes(Bytes),
    List(Vec<Value>),
    Record(Box<dyn Any + Send>),
}

impl Value {
    /// Unwraps a decoded record of type `R`.
    pub fn into_record<R: Any>(self) -> Option<R> {
        match self {
            Value::Record(record) => record.downcast::<R>().ok().map(|record| *record),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(scalar) => f.debug_tuple("Scalar").field(scalar).finish(),
            Value::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Value::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Record(_) => f.write_str("Record(..)"),
        }
    }
}

/// A Rust type that can be stored in a record field.
///
/// Implemented for the primitives, [String] (text), [Bytes] (raw bytes), [Vec] and [BTreeSet]
/// (collections), [Option] (a field that may be absent), [Box], and every record type declared with
/// [crate::record!] or [crate::nested_record!].
pub trait FieldValue: Sized + 'static {
    /// Returns the declared shape of fields of this type.
    fn shape() -> Shape;

    /// Borrows this value for encoding.
    fn to_value(&self) -> ValueRef<'_>;

    /// Rebuilds a value from its decoded form, returning `None` on a shape mismatch.
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! impl_scalar {
    ($type:ty, $variant:ident) => {
        impl FieldValue for $type {
            #[inline]
            fn shape() -> Shape {
                Shape::Primitive(Primitive::$variant)
            }

            #[inline]
            fn to_value(&self) -> ValueRef<'_> {
                ValueRef::Scalar(Scalar::$variant(*self))
            }

            #[inline]
            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::Scalar(Scalar::$variant(v)) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_scalar!(bool, Bool);
impl_scalar!(i8, I8);
impl_scalar!(u8, U8);
impl_scalar!(i16, I16);
impl_scalar!(u16, U16);
impl_scalar!(i32, I32);
impl_scalar!(u32, U32);
impl_scalar!(i64, I64);
impl_scalar!(u64, U64);
impl_scalar!(f32, F32);
impl_scalar!(f64, F64);
impl_scalar!(char, Char);

impl FieldValue for String {
    fn shape() -> Shape {
        Shape::Text
    }

    fn to_value(&self) -> ValueRef<'_> {
        ValueRef::Text(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl FieldValue for Bytes {
    fn shape() -> Shape {
        Shape::Bytes
    }

    fn to_value(&self) -> ValueRef<'_> {
        ValueRef::Bytes(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn shape() -> Shape {
        Shape::Collection(Box::new(T::shape()))
    }

    fn to_value(&self) -> ValueRef<'_> {
        ValueRef::List(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

// Duplicate members collapse when decoding.
impl<T: FieldValue + Ord> FieldValue for BTreeSet<T> {
    fn shape() -> Shape {
        Shape::Collection(Box::new(T::shape()))
    }

    fn to_value(&self) -> ValueRef<'_> {
        ValueRef::List(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl<T: FieldValue> FieldValue for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn to_value(&self) -> ValueRef<'_> {
        (**self).to_value()
    }

    fn from_value(value: Value) -> Option<Self> {
        T::from_value(value).map(Box::new)
    }
}

// An absent value encodes as zero bytes, which decode as `Some` of the default.
impl<T: FieldValue> FieldValue for Option<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn to_value(&self) -> ValueRef<'_> {
        match self {
            Some(inner) => inner.to_value(),
            None => ValueRef::Absent,
        }
    }

    fn from_value(value: Value) -> Option<Self> {
        T::from_value(value).map(Some)
    }
}
