//! Error types for layout operations

use std::fmt;
use thiserror::Error;

/// Where in a record an error was detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    /// Name of the record type that owns the field.
    pub record: &'static str,

    /// Name of the offending field, if the error is tied to one.
    pub field: Option<&'static str>,
}

impl Location {
    /// Location of a whole record.
    pub const fn record(record: &'static str) -> Self {
        Self {
            record,
            field: None,
        }
    }

    /// Location of a single field within a record.
    pub const fn field(record: &'static str, field: &'static str) -> Self {
        Self {
            record,
            field: Some(field),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(field) => write!(f, "{}.{}", self.record, field),
            None => f.write_str(self.record),
        }
    }
}

/// A structural problem with a record's declared schema.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    #[error("no fields declared")]
    NoFields,
    #[error("record has no zero-argument constructor")]
    MissingConstructor,
    #[error("record already appears in the enclosing record chain")]
    Recursive,
    #[error("field declares no [order]")]
    MissingOrder,
    #[error("order {order} declared at position {position} is not sequential")]
    NonSequentialOrder { order: usize, position: usize },
    #[error("byte sequence must declare [bytes] unless it is the tail field")]
    MissingBytes,
    #[error("[bytes] = {bytes} exceeds the natural width of {natural}")]
    BytesTooLarge { bytes: usize, natural: usize },
    #[error("collection must declare [length] unless it is the tail field")]
    MissingLength,
    #[error("collection member type {0} is not statically known")]
    DynamicElement(&'static str),
    #[error("collection member type {0} must be a primitive or a record")]
    UnsupportedElement(String),
    #[error("field type {0} is not supported")]
    UnsupportedField(String),
}

/// A value that cannot be represented in its field's declared width or length.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Overflow {
    #[error("value {value} does not fit in {bytes} signed bytes")]
    Numeric { value: String, bytes: usize },
    #[error("{found} bytes exceed the declared width of {max}")]
    Bytes { found: usize, max: usize },
    #[error("{found} elements exceed the declared length of {max}")]
    Length { found: usize, max: usize },
    #[error("character {0:?} cannot be represented in {1}")]
    Unrepresentable(char, &'static str),
}

/// Coarse classification of an [Error].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The record type's declared shape is invalid. Retrying cannot help.
    Schema,
    /// A specific value does not fit the schema.
    Value,
    /// The input buffer is too short or holds bytes no value encodes to.
    Data,
    /// An invariant of the implementation itself was violated.
    Internal,
}

/// Error type for layout operations
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error("invalid schema at {0}: {1}")]
    Schema(Location, Violation),
    #[error("value overflow at {0}: {1}")]
    Value(Location, Overflow),
    #[error("unexpected end of buffer at {0}: need {1} bytes, {2} remaining")]
    EndOfBuffer(Location, usize, usize),
    #[error("invalid data at {0}: {1}")]
    InvalidData(Location, String), // location, message
    #[error("internal error at {0}: {1}")]
    Internal(Location, String), // location, message
}

impl Error {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Schema(..) => ErrorKind::Schema,
            Error::Value(..) => ErrorKind::Value,
            Error::EndOfBuffer(..) | Error::InvalidData(..) => ErrorKind::Data,
            Error::Internal(..) => ErrorKind::Internal,
        }
    }

    /// Returns where the error was detected.
    pub fn location(&self) -> Location {
        match self {
            Error::Schema(at, _)
            | Error::Value(at, _)
            | Error::EndOfBuffer(at, ..)
            | Error::InvalidData(at, _)
            | Error::Internal(at, _) => *at,
        }
    }
}
