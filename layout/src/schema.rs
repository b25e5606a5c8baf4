//! Declarative description of record types.
//!
//! A [Record] describes itself with a [Schema]: a name, an optional zero-argument constructor,
//! and an ordered list of [FieldSpec]s. Each field carries the `{order, bytes, length}` triple
//! plus a pair of accessor function pointers, so the codec never needs runtime reflection.
//!
//! Most records are declared with [crate::record!], which derives the schema from the struct
//! definition.
//!
//! # Example
//!
//! ```
//! use commonware_layout::{nested_record, FieldSpec, Record, Schema};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! fn x(point: &Point) -> &i32 {
//!     &point.x
//! }
//! fn x_mut(point: &mut Point) -> &mut i32 {
//!     &mut point.x
//! }
//! fn y(point: &Point) -> &i32 {
//!     &point.y
//! }
//! fn y_mut(point: &mut Point) -> &mut i32 {
//!     &mut point.y
//! }
//!
//! impl Record for Point {
//!     fn schema() -> Schema<Self> {
//!         Schema::new("Point")
//!             .constructor(Point::default)
//!             .field(FieldSpec::new("x", x, x_mut).order(0).bytes(2))
//!             .field(FieldSpec::new("y", y, y_mut).order(1).bytes(2))
//!     }
//! }
//! nested_record!(Point);
//! ```

use crate::{
    primitive::Primitive,
    value::{FieldValue, Value, ValueRef},
};
use std::{
    any::{type_name, Any, TypeId},
    fmt,
    marker::PhantomData,
    sync::Arc,
};

/// A type with a declared binary layout.
pub trait Record: Sized + Send + 'static {
    /// Describes the fields of this record.
    fn schema() -> Schema<Self>;
}

/// Creates a default instance of a record, type-erased.
pub(crate) type Constructor = Arc<dyn Fn() -> Box<dyn Any + Send> + Send + Sync>;

/// A reference to a record type, used where a field nests another record.
#[derive(Clone, Copy)]
pub struct RecordRef {
    id: TypeId,
    name: &'static str,
    describe: fn() -> RecordSchema,
}

impl RecordRef {
    /// Returns a reference to `R`.
    pub fn of<R: Record>() -> Self {
        Self {
            id: TypeId::of::<R>(),
            name: type_name::<R>(),
            describe: describe::<R>,
        }
    }

    /// Returns the identity of the referenced type.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the Rust name of the referenced type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the schema of the referenced type.
    pub fn describe(&self) -> RecordSchema {
        (self.describe)()
    }
}

fn describe<R: Record>() -> RecordSchema {
    RecordSchema::of::<R>()
}

impl PartialEq for RecordRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RecordRef {}

impl fmt::Debug for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordRef").field(&self.name).finish()
    }
}

/// The declared type of a field or of a collection's members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// An intrinsic scalar.
    Primitive(Primitive),
    /// Text, encoded with the configured charset.
    Text,
    /// Raw bytes.
    Bytes,
    /// A nested record.
    Record(RecordRef),
    /// A homogeneous collection of members of the inner shape.
    Collection(Box<Shape>),
    /// A type only known at runtime (such as a trait object).
    Dynamic(&'static str),
    /// Any other type.
    Unsupported(&'static str),
}

impl Shape {
    /// Returns a human-readable name of this shape.
    pub fn name(&self) -> String {
        match self {
            Shape::Primitive(primitive) => primitive.name().to_string(),
            Shape::Text => "text".to_string(),
            Shape::Bytes => "bytes".to_string(),
            Shape::Record(record) => record.name().to_string(),
            Shape::Collection(member) => format!("collection of {}", member.name()),
            Shape::Dynamic(name) | Shape::Unsupported(name) => name.to_string(),
        }
    }
}

/// Type-erased get/set access to one field of a record.
pub(crate) trait Accessor: Send + Sync {
    /// Borrows the field of `record`, or returns `None` if `record` has the wrong type.
    fn get<'a>(&self, record: &'a dyn Any) -> Option<ValueRef<'a>>;

    /// Stores `value` into the field of `record`, returning `false` on a type mismatch.
    fn set(&self, record: &mut dyn Any, value: Value) -> bool;
}

struct Binding<T, V> {
    get: fn(&T) -> &V,
    get_mut: fn(&mut T) -> &mut V,
}

impl<T: 'static, V: FieldValue> Accessor for Binding<T, V> {
    fn get<'a>(&self, record: &'a dyn Any) -> Option<ValueRef<'a>> {
        let record = record.downcast_ref::<T>()?;
        Some((self.get)(record).to_value())
    }

    fn set(&self, record: &mut dyn Any, value: Value) -> bool {
        let Some(record) = record.downcast_mut::<T>() else {
            return false;
        };
        let Some(value) = V::from_value(value) else {
            return false;
        };
        *(self.get_mut)(record) = value;
        true
    }
}

/// Declaration of a single field of record `T`.
pub struct FieldSpec<T> {
    name: &'static str,
    order: Option<usize>,
    bytes: usize,
    length: Option<usize>,
    shape: Shape,
    accessor: Option<Arc<dyn Accessor>>,
    _record: PhantomData<fn(&T)>,
}

impl<T: 'static> FieldSpec<T> {
    /// Declares a field accessed through `get` and `get_mut`. Its shape follows from `V`.
    pub fn new<V: FieldValue>(
        name: &'static str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> Self {
        Self {
            name,
            order: None,
            bytes: 0,
            length: None,
            shape: V::shape(),
            accessor: Some(Arc::new(Binding { get, get_mut })),
            _record: PhantomData,
        }
    }

    /// Declares a field of a type the codec cannot access, such as a trait object.
    ///
    /// Validation always rejects such fields; declaring them lets the rejection name the field.
    pub fn declared(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            order: None,
            bytes: 0,
            length: None,
            shape,
            accessor: None,
            _record: PhantomData,
        }
    }

    /// Sets the 0-based position of the field in the layout.
    ///
    /// Fields are not sorted by `order`: it must equal the position at which the field is added
    /// to its [Schema], or validation fails.
    pub fn order(mut self, order: usize) -> Self {
        self.order = Some(order);
        self
    }

    /// Sets the explicit byte width (0 = natural width, or the rest of the buffer for a tail
    /// byte sequence).
    pub fn bytes(mut self, bytes: usize) -> Self {
        self.bytes = bytes;
        self
    }

    /// Sets the explicit collection length (0 = inferred, for a tail collection).
    pub fn length(mut self, length: usize) -> Self {
        self.length = (length > 0).then_some(length);
        self
    }
}

/// Declaration of record `T`.
pub struct Schema<T> {
    name: &'static str,
    constructor: Option<fn() -> T>,
    fields: Vec<FieldSpec<T>>,
}

impl<T: Record> Schema<T> {
    /// Starts a schema for the record named `name`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            constructor: None,
            fields: Vec::new(),
        }
    }

    /// Sets the zero-argument constructor used to create instances while decoding.
    pub fn constructor(mut self, constructor: fn() -> T) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// Appends a field.
    pub fn field(mut self, field: FieldSpec<T>) -> Self {
        self.fields.push(field);
        self
    }
}

/// A type-erased field declaration.
#[derive(Clone)]
pub struct FieldDef {
    pub(crate) name: &'static str,
    pub(crate) order: Option<usize>,
    pub(crate) bytes: usize,
    pub(crate) length: Option<usize>,
    pub(crate) shape: Shape,
    pub(crate) accessor: Option<Arc<dyn Accessor>>,
}

impl FieldDef {
    /// Returns the field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the declared order, if any.
    pub fn order(&self) -> Option<usize> {
        self.order
    }

    /// Returns the declared byte width (0 = unspecified).
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Returns the declared collection length, if any.
    pub fn length(&self) -> Option<usize> {
        self.length
    }

    /// Returns the declared shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("order", &self.order)
            .field("bytes", &self.bytes)
            .field("length", &self.length)
            .field("shape", &self.shape)
            .finish()
    }
}

/// A type-erased record declaration.
#[derive(Clone)]
pub struct RecordSchema {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
    pub(crate) constructor: Option<Constructor>,
    pub(crate) fields: Vec<FieldDef>,
}

impl RecordSchema {
    /// Describes record `R`.
    pub fn of<R: Record>() -> Self {
        let schema = R::schema();
        let constructor = schema.constructor.map(|construct| {
            Arc::new(move || Box::new(construct()) as Box<dyn Any + Send>) as Constructor
        });
        let fields = schema
            .fields
            .into_iter()
            .map(|field| FieldDef {
                name: field.name,
                order: field.order,
                bytes: field.bytes,
                length: field.length,
                shape: field.shape,
                accessor: field.accessor,
            })
            .collect();
        Self {
            id: TypeId::of::<R>(),
            name: schema.name,
            constructor,
            fields,
        }
    }

    /// Returns the identity of the described type.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the record name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns whether instances can be created while decoding.
    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    /// Returns the fields in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }
}

impl fmt::Debug for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema")
            .field("name", &self.name)
            .field("constructible", &self.is_constructible())
            .field("fields", &self.fields)
            .finish()
    }
}
