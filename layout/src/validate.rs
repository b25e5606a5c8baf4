//! Structural validation of record schemas.
//!
//! A schema is valid when:
//!
//! * It declares at least one field and a zero-argument constructor.
//! * Every field declares an `order` equal to its declaration position.
//! * No primitive declares more `bytes` than its natural width.
//! * Every text or byte field declares `bytes`, unless it is the tail field.
//! * Every collection declares `length`, unless it is the tail field, and its members are
//!   primitives or records.
//! * No record contains itself, directly or through any chain of nested records.
//!
//! The tail field is the last field of the root record. A nested record's last field is also a
//! tail field when the nested record is itself the tail field of its parent.
//!
//! Fields are never reordered: the layout follows declaration order, which `order` must repeat.

use crate::{
    error::{Error, Location, Violation},
    schema::{FieldDef, RecordSchema, Shape},
};
use std::any::TypeId;

/// Validates `schema` and every record it nests.
pub(crate) fn validate(schema: &RecordSchema) -> Result<(), Error> {
    let mut chain = Vec::new();
    record(schema, true, &mut chain)
}

fn record(schema: &RecordSchema, tail: bool, chain: &mut Vec<TypeId>) -> Result<(), Error> {
    let at = Location::record(schema.name);
    if chain.contains(&schema.id) {
        return Err(Error::Schema(at, Violation::Recursive));
    }
    if schema.fields.is_empty() {
        return Err(Error::Schema(at, Violation::NoFields));
    }
    if schema.constructor.is_none() {
        return Err(Error::Schema(at, Violation::MissingConstructor));
    }

    chain.push(schema.id);
    let result = fields(schema, tail, chain);
    chain.pop();
    result
}

fn fields(schema: &RecordSchema, tail: bool, chain: &mut Vec<TypeId>) -> Result<(), Error> {
    let last = schema.fields.len() - 1;
    for (position, def) in schema.fields.iter().enumerate() {
        let at = Location::field(schema.name, def.name);
        match def.order {
            None => return Err(Error::Schema(at, Violation::MissingOrder)),
            Some(order) if order != position => {
                return Err(Error::Schema(
                    at,
                    Violation::NonSequentialOrder { order, position },
                ))
            }
            Some(_) => {}
        }
        field(def, tail && position == last, at, chain)?;
    }
    Ok(())
}

fn field(def: &FieldDef, tail: bool, at: Location, chain: &mut Vec<TypeId>) -> Result<(), Error> {
    match &def.shape {
        Shape::Primitive(kind) => {
            let natural = kind.natural_width();
            if natural > 1 && def.bytes > natural {
                return Err(Error::Schema(
                    at,
                    Violation::BytesTooLarge {
                        bytes: def.bytes,
                        natural,
                    },
                ));
            }
        }
        Shape::Text | Shape::Bytes => {
            if def.bytes == 0 && !tail {
                return Err(Error::Schema(at, Violation::MissingBytes));
            }
        }
        Shape::Record(nested) => record(&nested.describe(), tail, chain)?,
        Shape::Collection(member) => {
            if def.length.is_none() && !tail {
                return Err(Error::Schema(at, Violation::MissingLength));
            }
            match member.as_ref() {
                Shape::Primitive(_) => {}
                Shape::Record(nested) => record(&nested.describe(), false, chain)?,
                Shape::Dynamic(name) => {
                    return Err(Error::Schema(at, Violation::DynamicElement(*name)))
                }
                other => {
                    return Err(Error::Schema(
                        at,
                        Violation::UnsupportedElement(other.name()),
                    ))
                }
            }
        }
        Shape::Dynamic(name) | Shape::Unsupported(name) => {
            return Err(Error::Schema(
                at,
                Violation::UnsupportedField(name.to_string()),
            ))
        }
    }

    // Declared-only fields cannot be read or written
    if def.accessor.is_none() {
        return Err(Error::Schema(
            at,
            Violation::UnsupportedField(def.shape.name()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        record,
        schema::{FieldSpec, Record, Schema},
    };

    fn check<R: Record>() -> Result<(), Error> {
        validate(&RecordSchema::of::<R>())
    }

    fn violation<R: Record>() -> (Location, Violation) {
        match check::<R>() {
            Err(Error::Schema(at, violation)) => (at, violation),
            other => panic!("expected schema error, found {other:?}"),
        }
    }

    record! {
        #[derive(Default)]
        struct Point {
            #[field(order = 0, bytes = 2)]
            x: i32,
            #[field(order = 1, bytes = 2)]
            y: i32,
        }
    }

    record! {
        #[derive(Default)]
        struct Segment {
            #[field(order = 0)]
            start: Point,
            #[field(order = 1)]
            end: Point,
            #[field(order = 2, length = 2)]
            via: Vec<Point>,
            #[field(order = 3, bytes = 8)]
            label: String,
        }
    }

    #[test]
    fn test_valid() {
        assert_eq!(check::<Point>(), Ok(()));

        // The same record type may appear more than once
        assert_eq!(check::<Segment>(), Ok(()));
    }

    #[derive(Default)]
    struct Empty;

    impl Record for Empty {
        fn schema() -> Schema<Self> {
            Schema::new("Empty").constructor(Empty::default)
        }
    }

    #[test]
    fn test_no_fields() {
        assert_eq!(
            violation::<Empty>(),
            (Location::record("Empty"), Violation::NoFields)
        );
    }

    struct Unconstructible {
        value: u8,
    }

    fn value(record: &Unconstructible) -> &u8 {
        &record.value
    }
    fn value_mut(record: &mut Unconstructible) -> &mut u8 {
        &mut record.value
    }

    impl Record for Unconstructible {
        fn schema() -> Schema<Self> {
            Schema::new("Unconstructible").field(FieldSpec::new("value", value, value_mut).order(0))
        }
    }

    #[test]
    fn test_missing_constructor() {
        assert_eq!(
            violation::<Unconstructible>(),
            (
                Location::record("Unconstructible"),
                Violation::MissingConstructor
            )
        );
    }

    record! {
        #[derive(Default)]
        struct Shuffled {
            #[field(order = 0)]
            a: u8,
            #[field(order = 2)]
            b: u8,
            #[field(order = 1)]
            c: u8,
        }
    }

    record! {
        #[derive(Default)]
        struct Unordered {
            #[field(order = 0)]
            a: u8,
            #[field()]
            b: u8,
        }
    }

    #[test]
    fn test_order() {
        assert_eq!(
            violation::<Shuffled>(),
            (
                Location::field("Shuffled", "b"),
                Violation::NonSequentialOrder {
                    order: 2,
                    position: 1
                }
            )
        );
        assert_eq!(
            violation::<Unordered>(),
            (Location::field("Unordered", "b"), Violation::MissingOrder)
        );
    }

    record! {
        #[derive(Default)]
        struct Wide {
            #[field(order = 0, bytes = 5)]
            value: i32,
        }
    }

    record! {
        #[derive(Default)]
        struct WideByte {
            #[field(order = 0, bytes = 5)]
            value: u8,
        }
    }

    #[test]
    fn test_bytes_too_large() {
        assert_eq!(
            violation::<Wide>(),
            (
                Location::field("Wide", "value"),
                Violation::BytesTooLarge {
                    bytes: 5,
                    natural: 4
                }
            )
        );

        // One-byte kinds ignore the declared width
        assert_eq!(check::<WideByte>(), Ok(()));
    }

    record! {
        #[derive(Default)]
        struct UnsizedText {
            #[field(order = 0)]
            name: String,
            #[field(order = 1)]
            id: u8,
        }
    }

    record! {
        #[derive(Default)]
        struct UnsizedList {
            #[field(order = 0)]
            items: Vec<u8>,
            #[field(order = 1)]
            id: u8,
        }
    }

    record! {
        #[derive(Default)]
        struct Tails {
            #[field(order = 0, bytes = 4)]
            name: String,
            #[field(order = 1)]
            items: Vec<u16>,
        }
    }

    #[test]
    fn test_tail() {
        assert_eq!(
            violation::<UnsizedText>(),
            (Location::field("UnsizedText", "name"), Violation::MissingBytes)
        );
        assert_eq!(
            violation::<UnsizedList>(),
            (Location::field("UnsizedList", "items"), Violation::MissingLength)
        );
        assert_eq!(check::<Tails>(), Ok(()));
    }

    record! {
        #[derive(Default)]
        struct TailText {
            #[field(order = 0)]
            id: u8,
            #[field(order = 1)]
            name: String,
        }
    }

    record! {
        #[derive(Default)]
        struct NestedTail {
            #[field(order = 0)]
            id: u8,
            #[field(order = 1)]
            inner: TailText,
        }
    }

    record! {
        #[derive(Default)]
        struct NestedNonTail {
            #[field(order = 0)]
            inner: TailText,
            #[field(order = 1)]
            id: u8,
        }
    }

    record! {
        #[derive(Default)]
        struct NestedMember {
            #[field(order = 0, length = 2)]
            inners: Vec<TailText>,
        }
    }

    #[test]
    fn test_nested_tail() {
        assert_eq!(check::<NestedTail>(), Ok(()));
        assert_eq!(
            violation::<NestedNonTail>(),
            (Location::field("TailText", "name"), Violation::MissingBytes)
        );
        assert_eq!(
            violation::<NestedMember>(),
            (Location::field("TailText", "name"), Violation::MissingBytes)
        );
    }

    record! {
        #[derive(Default)]
        struct Tree {
            #[field(order = 0)]
            id: u8,
            #[field(order = 1, length = 2)]
            children: Vec<Tree>,
        }
    }

    record! {
        #[derive(Default)]
        struct Left {
            #[field(order = 0)]
            id: u8,
            #[field(order = 1)]
            right: Option<Box<Right>>,
        }
    }

    record! {
        #[derive(Default)]
        struct Right {
            #[field(order = 0)]
            left: Option<Box<Left>>,
        }
    }

    #[test]
    fn test_recursive() {
        assert_eq!(
            violation::<Tree>(),
            (Location::record("Tree"), Violation::Recursive)
        );
        assert_eq!(
            violation::<Left>(),
            (Location::record("Left"), Violation::Recursive)
        );
        assert_eq!(
            violation::<Right>(),
            (Location::record("Right"), Violation::Recursive)
        );
    }

    record! {
        #[derive(Default)]
        struct Names {
            #[field(order = 0, length = 2)]
            names: Vec<String>,
        }
    }

    #[test]
    fn test_unsupported_element() {
        assert_eq!(
            violation::<Names>(),
            (
                Location::field("Names", "names"),
                Violation::UnsupportedElement("text".into())
            )
        );
    }

    #[derive(Default)]
    struct Handlers {
        id: u8,
    }

    fn id(record: &Handlers) -> &u8 {
        &record.id
    }
    fn id_mut(record: &mut Handlers) -> &mut u8 {
        &mut record.id
    }

    impl Record for Handlers {
        fn schema() -> Schema<Self> {
            Schema::new("Handlers")
                .constructor(Handlers::default)
                .field(FieldSpec::new("id", id, id_mut).order(0))
                .field(
                    FieldSpec::declared(
                        "handlers",
                        Shape::Collection(Box::new(Shape::Dynamic("dyn Handler"))),
                    )
                    .order(1)
                    .length(2),
                )
        }
    }

    #[derive(Default)]
    struct Callback {
        id: u8,
    }

    fn callback_id(record: &Callback) -> &u8 {
        &record.id
    }
    fn callback_id_mut(record: &mut Callback) -> &mut u8 {
        &mut record.id
    }

    impl Record for Callback {
        fn schema() -> Schema<Self> {
            Schema::new("Callback")
                .constructor(Callback::default)
                .field(FieldSpec::new("id", callback_id, callback_id_mut).order(0))
                .field(FieldSpec::declared("callback", Shape::Unsupported("fn()")).order(1))
        }
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(
            violation::<Handlers>(),
            (
                Location::field("Handlers", "handlers"),
                Violation::DynamicElement("dyn Handler")
            )
        );
        assert_eq!(
            violation::<Callback>(),
            (
                Location::field("Callback", "callback"),
                Violation::UnsupportedField("fn()".into())
            )
        );
    }
}
