//! Macros for declaring records.

/// Declares a struct together with its [crate::Record] and [crate::FieldValue] implementations.
///
/// Every field carries a `#[field(...)]` attribute listing its layout options:
///
/// * `order`: 0-based position of the field (required, must match the declaration position).
/// * `bytes`: explicit byte width (narrows primitives, fixes the width of text and bytes).
/// * `length`: explicit number of collection slots.
///
/// The struct must implement [Default], which is used to construct instances while decoding.
///
/// Padding is not recorded in the layout, so some values do not survive a round trip unchanged:
///
/// * Fixed-width text drops trailing NUL characters.
/// * Fixed-width [bytes::Bytes] decode with their zero padding (always `bytes` long).
/// * A `None` [Option] encodes as zeros and decodes as `Some` of the default.
/// * Unused collection slots decode as default members.
///
/// # Example
///
/// ```
/// use commonware_layout::{record, Codec};
///
/// record! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Reading {
///         #[field(order = 0, bytes = 2)]
///         pub sensor: u32,
///         #[field(order = 1, length = 3)]
///         pub samples: Vec<i16>,
///         #[field(order = 2)]
///         pub label: String,
///     }
/// }
///
/// let codec = Codec::default();
/// let reading = Reading {
///     sensor: 7,
///     samples: vec![-1, 1],
///     label: "north".into(),
/// };
/// let encoded = codec.encode(&reading).unwrap();
/// assert_eq!(encoded.len(), 2 + 3 * 2 + 5);
/// assert_eq!(codec.decode::<Reading>(encoded).unwrap().label, "north");
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                #[field($($key:ident = $val:expr),* $(,)?)]
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::Record for $name {
            fn schema() -> $crate::Schema<Self> {
                $crate::Schema::new(stringify!($name))
                    .constructor(<Self as ::core::default::Default>::default)
                    $(
                        .field({
                            fn get(record: &$name) -> &$ty {
                                &record.$field
                            }
                            fn get_mut(record: &mut $name) -> &mut $ty {
                                &mut record.$field
                            }
                            $crate::FieldSpec::new(stringify!($field), get, get_mut)
                                $(.$key($val))*
                        })
                    )*
            }
        }

        $crate::nested_record!($name);
    };
}

/// Implements [crate::FieldValue] for a [crate::Record], so it can be nested in other records.
///
/// Invoked by [crate::record!]; only needed for records that implement [crate::Record] by hand.
#[macro_export]
macro_rules! nested_record {
    ($type:ty) => {
        impl $crate::FieldValue for $type {
            fn shape() -> $crate::Shape {
                $crate::Shape::Record($crate::RecordRef::of::<Self>())
            }

            fn to_value(&self) -> $crate::ValueRef<'_> {
                $crate::ValueRef::Record(self)
            }

            fn from_value(value: $crate::Value) -> ::core::option::Option<Self> {
                value.into_record::<Self>()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{
        primitive::Primitive,
        schema::{RecordSchema, Shape},
        FieldValue,
    };

    crate::record! {
        #[derive(Debug, Default, PartialEq)]
        struct Inner {
            #[field(order = 0)]
            value: u8,
        }
    }

    crate::record! {
        /// Documented.
        #[derive(Debug, Default, PartialEq)]
        pub(crate) struct Outer {
            #[field(order = 0, bytes = 2)]
            /// Narrowed.
            pub(crate) id: i64,
            #[field(order = 1, length = 4,)]
            inners: Vec<Inner>,
            #[field(order = 2)]
            name: String,
        }
    }

    #[test]
    fn test_schema() {
        let schema = RecordSchema::of::<Outer>();
        assert_eq!(schema.name(), "Outer");
        assert!(schema.is_constructible());

        let fields = schema.fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name(), "id");
        assert_eq!(fields[0].order(), Some(0));
        assert_eq!(fields[0].bytes(), 2);
        assert_eq!(fields[0].shape(), &Shape::Primitive(Primitive::I64));
        assert_eq!(fields[1].length(), Some(4));
        assert_eq!(fields[1].shape(), &Vec::<Inner>::shape());
        assert_eq!(fields[2].bytes(), 0);
        assert_eq!(fields[2].length(), None);
        assert_eq!(fields[2].shape(), &Shape::Text);
    }

    #[test]
    fn test_nested() {
        match Inner::shape() {
            Shape::Record(record) => {
                assert_eq!(record.describe().name(), "Inner");
                assert_eq!(record.id(), std::any::TypeId::of::<Inner>());
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }
}
