//! Serialize records into schema-controlled fixed binary layouts.
//!
//! # Overview
//!
//! Each record type declares, per field, a position (`order`), an optional byte width (`bytes`)
//! and an optional collection length (`length`). From these declarations the codec derives a
//! deterministic binary layout:
//!
//! - Fields are laid out back to back in declaration order, with no tags or length prefixes.
//! - Primitives occupy their natural width, or fewer bytes if `bytes` narrows them (values that
//!   do not fit are rejected).
//! - Text and raw bytes occupy exactly `bytes` bytes, zero-padded.
//! - Collections occupy exactly `length` member slots, zero-padded.
//! - The last field (the tail) may omit `bytes` or `length`, in which case it occupies exactly
//!   its content when encoding and everything that remains when decoding.
//!
//! Record types are validated once per process, the first time they are used, and the resulting
//! node tree is cached for all later calls.
//!
//! # Supported Types
//!
//! - Primitives: `bool`, `i8`, `u8`, `i16`, `u16`, `i32`, `u32`, `i64`, `u64`, `f32`, `f64`, `char`
//! - Text: `String`, encoded with the configured [Charset]
//! - Raw bytes: [bytes::Bytes]
//! - Collections: `Vec<T>` and `BTreeSet<T>` of primitives or records
//! - Nested records, and `Option<T>` / `Box<T>` of any of the above
//!
//! # Example
//!
//! ```
//! use commonware_layout::{record, Codec, Config, Endian};
//!
//! record! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct Point {
//!         #[field(order = 0, bytes = 2)]
//!         pub x: i32,
//!         #[field(order = 1, bytes = 2)]
//!         pub y: i32,
//!     }
//! }
//!
//! record! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct Path {
//!         #[field(order = 0, bytes = 8)]
//!         pub name: String,
//!         #[field(order = 1)]
//!         pub points: Vec<Point>,
//!     }
//! }
//!
//! let codec = Codec::new(Config::default().with_endian(Endian::Little));
//! let path = Path {
//!     name: "route".into(),
//!     points: vec![Point { x: 1, y: -1 }, Point { x: 300, y: 0 }],
//! };
//! let encoded = codec.encode(&path).unwrap();
//! assert_eq!(encoded.len(), 8 + 2 * 4);
//! assert_eq!(&encoded[8..12], [1, 0, 0xFF, 0xFF]);
//! assert_eq!(codec.decode::<Path>(encoded).unwrap(), path);
//! ```

mod macros;

pub mod codec;
pub mod config;
pub mod error;
mod node;
pub mod primitive;
mod registry;
pub mod schema;
mod util;
mod validate;
pub mod value;

// Re-export main types and traits
pub use codec::Codec;
pub use config::{Charset, Config, Endian};
pub use error::{Error, ErrorKind, Location, Overflow, Violation};
pub use primitive::{Primitive, Scalar};
pub use schema::{FieldDef, FieldSpec, Record, RecordRef, RecordSchema, Schema, Shape};
pub use value::{FieldValue, Value, ValueRef};
