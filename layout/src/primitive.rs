//! Intrinsic scalar kinds.
//!
//! Every [Primitive] has a natural width in bytes and a zero default. A field may declare a
//! narrower width, in which case only the low-order bytes of the value's bit pattern are
//! written (in the configured byte order) and the value must fit in a signed two's-complement
//! integer of that many bytes.
//!
//! # Bit patterns
//!
//! * Integers are sign-extended (or zero-extended, if unsigned) to 64 bits.
//! * `f32` and `f64` use their IEEE-754 representation.
//! * `char` uses its Unicode scalar value.
//!
//! When decoding a narrowed value, signed integers are sign-extended back to their natural
//! width. All other kinds are zero-extended.

use crate::{config::Endian, error::Overflow};
use bytes::{Buf, BufMut};
use std::fmt;

/// An intrinsic scalar kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Char,
}

/// A value of some [Primitive] kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
}

/// Decoded bits that do not form a valid value of the expected kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidBits {
    pub kind: Primitive,
    pub bits: u64,
}

impl fmt::Display for InvalidBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} bits {:#x}", self.kind.name(), self.bits)
    }
}

impl Primitive {
    /// Returns the number of bytes a value of this kind occupies when not narrowed.
    pub const fn natural_width(&self) -> usize {
        match self {
            Primitive::Bool | Primitive::I8 | Primitive::U8 => 1,
            Primitive::I16 | Primitive::U16 => 2,
            Primitive::I32 | Primitive::U32 | Primitive::F32 | Primitive::Char => 4,
            Primitive::I64 | Primitive::U64 | Primitive::F64 => 8,
        }
    }

    /// Returns the width actually used for a field declaring `bytes` (0 = unspecified).
    ///
    /// One-byte kinds ignore `bytes` entirely.
    pub const fn effective_width(&self, bytes: usize) -> usize {
        let natural = self.natural_width();
        if bytes == 0 || natural <= 1 || bytes >= natural {
            return natural;
        }
        bytes
    }

    /// Returns the Rust name of this kind.
    pub const fn name(&self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::I8 => "i8",
            Primitive::U8 => "u8",
            Primitive::I16 => "i16",
            Primitive::U16 => "u16",
            Primitive::I32 => "i32",
            Primitive::U32 => "u32",
            Primitive::I64 => "i64",
            Primitive::U64 => "u64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::Char => "char",
        }
    }

    /// Returns the default value of this kind.
    pub const fn default_value(&self) -> Scalar {
        match self {
            Primitive::Bool => Scalar::Bool(false),
            Primitive::I8 => Scalar::I8(0),
            Primitive::U8 => Scalar::U8(0),
            Primitive::I16 => Scalar::I16(0),
            Primitive::U16 => Scalar::U16(0),
            Primitive::I32 => Scalar::I32(0),
            Primitive::U32 => Scalar::U32(0),
            Primitive::I64 => Scalar::I64(0),
            Primitive::U64 => Scalar::U64(0),
            Primitive::F32 => Scalar::F32(0.0),
            Primitive::F64 => Scalar::F64(0.0),
            Primitive::Char => Scalar::Char('\0'),
        }
    }

    const fn is_signed(&self) -> bool {
        matches!(
            self,
            Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64
        )
    }

    /// Reads a value of this kind occupying `width` bytes.
    ///
    /// The caller must ensure `buf` holds at least `width` bytes and that `width` is no
    /// larger than the natural width.
    pub fn read(
        &self,
        buf: &mut impl Buf,
        width: usize,
        endian: Endian,
    ) -> Result<Scalar, InvalidBits> {
        let raw = match endian {
            Endian::Big => buf.get_uint(width),
            Endian::Little => buf.get_uint_le(width),
        };
        let bits = if self.is_signed() {
            let shift = 64 - 8 * width as u32;
            (((raw << shift) as i64) >> shift) as u64
        } else {
            raw
        };
        let invalid = InvalidBits { kind: *self, bits };
        Ok(match self {
            Primitive::Bool => match bits {
                0 => Scalar::Bool(false),
                1 => Scalar::Bool(true),
                _ => return Err(invalid),
            },
            Primitive::I8 => Scalar::I8(bits as i8),
            Primitive::U8 => Scalar::U8(bits as u8),
            Primitive::I16 => Scalar::I16(bits as i16),
            Primitive::U16 => Scalar::U16(bits as u16),
            Primitive::I32 => Scalar::I32(bits as i32),
            Primitive::U32 => Scalar::U32(bits as u32),
            Primitive::I64 => Scalar::I64(bits as i64),
            Primitive::U64 => Scalar::U64(bits),
            Primitive::F32 => Scalar::F32(f32::from_bits(bits as u32)),
            Primitive::F64 => Scalar::F64(f64::from_bits(bits)),
            Primitive::Char => match char::from_u32(bits as u32) {
                Some(c) => Scalar::Char(c),
                None => return Err(invalid),
            },
        })
    }
}

impl Scalar {
    /// Returns the kind of this value.
    pub const fn kind(&self) -> Primitive {
        match self {
            Scalar::Bool(_) => Primitive::Bool,
            Scalar::I8(_) => Primitive::I8,
            Scalar::U8(_) => Primitive::U8,
            Scalar::I16(_) => Primitive::I16,
            Scalar::U16(_) => Primitive::U16,
            Scalar::I32(_) => Primitive::I32,
            Scalar::U32(_) => Primitive::U32,
            Scalar::I64(_) => Primitive::I64,
            Scalar::U64(_) => Primitive::U64,
            Scalar::F32(_) => Primitive::F32,
            Scalar::F64(_) => Primitive::F64,
            Scalar::Char(_) => Primitive::Char,
        }
    }

    /// Returns the 64-bit pattern whose low-order bytes are written.
    pub fn bits(&self) -> u64 {
        match *self {
            Scalar::Bool(v) => v as u64,
            Scalar::I8(v) => v as i64 as u64,
            Scalar::U8(v) => v as u64,
            Scalar::I16(v) => v as i64 as u64,
            Scalar::U16(v) => v as u64,
            Scalar::I32(v) => v as i64 as u64,
            Scalar::U32(v) => v as u64,
            Scalar::I64(v) => v as u64,
            Scalar::U64(v) => v,
            Scalar::F32(v) => v.to_bits() as u64,
            Scalar::F64(v) => v.to_bits(),
            Scalar::Char(v) => v as u64,
        }
    }

    /// Checks that this value fits in a signed two's-complement integer of `width` bytes.
    ///
    /// Floating-point values are compared by magnitude (`NaN` never fits).
    pub fn check_fits(&self, width: usize) -> Result<(), Overflow> {
        let bits = 8 * width as u32 - 1;
        let fits = match *self {
            Scalar::F32(v) => fits_float(v as f64, bits),
            Scalar::F64(v) => fits_float(v, bits),
            Scalar::Bool(v) => fits_int(v as i128, bits),
            Scalar::I8(v) => fits_int(v as i128, bits),
            Scalar::U8(v) => fits_int(v as i128, bits),
            Scalar::I16(v) => fits_int(v as i128, bits),
            Scalar::U16(v) => fits_int(v as i128, bits),
            Scalar::I32(v) => fits_int(v as i128, bits),
            Scalar::U32(v) => fits_int(v as i128, bits),
            Scalar::I64(v) => fits_int(v as i128, bits),
            Scalar::U64(v) => fits_int(v as i128, bits),
            Scalar::Char(v) => fits_int(v as i128, bits),
        };
        if !fits {
            return Err(Overflow::Numeric {
                value: self.to_string(),
                bytes: width,
            });
        }
        Ok(())
    }

    /// Writes the low-order `width` bytes of this value's bit pattern.
    pub fn write(&self, buf: &mut impl BufMut, width: usize, endian: Endian) {
        match endian {
            Endian::Big => buf.put_uint(self.bits(), width),
            Endian::Little => buf.put_uint_le(self.bits(), width),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => fmt::Display::fmt(v, f),
            Scalar::I8(v) => fmt::Display::fmt(v, f),
            Scalar::U8(v) => fmt::Display::fmt(v, f),
            Scalar::I16(v) => fmt::Display::fmt(v, f),
            Scalar::U16(v) => fmt::Display::fmt(v, f),
            Scalar::I32(v) => fmt::Display::fmt(v, f),
            Scalar::U32(v) => fmt::Display::fmt(v, f),
            Scalar::I64(v) => fmt::Display::fmt(v, f),
            Scalar::U64(v) => fmt::Display::fmt(v, f),
            Scalar::F32(v) => fmt::Display::fmt(v, f),
            Scalar::F64(v) => fmt::Display::fmt(v, f),
            Scalar::Char(v) => write!(f, "{v:?}"),
        }
    }
}

fn fits_int(value: i128, bits: u32) -> bool {
    let max = 1i128 << bits;
    value >= -max && value < max
}

fn fits_float(value: f64, bits: u32) -> bool {
    let max = 2f64.powi(bits as i32);
    value >= -max && value < max
}
