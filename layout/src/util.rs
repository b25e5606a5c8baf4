//! Utility functions for node implementations

use crate::error::{Error, Location};
use bytes::Buf;

/// Checks that `buf` holds at least `len` bytes, blaming `at` otherwise.
#[inline]
pub(crate) fn at_least(buf: &impl Buf, len: usize, at: Location) -> Result<(), Error> {
    let remaining = buf.remaining();
    if remaining < len {
        return Err(Error::EndOfBuffer(at, len, remaining));
    }
    Ok(())
}
