//! Bit-flag helpers shared by every flag enumeration in the crate.

use std::ops::BitAnd;

/// Anything that can be masked and compared: all primitive integers and the
/// NLM flag newtypes.
pub trait Flags: Copy + PartialEq + BitAnd<Output = Self> {}

impl<T> Flags for T where T: Copy + PartialEq + BitAnd<Output = T> {}

/// Returns true if every bit of `bits` is also set in `base`.
///
/// An empty mask is always set.
pub fn are_set<N: Flags>(base: N, bits: N) -> bool {
    base & bits == bits
}
