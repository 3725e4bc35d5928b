#![forbid(unsafe_code)]

//! Memoization keyed by canonical argument serialization.
//!
//! [`Memo`] wraps a pure function and caches its results. The cache key is a
//! canonical text rendering of the argument value ([`CacheKey`]), so two
//! logically equal argument lists always land on the same entry, while
//! values of distinguishable types (the integer `1` vs the string `"1"`)
//! never collide.
//!
//! [`TryMemo`] is the fallible sibling: computation errors propagate to the
//! caller unchanged and are never cached.

pub mod key;
pub mod memo;

pub use key::{CacheKey, KeyError};
pub use memo::{Memo, MemoError, TryMemo};
