#![forbid(unsafe_code)]

//! Memoization wrappers around pure functions.
//!
//! # Design
//!
//! [`Memo<A, R>`] holds a compute function and its result cache in shared,
//! reference-counted storage. Each call renders the argument value as a
//! [`CacheKey`]; a hit returns a clone of the stored result without invoking
//! the function, a miss invokes the function and stores the result. Cloning
//! a `Memo` creates a new handle to the **same** cache.
//!
//! [`TryMemo<A, R, E>`] wraps fallible functions. An `Err` result propagates
//! to the caller unchanged and is never cached, so the next identical call
//! re-invokes the function.
//!
//! # Invariants
//!
//! 1. The compute function runs at most once per distinct cache key (for
//!    `TryMemo`, per distinct key that has produced `Ok`).
//! 2. A stored value is never mutated or evicted; entries live as long as
//!    the memoizer. There is no size bound.
//! 3. `hits() + misses()` equals the number of calls that reached the cache
//!    (key-production failures count toward neither).
//! 4. Key production never invokes the compute function.
//!
//! # Failure Modes
//!
//! - **Unserializable arguments**: surfaced as [`KeyError`] (via
//!   [`MemoError::Key`] on the fallible type), distinct from any computation
//!   error. Nothing is cached.
//! - **Compute function errors or panics**: nothing is cached; the next
//!   identical call re-invokes the function.
//! - **Impure compute function**: hits return the first stored result, which
//!   may be stale. Accepted limitation of memoization, not a bug here.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ahash::AHashMap;
use serde::Serialize;
use thiserror::Error;
use tracing::trace;

use crate::key::{CacheKey, KeyError};

/// Error from a fallible memoized call.
///
/// Keeps the usage error (arguments that cannot form a key) distinct from
/// the wrapped function's own error.
#[derive(Debug, Error)]
pub enum MemoError<E> {
    #[error("cache key serialization failed: {0}")]
    Key(#[from] KeyError),
    #[error("computation failed: {0}")]
    Compute(E),
}

// ---------------------------------------------------------------------------
// Memo
// ---------------------------------------------------------------------------

/// Shared interior for [`Memo<A, R>`].
struct MemoInner<A, R> {
    /// The wrapped computation. Receives the memoizer handle so recursive
    /// sub-calls can go through the cache.
    compute: Box<dyn Fn(&Memo<A, R>, &A) -> R>,
    cache: RefCell<AHashMap<CacheKey, R>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

/// A memoized wrapper around an infallible function.
///
/// Single-threaded by design (`Rc`-based sharing); callers that need
/// concurrent access must add their own discipline outside this type.
///
/// # Invariants
///
/// 1. At most one evaluation per distinct argument serialization across the
///    memoizer's lifetime.
/// 2. Cache state is shared across clones of the same memoizer.
pub struct Memo<A, R> {
    inner: Rc<MemoInner<A, R>>,
}

impl<A, R> Clone for Memo<A, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A, R> std::fmt::Debug for Memo<A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("entries", &self.inner.cache.borrow().len())
            .field("hits", &self.inner.hits.get())
            .field("misses", &self.inner.misses.get())
            .finish()
    }
}

impl<A: Serialize, R: Clone> Memo<A, R> {
    /// Memoize `f`.
    ///
    /// `f` is assumed pure: for an impure function, cache hits return the
    /// first stored result.
    pub fn new(f: impl Fn(&A) -> R + 'static) -> Self {
        Self::recursive(move |_, args| f(args))
    }

    /// Memoize a recursive function.
    ///
    /// The closure receives the memoizer itself, and sub-calls must go
    /// through that handle to hit the cache; recursing into a separate,
    /// un-memoized copy of the function gains nothing.
    ///
    /// # Usage
    ///
    /// ```
    /// use reflex_memo::Memo;
    ///
    /// let fib = Memo::recursive(|fib, n: &u64| {
    ///     if *n < 2 {
    ///         *n
    ///     } else {
    ///         fib.call(&(n - 1)).unwrap() + fib.call(&(n - 2)).unwrap()
    ///     }
    /// });
    /// assert_eq!(fib.call(&30).unwrap(), 832_040);
    /// ```
    pub fn recursive(f: impl Fn(&Self, &A) -> R + 'static) -> Self {
        Self {
            inner: Rc::new(MemoInner {
                compute: Box::new(f),
                cache: RefCell::new(AHashMap::new()),
                hits: Cell::new(0),
                misses: Cell::new(0),
            }),
        }
    }

    /// Call the memoized function.
    ///
    /// Returns a clone of the cached value on a hit; otherwise invokes the
    /// wrapped function, stores the result, and returns it. The only error
    /// is key production; the wrapped function itself cannot fail.
    pub fn call(&self, args: &A) -> Result<R, KeyError> {
        let key = CacheKey::for_args(args)?;
        if let Some(value) = self.inner.cache.borrow().get(&key) {
            self.inner.hits.set(self.inner.hits.get() + 1);
            trace!(key = key.as_str(), "memo hit");
            return Ok(value.clone());
        }
        self.inner.misses.set(self.inner.misses.get() + 1);
        trace!(key = key.as_str(), "memo miss");
        // The cache borrow is released before the compute runs so recursive
        // calls can re-enter `call`.
        let value = (self.inner.compute)(self, args);
        self.inner.cache.borrow_mut().insert(key, value.clone());
        Ok(value)
    }

    /// Whether a result for `args` is already cached.
    pub fn contains(&self, args: &A) -> Result<bool, KeyError> {
        let key = CacheKey::for_args(args)?;
        Ok(self.inner.cache.borrow().contains_key(&key))
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.cache.borrow().len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.cache.borrow().is_empty()
    }

    /// Calls answered from the cache.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.inner.hits.get()
    }

    /// Calls that invoked the wrapped function.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.inner.misses.get()
    }
}

// ---------------------------------------------------------------------------
// TryMemo
// ---------------------------------------------------------------------------

/// Shared interior for [`TryMemo<A, R, E>`].
struct TryMemoInner<A, R, E> {
    compute: Box<dyn Fn(&TryMemo<A, R, E>, &A) -> Result<R, E>>,
    cache: RefCell<AHashMap<CacheKey, R>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

/// A memoized wrapper around a fallible function.
///
/// Only `Ok` results are cached: an error propagates unchanged, and the next
/// call with the same arguments re-invokes the function.
pub struct TryMemo<A, R, E> {
    inner: Rc<TryMemoInner<A, R, E>>,
}

impl<A, R, E> Clone for TryMemo<A, R, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A, R, E> std::fmt::Debug for TryMemo<A, R, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TryMemo")
            .field("entries", &self.inner.cache.borrow().len())
            .field("hits", &self.inner.hits.get())
            .field("misses", &self.inner.misses.get())
            .finish()
    }
}

impl<A: Serialize, R: Clone, E> TryMemo<A, R, E> {
    /// Memoize the fallible `f`.
    pub fn new(f: impl Fn(&A) -> Result<R, E> + 'static) -> Self {
        Self::recursive(move |_, args| f(args))
    }

    /// Memoize a recursive fallible function. See [`Memo::recursive`] for
    /// the recursion contract.
    pub fn recursive(f: impl Fn(&Self, &A) -> Result<R, E> + 'static) -> Self {
        Self {
            inner: Rc::new(TryMemoInner {
                compute: Box::new(f),
                cache: RefCell::new(AHashMap::new()),
                hits: Cell::new(0),
                misses: Cell::new(0),
            }),
        }
    }

    /// Call the memoized function.
    ///
    /// [`MemoError::Key`] marks arguments that cannot form a key;
    /// [`MemoError::Compute`] carries the wrapped function's error, which is
    /// never cached.
    pub fn call(&self, args: &A) -> Result<R, MemoError<E>> {
        let key = CacheKey::for_args(args)?;
        if let Some(value) = self.inner.cache.borrow().get(&key) {
            self.inner.hits.set(self.inner.hits.get() + 1);
            trace!(key = key.as_str(), "memo hit");
            return Ok(value.clone());
        }
        self.inner.misses.set(self.inner.misses.get() + 1);
        trace!(key = key.as_str(), "memo miss");
        let value = (self.inner.compute)(self, args).map_err(MemoError::Compute)?;
        self.inner.cache.borrow_mut().insert(key, value.clone());
        Ok(value)
    }

    /// Whether a successful result for `args` is already cached.
    pub fn contains(&self, args: &A) -> Result<bool, MemoError<E>> {
        let key = CacheKey::for_args(args)?;
        Ok(self.inner.cache.borrow().contains_key(&key))
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.cache.borrow().len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.cache.borrow().is_empty()
    }

    /// Calls answered from the cache.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.inner.hits.get()
    }

    /// Calls that invoked the wrapped function.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.inner.misses.get()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squares_computed_once() {
        let evaluations = Rc::new(Cell::new(0u32));
        let count = Rc::clone(&evaluations);

        let square = Memo::new(move |n: &i64| {
            count.set(count.get() + 1);
            n * n
        });

        assert_eq!(square.call(&5).unwrap(), 25);
        assert_eq!(square.call(&5).unwrap(), 25);
        assert_eq!(evaluations.get(), 1);
        assert_eq!(square.hits(), 1);
        assert_eq!(square.misses(), 1);
    }

    #[test]
    fn distinct_keys_cached_independently() {
        let evaluations = Rc::new(Cell::new(0u32));
        let count = Rc::clone(&evaluations);

        let square = Memo::new(move |n: &i64| {
            count.set(count.get() + 1);
            n * n
        });

        assert_eq!(square.call(&2).unwrap(), 4);
        assert_eq!(square.call(&3).unwrap(), 9);
        assert_eq!(square.call(&2).unwrap(), 4);
        assert_eq!(square.call(&3).unwrap(), 9);
        assert_eq!(evaluations.get(), 2);
        assert_eq!(square.len(), 2);
    }

    #[test]
    fn errors_are_not_cached() {
        let attempts = Rc::new(Cell::new(0u32));
        let count = Rc::clone(&attempts);

        let parse = TryMemo::new(move |text: &String| {
            count.set(count.get() + 1);
            text.parse::<i64>().map_err(|e| e.to_string())
        });

        let bad = "not a number".to_string();
        assert!(matches!(parse.call(&bad), Err(MemoError::Compute(_))));
        assert!(matches!(parse.call(&bad), Err(MemoError::Compute(_))));
        assert_eq!(attempts.get(), 2);
        assert!(parse.is_empty());

        // Successes are cached as usual.
        let good = "42".to_string();
        assert_eq!(parse.call(&good).unwrap(), 42);
        assert_eq!(parse.call(&good).unwrap(), 42);
        assert_eq!(attempts.get(), 3);
    }

    #[test]
    fn recursive_fib_is_linear() {
        let evaluations = Rc::new(Cell::new(0u32));
        let count = Rc::clone(&evaluations);

        let fib = Memo::recursive(move |fib, n: &u64| {
            count.set(count.get() + 1);
            if *n < 2 {
                *n
            } else {
                fib.call(&(n - 1)).unwrap() + fib.call(&(n - 2)).unwrap()
            }
        });

        assert_eq!(fib.call(&30).unwrap(), 832_040);
        // One evaluation per distinct n in 0..=30, not 2^30.
        assert_eq!(evaluations.get(), 31);
        assert_eq!(fib.len(), 31);

        // A repeat call is a pure hit.
        assert_eq!(fib.call(&30).unwrap(), 832_040);
        assert_eq!(evaluations.get(), 31);
    }

    #[test]
    fn clone_shares_cache() {
        let evaluations = Rc::new(Cell::new(0u32));
        let count = Rc::clone(&evaluations);

        let double = Memo::new(move |n: &i64| {
            count.set(count.get() + 1);
            n * 2
        });
        let alias = double.clone();

        assert_eq!(double.call(&7).unwrap(), 14);
        assert_eq!(alias.call(&7).unwrap(), 14);
        assert_eq!(evaluations.get(), 1);
        assert_eq!(alias.len(), 1);
    }

    #[test]
    fn key_error_is_distinct_from_compute_error() {
        use std::collections::HashMap;

        // Maps with non-string keys cannot form a JSON key.
        let memo: TryMemo<HashMap<(u8, u8), i32>, usize, String> =
            TryMemo::new(|map: &HashMap<(u8, u8), i32>| Ok(map.len()));

        let mut args = HashMap::new();
        args.insert((1, 2), 3);
        assert!(matches!(memo.call(&args), Err(MemoError::Key(_))));
        assert_eq!(memo.misses(), 0);
    }

    #[test]
    fn tuple_arguments_are_order_sensitive() {
        let concat = Memo::new(|(a, b): &(String, String)| format!("{a}{b}"));

        let ab = concat
            .call(&("a".to_string(), "b".to_string()))
            .unwrap();
        let ba = concat
            .call(&("b".to_string(), "a".to_string()))
            .unwrap();
        assert_eq!(ab, "ab");
        assert_eq!(ba, "ba");
        assert_eq!(concat.len(), 2);
    }

    #[test]
    fn impure_function_yields_stale_hits() {
        // Documented limitation: the first stored result wins.
        let counter = Rc::new(Cell::new(0u32));
        let state = Rc::clone(&counter);

        let next = Memo::new(move |_: &()| {
            state.set(state.get() + 1);
            state.get()
        });

        assert_eq!(next.call(&()).unwrap(), 1);
        assert_eq!(next.call(&()).unwrap(), 1);
    }

    #[test]
    fn contains_reports_cached_keys() {
        let square = Memo::new(|n: &i64| n * n);
        assert!(!square.contains(&4).unwrap());
        let _ = square.call(&4).unwrap();
        assert!(square.contains(&4).unwrap());
        assert!(!square.contains(&5).unwrap());
    }

    #[test]
    fn debug_format() {
        let square = Memo::new(|n: &i64| n * n);
        let _ = square.call(&2).unwrap();
        let _ = square.call(&2).unwrap();
        let dbg = format!("{square:?}");
        assert!(dbg.contains("Memo"));
        assert!(dbg.contains("entries: 1"));
    }
}
