#![forbid(unsafe_code)]

//! Canonical cache keys for memoized calls.
//!
//! # Design
//!
//! A [`CacheKey`] is a canonical text rendering of an argument value: the
//! value is serialized to a [`serde_json::Value`] tree, then written with no
//! insignificant whitespace and with object keys emitted in sorted order.
//! Canonicalization happens here, in one place, rather than trusting the
//! serializer's map iteration order.
//!
//! # Invariants
//!
//! 1. Logically equal values of the same type produce byte-identical keys
//!    (struct field order is fixed by the type; map key order is normalized
//!    by sorting).
//! 2. Distinguishable primitive types produce distinguishable keys: the
//!    integer `1` renders as `1`, the string `"1"` as `"1"`.
//! 3. Sequence and tuple element order is significant.
//! 4. Key production never executes user code beyond `Serialize`.
//!
//! # Failure Modes
//!
//! - A value the serializer rejects (e.g. a map with non-string keys)
//!   surfaces as [`KeyError`], distinct from any computation error.
//! - Non-finite floats (`NaN`, `±inf`) serialize to JSON `null` and are
//!   therefore key-equal to `None`/unit. This equivalence is part of the
//!   contract; pre-map such values if they must stay distinct.

use std::fmt::Write as _;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Result alias for key production.
pub type Result<T> = std::result::Result<T, KeyError>;

/// The argument value could not be rendered as a canonical key.
///
/// This is a usage error on the caller's side, never a failure of the
/// memoized computation.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("arguments are not serializable: {0}")]
    Unserializable(#[from] serde_json::Error),
}

/// A canonical, order-normalized rendering of an argument value.
///
/// Produced only by [`CacheKey::for_args`]; equal logical values always
/// compare equal, so the key is safe to use for cache lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Render `args` as a canonical key.
    ///
    /// Accepts anything `Serialize`; multi-argument calls are expressed as
    /// tuples, which keep their element order in the key.
    pub fn for_args<A: Serialize + ?Sized>(args: &A) -> Result<Self> {
        let value = serde_json::to_value(args)?;
        let mut out = String::with_capacity(16);
        write_canonical(&value, &mut out);
        Ok(Self(out))
    }

    /// The canonical text form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Canonical writer
// ---------------------------------------------------------------------------

/// Write `value` as compact JSON with sorted object keys.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        // `serde_json::Number` renders deterministically (integers verbatim,
        // floats via shortest round-trip form).
        Value::Number(number) => {
            let _ = write!(out, "{number}");
        }
        Value::String(text) => write_escaped(text, out),
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by_key(|(key, _)| *key);
            out.push('{');
            for (index, (key, item)) in entries.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_escaped(key, out);
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
    }
}

/// Write a JSON string literal with the escapes the grammar requires.
fn write_escaped(text: &str, out: &mut String) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if (ch as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", ch as u32);
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
