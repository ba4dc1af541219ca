//! Deterministic hash-key construction for materials and shader bindings.
//!
//! Keys are strings built from tagged, length-prefixed segments, so adjacent
//! fields can never run into each other. Floats are truncated to
//! [`HASH_PRECISION`] decimal digits: values that differ only beyond that
//! precision produce the same key and are batched together.

use std::fmt::Write;

/// Decimal digits kept when a float enters a hash key.
pub const HASH_PRECISION: usize = 4;

/// Format `v` truncated toward zero to [`HASH_PRECISION`] decimal digits.
///
/// Truncation applies to the shortest decimal that round-trips to `v`, so
/// `0.7` gives `"0.7000"` even though the nearest `f32` lies just below it.
pub fn fixed(v: f32) -> String {
    if v.is_nan() {
        return "nan".to_owned();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    let shortest = v.to_string();
    let (int, frac) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));
    let frac: String = frac
        .chars()
        .chain(std::iter::repeat('0'))
        .take(HASH_PRECISION)
        .collect();
    let out = format!("{int}.{frac}");
    // -0.0 and tiny negatives truncate to negative zero
    match out.strip_prefix('-') {
        Some(rest) if rest.bytes().all(|b| b == b'0' || b == b'.') => rest.to_owned(),
        _ => out,
    }
}

/// Incremental builder for a hash key.
#[derive(Debug, Default)]
pub struct HashKey {
    buf: String,
}

impl HashKey {
    pub fn new(kind: &str) -> Self {
        let mut key = Self::default();
        key.buf.push_str(kind);
        key.buf.push('|');
        key
    }

    /// Append a `tag=len:value;` segment.
    pub fn field(mut self, tag: &str, value: &str) -> Self {
        // Writing to a String cannot fail.
        let _ = write!(self.buf, "{tag}={}:{value};", value.len());
        self
    }

    pub fn float(self, tag: &str, value: f32) -> Self {
        self.field(tag, &fixed(value))
    }

    pub fn floats(self, tag: &str, values: &[f32]) -> Self {
        let joined = values.iter().map(|v| fixed(*v)).collect::<Vec<_>>().join(",");
        self.field(tag, &joined)
    }

    pub fn optional(self, tag: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.field(tag, v),
            None => self.field(tag, "-"),
        }
    }

    pub fn finish(self) -> String {
        self.buf
    }
}
