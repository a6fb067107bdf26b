//! Offset/limit helpers shared by every listing.
//!
//! Two listings disagree on what `limit == 0` means. A ranked list is
//! unbounded, so zero is a hard cap and yields nothing. An account's scope
//! index is a bounded append-only sequence, so zero means "everything from
//! `offset` to the end".

use std::ops::Range;

/// Meaning of `limit == 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZeroLimit {
    /// Return nothing.
    Empty,
    /// Return every remaining element.
    Remainder,
}

/// The index range selected by `offset`/`limit` over a sequence of `len` items.
///
/// An `offset` at or past `len` selects the empty range `len..len`.
pub fn window(len: usize, offset: usize, limit: usize, zero_limit: ZeroLimit) -> Range<usize> {
    if offset >= len {
        return len..len;
    }
    let remaining = len - offset;
    let count = match (limit, zero_limit) {
        (0, ZeroLimit::Empty) => 0,
        (0, ZeroLimit::Remainder) => remaining,
        (n, _) => n.min(remaining),
    };
    offset..offset + count
}

/// Copy the selected window out of a slice.
pub fn page<T: Clone>(items: &[T], offset: usize, limit: usize, zero_limit: ZeroLimit) -> Vec<T> {
    items[window(items.len(), offset, limit, zero_limit)].to_vec()
}
