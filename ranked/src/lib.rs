//! Ranked burn ledger — one sorted list of cumulative burns per scope.
//!
//! Each scope (a credit type or an item) owns an independent singly linked
//! list ordered by cumulative burned amount, highest first, anchored by the
//! sentinel account `AccountId::ZERO`.
//!
//! Finding an insertion point is O(n) and happens off the write path
//! ([`RankedBurnLedger::compute_insertion_hint`]). The write path takes that
//! hint from the caller and verifies it in O(1): a stale or forged hint is
//! rejected with [`RankedError::StaleHint`] and never corrupts the order.
//!
//! This crate handles:
//! - Hint computation, verification and splicing
//! - Paginated enumeration of top burners
//! - Per-account indexes of the scopes an account has burned into
//! - Integrity checks for lists restored from storage

pub mod book;
pub mod entry;
pub mod error;
pub mod ledger;
pub mod pagination;

pub use book::{RankedBook, ScopedInsert};
pub use entry::{BurnerPage, InsertOutcome, RankedEntry};
pub use error::RankedError;
pub use ledger::{Iter, PreparedInsert, RankedBurnLedger};
pub use pagination::{page, window, ZeroLimit};
