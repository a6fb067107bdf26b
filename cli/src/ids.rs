//! Id arguments: 64 hex characters, or any other string as a label.

use std::str::FromStr;

use pyre_types::{AccountId, CreditId, ItemId};

pub trait LabelledId: FromStr + Sized {
    fn from_label(label: &str) -> Self;
}

macro_rules! labelled {
    ($($ty:ty),*) => {
        $(impl LabelledId for $ty {
            fn from_label(label: &str) -> Self {
                <$ty>::from_label(label)
            }
        })*
    };
}

labelled!(AccountId, CreditId, ItemId);

/// Parse `s` as a hex id if it is one, otherwise hash it as a label.
pub fn parse_id<T: LabelledId>(s: &str) -> T {
    if s.len() == 64 {
        if let Ok(id) = s.parse() {
            return id;
        }
    }
    T::from_label(s)
}

/// Like [`parse_id`], for clap `value_parser`.
pub fn id_arg<T: LabelledId>(s: &str) -> Result<T, String> {
    if s.is_empty() {
        return Err("id may not be empty".to_string());
    }
    Ok(parse_id(s))
}

/// Hint accounts additionally accept `sentinel` for the list head.
pub fn hint_arg(s: &str) -> Result<AccountId, String> {
    if s == "sentinel" {
        return Ok(AccountId::ZERO);
    }
    id_arg(s)
}
