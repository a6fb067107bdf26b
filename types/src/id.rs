//! 32-byte identifiers for accounts, credit types and items.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IdParseError;

type Blake2b256 = Blake2b<U32>;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        pub struct $name([u8; 32]);

        impl $name {
            pub const ZERO: Self = Self([0u8; 32]);

            pub fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; 32]
            }

            /// Derive a stable id from a human-readable label (Blake2b-256).
            pub fn from_label(label: &str) -> Self {
                let mut hasher = Blake2b256::new();
                hasher.update(label.as_bytes());
                let mut output = [0u8; 32];
                output.copy_from_slice(&hasher.finalize());
                Self(output)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(&self.0[..4]))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.len() != 64 {
                    return Err(IdParseError::InvalidLength(s.len()));
                }
                let mut bytes = [0u8; 32];
                hex::decode_to_slice(s, &mut bytes)
                    .map_err(|e| IdParseError::InvalidHex(e.to_string()))?;
                Ok(Self(bytes))
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }
    };
}

define_id!(
    /// An opaque account identifier.
    ///
    /// `AccountId::ZERO` is the sentinel that anchors every ranked list: it is
    /// both the head of traversal and the "no predecessor" marker in hints.
    AccountId
);

define_id!(
    /// Identifies a credit type (the fungible credit being burned).
    CreditId
);

define_id!(
    /// Identifies a content item that burns can be attributed to.
    ItemId
);
