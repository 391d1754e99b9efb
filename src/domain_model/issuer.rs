use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the principal that owns a session. Opaque to this crate,
/// stable across refresh cycles, and the partition key for refresh records.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct IssuerId(pub String);

impl fmt::Display for IssuerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IssuerId {
    fn from(s: &str) -> Self {
        IssuerId(s.to_string())
    }
}
