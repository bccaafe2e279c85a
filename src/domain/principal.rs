use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque, already-authenticated identity.
///
/// The ledger only ever compares principals for equality; it never inspects
/// their encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Principal {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Who is calling and at what logical time.
///
/// Supplied by the host environment with every call. Time is monotonically
/// non-decreasing across calls but may repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Principal,
    pub time: u64,
}

impl CallContext {
    pub fn new(caller: impl Into<Principal>, time: u64) -> Self {
        Self {
            caller: caller.into(),
            time,
        }
    }
}
