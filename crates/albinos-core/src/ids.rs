//! Identifier newtypes shared across the service.

use serde::{Deserialize, Serialize};

/// Persistent identifier of a configuration row in the store.
///
/// Assigned by the store (autoincrement), globally unique, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfigId(pub i64);

impl std::fmt::Display for ConfigId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Session-local handle for a loaded configuration.
///
/// Allocated per connection, starting at 1; opaque to the client. Loading
/// the same configuration twice in one session yields two distinct temp-ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TempId(pub u64);

impl std::fmt::Display for TempId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
