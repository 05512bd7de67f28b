//! Tool result cache domain
//!
//! The storage itself lives in the application layer; this module owns the
//! key derivation and the stats shape reported to callers.

pub mod key;

pub use key::CacheKey;

use serde::{Deserialize, Serialize};

/// Point-in-time view of the result cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Entries currently stored, including expired ones not yet swept.
    pub total_entries: usize,
}
