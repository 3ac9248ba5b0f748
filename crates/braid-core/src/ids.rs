//! Identifier for launched fetch operations.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Identifier of one launched fetch operation.
///
/// ULID-based: sortable by launch time, generated without coordination.
/// Joined results are ordered by launch position, not by id; the id only
/// names the operation in logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FetchId(Ulid);

impl FetchId {
    /// Generate a fresh id from the current wall clock.
    pub fn generate() -> Self {
        let timestamp_ms = Utc::now().timestamp_millis() as u64;
        Self(Ulid::from_parts(timestamp_ms, rand::random()))
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for FetchId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl fmt::Display for FetchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fetch-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let id1 = FetchId::generate();
        let id2 = FetchId::generate();
        let id3 = FetchId::generate();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn display_uses_fetch_prefix() {
        let id = FetchId::generate();
        assert!(id.to_string().starts_with("fetch-"));
    }

    #[test]
    fn later_ids_sort_after_earlier_ones() {
        // ULID timestamp is the leading component, so launch-time ordering
        // survives a plain sort as long as the clock does not step back.
        let earlier = FetchId::from(Ulid::from_parts(1_000, 0));
        let later = FetchId::from(Ulid::from_parts(2_000, 0));
        assert!(earlier < later);
    }
}
