use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::FetchId;

/// Error produced by a fetch operation.
///
/// v1 keeps this small: the simulated network layer can only reject a bad
/// URL or fail transiently. `TaskAborted` covers a spawned fetch that died
/// before reporting a result.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FetchError {
    #[error("bad url: {0}")]
    BadUrl(String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("fetch task aborted: {0}")]
    TaskAborted(String),
}

/// First failure observed by a join, tagged with its launch position.
///
/// The joiner waits for every launched operation before constructing this,
/// so `index` is deterministic: it is the earliest failing position in
/// launch order, not whichever operation happened to finish first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("operation {index} ({id}) failed: {source}")]
pub struct JoinFailure {
    /// Launch position of the failing operation (0-based).
    pub index: usize,

    /// Id assigned at launch.
    pub id: FetchId,

    #[source]
    pub source: FetchError,
}
