//! Serialized-access counter.

use std::sync::Arc;

use tokio::sync::Mutex;

/// Internal state. Only reachable through the guard's lock.
#[derive(Debug, Default)]
struct CounterState {
    value: i64,
}

/// Exclusive-access wrapper around one mutable counter.
///
/// Design:
/// - Every read and write goes through the internal mutex; there is no
///   other path to the state, so updates cannot interleave or tear.
/// - Clones share the same counter (handle semantics, like sharing an
///   `Arc<dyn Queue>` between workers).
/// - Waiters suspend on the lock; the runtime keeps driving other tasks in
///   the meantime.
///
/// Operations never fail. There is no error condition to model.
#[derive(Debug, Clone, Default)]
pub struct StateGuard {
    state: Arc<Mutex<CounterState>>,
}

impl StateGuard {
    /// New guard with the counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(value: i64) -> Self {
        Self {
            state: Arc::new(Mutex::new(CounterState { value })),
        }
    }

    /// Advance the counter by exactly one.
    ///
    /// Concurrent callers serialize on the lock: each call commits its whole
    /// read-add-write before the next one starts, so no increment is ever
    /// lost regardless of the concurrency degree.
    pub async fn increment(&self) {
        let mut state = self.state.lock().await;
        state.value += 1;
    }

    /// Current committed value.
    ///
    /// Always the initial value plus some prefix of completed increments,
    /// never an in-progress update.
    pub async fn get_value(&self) -> i64 {
        let state = self.state.lock().await;
        state.value
    }
}
