//! Owner/dependent pair with a non-owning back edge.
//!
//! The forward edge (owner -> dependent) is strong and keeps the dependent
//! alive. The back edge (dependent -> owner) is a `Weak`: it can observe
//! the owner but never extends its lifetime, so the pair cannot form a
//! retain cycle. Once the last strong handle to the owner is gone, the
//! owner tears down, the owned dependent goes with it, and the back edge
//! resolves to `None` from that point on.

use std::sync::{Arc, Weak};

use tokio::sync::Mutex;
use tracing::debug;

/// Owning side of the pair.
pub struct Owner {
    name: String,
    dependent: Mutex<Option<Arc<Dependent>>>,
}

/// Owned side; looks back at its owner without keeping it alive.
pub struct Dependent {
    kind: String,
    owner: Mutex<Weak<Owner>>,
}

impl Owner {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            dependent: Mutex::new(None),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owned dependent, if one is attached.
    pub async fn dependent(&self) -> Option<Arc<Dependent>> {
        self.dependent.lock().await.clone()
    }
}

impl Dependent {
    pub fn new(kind: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            kind: kind.into(),
            // Unattached dependents start with an empty back edge.
            owner: Mutex::new(Weak::new()),
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Resolve the back edge.
    ///
    /// Returns `None` once the owner has been torn down. The weak handle
    /// can never dangle: upgrade either yields a live owner or nothing.
    pub async fn owner(&self) -> Option<Arc<Owner>> {
        self.owner.lock().await.upgrade()
    }
}

/// Wire both edges: strong forward (owner -> dependent), weak back.
///
/// The back edge is set first so there is no window in which the owner
/// already holds a dependent that cannot see it.
pub async fn attach(owner: &Arc<Owner>, dependent: Arc<Dependent>) {
    *dependent.owner.lock().await = Arc::downgrade(owner);
    *owner.dependent.lock().await = Some(dependent);
}

/// Drop the caller's strong handle to the owner.
///
/// If this was the last strong handle, the owner is torn down immediately,
/// releasing its owned dependent as well (unless someone else still holds
/// the dependent strongly). The dependent's back edge stops resolving at
/// that same moment.
pub fn release(owner: Arc<Owner>) {
    drop(owner);
}

impl Drop for Owner {
    fn drop(&mut self) {
        debug!(name = %self.name, "owner released");
    }
}

impl Drop for Dependent {
    fn drop(&mut self) {
        debug!(kind = %self.kind, "dependent released");
    }
}
