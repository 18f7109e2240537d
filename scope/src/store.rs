//! Shared holder for the current scope.

use std::sync::Arc;

use tokio::sync::watch;

use crate::codec::scope_key;
use crate::scope::Scope;

/// Holds exactly one current [`Scope`].
///
/// Clones share the same value. Writes replace the whole scope and always
/// notify subscribers, even when the new value equals the old one; the URL
/// synchronizer is responsible for skipping redundant work. No validation
/// happens here.
#[derive(Debug, Clone)]
pub struct ScopeStore {
    tx: Arc<watch::Sender<Scope>>,
}

impl Default for ScopeStore {
    fn default() -> Self {
        Self::new(Scope::default())
    }
}

impl ScopeStore {
    pub fn new(initial: Scope) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn scope(&self) -> Scope {
        self.tx.borrow().clone()
    }

    /// Replace the current scope.
    pub fn set_scope(&self, next: Scope) {
        let next_key = scope_key(&next);
        let previous = self.tx.send_replace(next);
        tracing::trace!(from = %scope_key(&previous), to = %next_key, "scope replaced");
    }

    /// True when the current scope is structurally equal to `scope`.
    pub fn matches(&self, scope: &Scope) -> bool {
        *self.tx.borrow() == *scope
    }

    /// Run `f` against the current scope without cloning it.
    pub fn with_scope<R>(&self, f: impl FnOnce(&Scope) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Scope> {
        self.tx.subscribe()
    }
}
