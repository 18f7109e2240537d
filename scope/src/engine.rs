//! Wires the store, the synchronizer and a navigator together.

use crate::navigator::Navigator;
use crate::scope::Scope;
use crate::store::ScopeStore;
use crate::sync::ScopeUrlSync;
use crate::sync::StoreOutcome;
use crate::sync::SyncOptions;
use crate::sync::UrlOutcome;
use crate::tree::EntityTreeNode;
use crate::tree::scope_for_node;

/// Keeps one dashboard's scope selection and its URL in agreement.
///
/// Every method runs its transition to completion before returning, which
/// is the only ordering the synchronizer needs.
#[derive(Debug)]
pub struct ScopeSyncEngine<N> {
    store: ScopeStore,
    navigator: N,
    sync: ScopeUrlSync,
}

impl<N: Navigator> ScopeSyncEngine<N> {
    pub fn new(store: ScopeStore, navigator: N, options: SyncOptions) -> Self {
        Self {
            store,
            navigator,
            sync: ScopeUrlSync::new(options),
        }
    }

    /// First pass after construction: adopt what the URL says, then write
    /// the resulting scope back so the URL carries an explicit marker.
    pub fn mount(&mut self) -> StoreOutcome {
        let observed = self.navigator.location_query();
        self.sync.on_url_observed(&self.store, &observed);
        self.sync.on_store_changed(&self.store, &mut self.navigator)
    }

    /// User picked a scope.
    pub fn select(&mut self, scope: Scope) -> StoreOutcome {
        self.store.set_scope(scope);
        self.sync.on_store_changed(&self.store, &mut self.navigator)
    }

    /// User clicked a node of the entity tree. Nodes that do not map to a
    /// scope are ignored.
    pub fn select_node(&mut self, node: &EntityTreeNode) -> Option<StoreOutcome> {
        let scope = scope_for_node(node)?;
        Some(self.select(scope))
    }

    /// The store was written through another handle.
    ///
    /// The engine does not watch [`ScopeStore::subscribe`]; writes made
    /// through other handles reach the URL only when this is called.
    pub fn store_changed(&mut self) -> StoreOutcome {
        self.sync.on_store_changed(&self.store, &mut self.navigator)
    }

    /// The navigator reports a (possibly) new location.
    ///
    /// When the store adopts a scope from the URL, the store → URL pass runs
    /// right after, which normalizes legacy links into explicit ones.
    pub fn observe_url(&mut self) -> UrlOutcome {
        let observed = self.navigator.location_query();
        let outcome = self.sync.on_url_observed(&self.store, &observed);
        if outcome.store_changed() {
            self.sync.on_store_changed(&self.store, &mut self.navigator);
        }
        outcome
    }

    pub fn scope(&self) -> Scope {
        self.store.scope()
    }

    pub fn store(&self) -> &ScopeStore {
        &self.store
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut N {
        &mut self.navigator
    }

    pub fn sync(&self) -> &ScopeUrlSync {
        &self.sync
    }
}
