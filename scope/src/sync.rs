//! Bidirectional synchronization between the scope store and the URL.
//!
//! Two independent triggers feed the machine: the store changed (user
//! selected something) and the URL changed (navigation, or our own write
//! becoming visible). Writes go out as replace navigations whose effect may
//! become observable later than the next URL notification. While such a
//! write is pending, a stale URL must not revert the store.
//!
//! ```text
//!             StoreChanged: target differs from URL and last write
//!   Idle  ─────────────────────────────────────────────────────▶  WritePending{target}
//!    ▲                                                                  │
//!    │  UrlObserved: url == target (confirmed)                          │
//!    │  UrlObserved: store no longer equals decode(target) (superseded) │
//!    └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! While `WritePending`, a URL that differs from the target is ignored as
//! long as the store still holds the scope the target encodes.

use serde::Deserialize;

use crate::codec::legacy_deal_id;
use crate::codec::scope_from_query;
use crate::codec::scope_from_search_params;
use crate::codec::scope_key;
use crate::codec::write_scope_to_search_params;
use crate::navigator::Navigator;
use crate::params::SearchParams;
use crate::params::strip_query_prefix;
use crate::scope::Scope;
use crate::store::ScopeStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// Accept a bare `deal_id` (no `scope` key) from old links as a deal
    /// scope, as long as nothing specific is selected yet.
    pub legacy_deal_id: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            legacy_deal_id: true,
        }
    }
}

/// Input events of the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    StoreChanged,
    UrlObserved(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlOutcome {
    /// The URL carried a different explicit scope and the store adopted it.
    Adopted(Scope),
    /// A bare legacy `deal_id` was promoted to a deal scope.
    LegacyAdopted(Scope),
    /// A write is still in flight and the observed URL is stale.
    Suppressed,
    Unchanged,
}

impl UrlOutcome {
    pub fn store_changed(&self) -> bool {
        matches!(self, UrlOutcome::Adopted(_) | UrlOutcome::LegacyAdopted(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The URL already encodes the store's scope.
    InSync,
    /// The same query was written last time; no duplicate navigation.
    AlreadyWritten,
    /// A replace navigation to this query was issued.
    Replaced(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Url(UrlOutcome),
    Store(StoreOutcome),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum WriteState {
    #[default]
    Idle,
    WritePending {
        target: String,
    },
}

/// The synchronizer's memory: the last query it wrote and the write that
/// has not been confirmed by the navigation layer yet.
///
/// `last_write` is forgotten whenever the store adopts a scope from the URL,
/// so a scope written earlier can be selected again after back-navigation.
#[derive(Debug, Clone, Default)]
pub struct ScopeUrlSync {
    options: SyncOptions,
    last_write: Option<String>,
    write: WriteState,
}

impl ScopeUrlSync {
    pub fn new(options: SyncOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    pub fn pending_write(&self) -> Option<&str> {
        match &self.write {
            WriteState::Idle => None,
            WriteState::WritePending { target } => Some(target),
        }
    }

    pub fn last_write(&self) -> Option<&str> {
        self.last_write.as_deref()
    }

    pub fn handle<N: Navigator + ?Sized>(
        &mut self,
        event: SyncEvent,
        store: &ScopeStore,
        navigator: &mut N,
    ) -> SyncOutcome {
        match event {
            SyncEvent::StoreChanged => SyncOutcome::Store(self.on_store_changed(store, navigator)),
            SyncEvent::UrlObserved(query) => SyncOutcome::Url(self.on_url_observed(store, &query)),
        }
    }

    /// URL → store.
    pub fn on_url_observed(&mut self, store: &ScopeStore, observed: &str) -> UrlOutcome {
        let observed = strip_query_prefix(observed);

        if let WriteState::WritePending { target } = &self.write {
            if target == observed {
                tracing::debug!(query = observed, "scope write confirmed");
            } else {
                // A `none` write leaves no scope keys behind.
                let written = scope_from_query(target).unwrap_or(Scope::None);
                if store.matches(&written) {
                    tracing::debug!(
                        observed,
                        pending = %target,
                        "ignoring stale url while scope write is pending"
                    );
                    return UrlOutcome::Suppressed;
                }
                tracing::debug!(pending = %target, "pending scope write superseded");
            }
            self.write = WriteState::Idle;
        }

        let params = SearchParams::parse(observed);
        if let Some(scope) = scope_from_search_params(&params) {
            if store.matches(&scope) {
                return UrlOutcome::Unchanged;
            }
            tracing::debug!(scope = %scope_key(&scope), "adopting scope from url");
            self.adopt(store, scope.clone());
            return UrlOutcome::Adopted(scope);
        }

        if self.options.legacy_deal_id
            && let Some(deal_id) = legacy_deal_id(&params)
            && store.with_scope(Scope::is_unselected)
        {
            let scope = Scope::Deal { deal_id };
            tracing::debug!(deal_id, "adopting legacy deal_id link");
            self.adopt(store, scope.clone());
            return UrlOutcome::LegacyAdopted(scope);
        }

        UrlOutcome::Unchanged
    }

    /// Store → URL.
    pub fn on_store_changed<N: Navigator + ?Sized>(
        &mut self,
        store: &ScopeStore,
        navigator: &mut N,
    ) -> StoreOutcome {
        let observed = navigator.location_query();
        let observed = strip_query_prefix(&observed);
        let target = store
            .with_scope(|scope| write_scope_to_search_params(&SearchParams::parse(observed), scope))
            .to_query_string();

        if target == observed {
            return StoreOutcome::InSync;
        }
        if self.last_write.as_deref() == Some(target.as_str()) {
            return StoreOutcome::AlreadyWritten;
        }

        tracing::debug!(query = %target, "replacing url query with store scope");
        self.last_write = Some(target.clone());
        self.write = WriteState::WritePending {
            target: target.clone(),
        };
        navigator.replace_query(&target);
        StoreOutcome::Replaced(target)
    }

    fn adopt(&mut self, store: &ScopeStore, scope: Scope) {
        // The URL now reflects something we did not write; remembering our
        // older write would block re-selecting it later.
        self.last_write = None;
        store.set_scope(scope);
    }
}
