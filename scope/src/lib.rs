//! Analytic scope selection for the hedge desk dashboards.
//!
//! A dashboard filters its analytics to one business entity: everything,
//! a deal, a sales order, a purchase order, or a contract. The selection
//! lives in a [`ScopeStore`] and is mirrored into the URL query string so
//! links and browser navigation reproduce the view.
//!
//! - [`codec`] converts between [`Scope`] and query parameters.
//! - [`sync`] is the feedback-free store ⇄ URL state machine.
//! - [`engine`] drives it against a [`Navigator`].
//! - [`tree`] derives scopes from the entity hierarchy.
//!
//! ```
//! use hedgedesk_scope::{MemoryNavigator, Navigator, Scope, ScopeStore, ScopeSyncEngine};
//!
//! let nav = MemoryNavigator::new("tab=exposure");
//! let mut engine = ScopeSyncEngine::new(ScopeStore::default(), nav, Default::default());
//! engine.select(Scope::Deal { deal_id: 42 });
//! assert_eq!(
//!     engine.navigator().location_query(),
//!     "tab=exposure&scope=deal&deal_id=42"
//! );
//! ```

pub mod codec;
pub mod engine;
pub mod navigator;
pub mod params;
pub mod scope;
pub mod store;
pub mod sync;
pub mod tree;

pub use codec::is_same_scope;
pub use codec::scope_from_search_params;
pub use codec::scope_key;
pub use codec::write_scope_to_search_params;
pub use engine::ScopeSyncEngine;
pub use navigator::MemoryNavigator;
pub use navigator::Navigator;
pub use params::SearchParams;
pub use scope::Scope;
pub use scope::ScopeError;
pub use scope::ScopeKind;
pub use store::ScopeStore;
pub use sync::ScopeUrlSync;
pub use sync::StoreOutcome;
pub use sync::SyncEvent;
pub use sync::SyncOptions;
pub use sync::UrlOutcome;
pub use tree::EntityTree;
pub use tree::EntityTreeNode;
pub use tree::scope_for_node;
