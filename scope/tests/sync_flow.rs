#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end selection flows against an asynchronous router.
//!
//! The deferred `MemoryNavigator` only exposes a replaced query after
//! `settle()`, so URL notifications in between carry the stale location.

use hedgedesk_scope::EntityTree;
use hedgedesk_scope::MemoryNavigator;
use hedgedesk_scope::Navigator;
use hedgedesk_scope::Scope;
use hedgedesk_scope::ScopeStore;
use hedgedesk_scope::ScopeSyncEngine;
use hedgedesk_scope::StoreOutcome;
use hedgedesk_scope::SyncOptions;
use hedgedesk_scope::UrlOutcome;
use pretty_assertions::assert_eq;

fn engine(query: &str) -> ScopeSyncEngine<MemoryNavigator> {
    ScopeSyncEngine::new(
        ScopeStore::default(),
        MemoryNavigator::deferred(query),
        SyncOptions::default(),
    )
}

#[test]
fn mount_with_empty_url_marks_consolidated_view() {
    let mut engine = engine("");

    let outcome = engine.mount();

    assert_eq!(outcome, StoreOutcome::Replaced("scope=all".to_string()));
    engine.navigator_mut().settle();
    assert_eq!(engine.observe_url(), UrlOutcome::Unchanged);
    assert_eq!(engine.scope(), Scope::All);
    assert_eq!(engine.sync().pending_write(), None);
}

#[test]
fn mount_adopts_explicit_scope_from_link() {
    let mut engine = engine("view=pnl&scope=so&deal_id=12&so_id=3");

    assert_eq!(engine.mount(), StoreOutcome::InSync);
    assert_eq!(
        engine.scope(),
        Scope::So {
            deal_id: 12,
            so_id: 3
        }
    );
    assert_eq!(engine.navigator().replace_count(), 0);
}

#[test]
fn legacy_link_is_migrated_to_explicit_scope() {
    let mut engine = engine("deal_id=7&tab=rfq");

    engine.mount();
    assert_eq!(engine.scope(), Scope::Deal { deal_id: 7 });

    engine.navigator_mut().settle();
    assert_eq!(
        engine.navigator().location_query(),
        "tab=rfq&scope=deal&deal_id=7"
    );
    assert_eq!(engine.observe_url(), UrlOutcome::Unchanged);
}

#[test]
fn rapid_selection_survives_stale_notifications() {
    let mut engine = engine("scope=deal&deal_id=4");
    engine.mount();

    engine.select(Scope::Deal { deal_id: 5 });
    // The router re-renders before applying the write.
    assert_eq!(engine.observe_url(), UrlOutcome::Suppressed);
    assert_eq!(engine.scope(), Scope::Deal { deal_id: 5 });

    engine.navigator_mut().settle();
    assert_eq!(engine.observe_url(), UrlOutcome::Unchanged);
    assert_eq!(engine.scope(), Scope::Deal { deal_id: 5 });
    assert_eq!(
        engine.navigator().location_query(),
        "scope=deal&deal_id=5"
    );
}

#[test]
fn newer_selection_supersedes_older_pending_write() {
    let mut engine = engine("scope=all");
    engine.mount();

    engine.select(Scope::Deal { deal_id: 5 });
    engine.select(Scope::Po {
        deal_id: 5,
        po_id: 9,
    });
    assert_eq!(
        engine.sync().pending_write(),
        Some("scope=po&deal_id=5&po_id=9")
    );

    // First queued write lands: it is stale relative to the store.
    engine.navigator_mut().settle_one();
    assert_eq!(engine.observe_url(), UrlOutcome::Suppressed);

    engine.navigator_mut().settle_one();
    assert_eq!(engine.observe_url(), UrlOutcome::Unchanged);
    assert_eq!(
        engine.scope(),
        Scope::Po {
            deal_id: 5,
            po_id: 9
        }
    );
}

#[test]
fn back_navigation_after_confirmation_restores_older_scope() {
    let mut engine = engine("scope=deal&deal_id=4");
    engine.mount();
    engine.select(Scope::Deal { deal_id: 5 });
    engine.navigator_mut().settle();
    engine.observe_url();

    engine.navigator_mut().navigate("scope=deal&deal_id=4");
    assert_eq!(
        engine.observe_url(),
        UrlOutcome::Adopted(Scope::Deal { deal_id: 4 })
    );
    assert_eq!(engine.scope(), Scope::Deal { deal_id: 4 });

    // Going forward again by clicking must still reach the URL.
    assert_eq!(
        engine.select(Scope::Deal { deal_id: 5 }),
        StoreOutcome::Replaced("scope=deal&deal_id=5".to_string())
    );
}

#[test]
fn reselecting_current_scope_is_silent() {
    let mut engine = engine("scope=deal&deal_id=4");
    engine.mount();
    let before = engine.navigator().replace_count();

    assert_eq!(engine.select(Scope::Deal { deal_id: 4 }), StoreOutcome::InSync);
    assert_eq!(engine.navigator().replace_count(), before);
}

#[test]
fn tree_clicks_drive_the_url() {
    let tree = EntityTree::from_json(
        r#"{"root": {"kind": "root", "id": 0, "label": "All", "children": [
            {"kind": "deal", "id": 21, "label": "Deal 21", "children": [
                {"kind": "contract", "id": "k", "entity_id": "HC 9", "deal_id": 21, "label": "HC 9"}
            ]}
        ]}}"#,
    )
    .expect("tree parses");
    let mut engine = ScopeSyncEngine::new(
        ScopeStore::default(),
        MemoryNavigator::new(""),
        SyncOptions::default(),
    );

    let contract = &tree.root.children()[0].children()[0];
    assert_eq!(
        engine.select_node(contract),
        Some(StoreOutcome::Replaced(
            "scope=contract&deal_id=21&contract_id=HC+9".to_string()
        ))
    );
    assert_eq!(tree.breadcrumb(&engine.scope()), vec!["All", "Deal 21", "HC 9"]);

    engine.select_node(&tree.root);
    assert_eq!(engine.navigator().location_query(), "scope=all");
}

#[test]
fn subscribers_see_url_driven_changes() {
    let store = ScopeStore::default();
    let mut rx = store.subscribe();
    let mut engine = ScopeSyncEngine::new(
        store,
        MemoryNavigator::new("scope=po&deal_id=1&po_id=2"),
        SyncOptions::default(),
    );

    engine.mount();

    assert!(rx.has_changed().unwrap());
    assert_eq!(
        *rx.borrow_and_update(),
        Scope::Po {
            deal_id: 1,
            po_id: 2
        }
    );
}

#[test]
fn writes_through_another_handle_need_store_changed() {
    let store = ScopeStore::default();
    let other = store.clone();
    let mut engine = ScopeSyncEngine::new(
        store,
        MemoryNavigator::new("scope=all"),
        SyncOptions::default(),
    );
    engine.mount();

    other.set_scope(Scope::Deal { deal_id: 3 });
    assert_eq!(engine.navigator().location_query(), "scope=all");

    assert_eq!(
        engine.store_changed(),
        StoreOutcome::Replaced("scope=deal&deal_id=3".to_string())
    );
    assert_eq!(
        engine.navigator().location_query(),
        "scope=deal&deal_id=3"
    );
}
