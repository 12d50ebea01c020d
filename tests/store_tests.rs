// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finsync::keys;
use finsync::models::ExpensesDoc;
use finsync::store::Store;
use std::sync::{Arc, Mutex};

fn setup() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_at(&dir.path().join("finsync.sqlite")).unwrap();
    (dir, store)
}

#[test]
fn roundtrip_and_absent() {
    let (_dir, store) = setup();
    assert!(store.get::<ExpensesDoc>(keys::EXPENSES).unwrap().is_none());

    let doc = ExpensesDoc {
        monthly_budget: "300".parse().unwrap(),
        ..Default::default()
    };
    store.set(keys::EXPENSES, &doc).unwrap();
    let read: ExpensesDoc = store.get(keys::EXPENSES).unwrap().unwrap();
    assert_eq!(read.monthly_budget, doc.monthly_budget);

    store.remove(keys::EXPENSES).unwrap();
    assert!(store.get::<ExpensesDoc>(keys::EXPENSES).unwrap().is_none());
}

#[test]
fn malformed_body_reads_as_absent() {
    let (_dir, store) = setup();
    store.set_raw(keys::EXPENSES, "{not json").unwrap();
    assert!(store.get_raw(keys::EXPENSES).unwrap().is_some());
    assert!(store.get::<ExpensesDoc>(keys::EXPENSES).unwrap().is_none());
    // Defaults, not an error.
    let doc: ExpensesDoc = store.get_or_default(keys::EXPENSES).unwrap();
    assert!(doc.expenses.is_empty());
}

#[test]
fn writes_fire_the_bus_synchronously() {
    let (_dir, store) = setup();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = store.bus().subscribe(move |key| {
        sink.lock().unwrap().push(key.to_string());
    });

    store.set(keys::TRADES, &serde_json::json!({"trades": []})).unwrap();
    store.remove(keys::TRADES).unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![keys::TRADES.to_string(), keys::TRADES.to_string()]
    );

    // Dropping the subscription tears the listener down.
    drop(sub);
    assert_eq!(store.bus().subscriber_count(), 0);
    store.set(keys::TRADES, &serde_json::json!({"trades": []})).unwrap();
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn changelog_records_keys_in_order() {
    let (_dir, store) = setup();
    let cursor = store.changelog_head().unwrap();

    store.set_raw(keys::EXPENSES, "{}").unwrap();
    store.set_raw(keys::TRADES, "{}").unwrap();
    store.set_raw(keys::EXPENSES, "{}").unwrap();

    let page = store.changelog_since(cursor).unwrap();
    assert!(!page.gap);
    // Deduplicated, first-seen order.
    assert_eq!(page.keys, vec![keys::EXPENSES.to_string(), keys::TRADES.to_string()]);
    assert_eq!(page.cursor, store.changelog_head().unwrap());

    let empty = store.changelog_since(page.cursor).unwrap();
    assert!(empty.keys.is_empty());
}

#[test]
fn changelog_retention_reports_a_gap() {
    let (_dir, store) = setup();
    let cursor = store.changelog_head().unwrap();
    for _ in 0..600 {
        store.set_raw(keys::EXPENSES, "{}").unwrap();
    }
    let page = store.changelog_since(cursor).unwrap();
    assert!(page.gap);
    assert!(store.changelog_len().unwrap() <= 512);
}

#[test]
fn data_version_moves_only_for_other_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("finsync.sqlite");
    let a = Store::open_at(&path).unwrap();
    let b = Store::open_at(&path).unwrap();

    let before = b.data_version().unwrap();

    // B's own write does not move B's data version.
    b.set_raw(keys::WEALTH, "{}").unwrap();
    assert_eq!(before, b.data_version().unwrap());

    // A's write does.
    a.set_raw(keys::EXPENSES, "{}").unwrap();
    assert_ne!(before, b.data_version().unwrap());
}

#[test]
fn legacy_keys_are_adopted_once() {
    let (_dir, store) = setup();
    store
        .set_raw("budget-tracker-react-v11", r#"{"monthlyBudget": 350, "expenses": []}"#)
        .unwrap();

    assert_eq!(keys::adopt_legacy(&store).unwrap(), 1);
    let doc: ExpensesDoc = store.get(keys::EXPENSES).unwrap().unwrap();
    assert_eq!(doc.monthly_budget, "350".parse().unwrap());

    // Current key present now: nothing more to adopt, nothing overwritten.
    store
        .set_raw("budget-tracker-react-v10", r#"{"monthlyBudget": 1}"#)
        .unwrap();
    assert_eq!(keys::adopt_legacy(&store).unwrap(), 0);
    let doc: ExpensesDoc = store.get(keys::EXPENSES).unwrap().unwrap();
    assert_eq!(doc.monthly_budget, "350".parse().unwrap());
}

#[test]
fn two_stores_share_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("finsync.sqlite");
    let a = Store::open_at(&path).unwrap();
    let b = Store::open_at(&path).unwrap();

    a.set_raw(keys::EXPENSES, r#"{"monthly_budget":"300"}"#).unwrap();
    let doc: ExpensesDoc = b.get(keys::EXPENSES).unwrap().unwrap();
    assert_eq!(doc.monthly_budget, "300".parse().unwrap());
}
