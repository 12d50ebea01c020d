// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finsync::derive::derive;
use finsync::fingerprint;
use finsync::keys;
use finsync::models::{ExpensesDoc, GroceryMatcher, LedgerEntry, TradesDoc};
use finsync::months;
use finsync::store::Store;
use finsync::watch::{ChannelConfig, Visibility, Watcher};
use std::time::Duration;

const MONTH: &str = "2024-03";

// Long enough that the poll clock never fires again within a test.
const NEVER: Duration = Duration::from_secs(3600);

fn entry(id: &str, amount: &str, category: &str) -> LedgerEntry {
    LedgerEntry {
        id: id.to_string(),
        date: Some(chrono::NaiveDate::parse_from_str("2024-03-10", "%Y-%m-%d").unwrap()),
        amount: amount.parse().unwrap(),
        category: category.to_string(),
        label: None,
    }
}

fn watch_expenses(watcher: &mut Watcher<'_>) {
    watcher.watch(keys::EXPENSES, |s| {
        let doc: ExpensesDoc = s.get_or_default(keys::EXPENSES)?;
        Ok(fingerprint::expenses(
            &doc,
            MONTH,
            &GroceryMatcher::Exact("Groceries".to_string()),
        ))
    });
}

fn push_only() -> ChannelConfig {
    ChannelConfig {
        direct: true,
        changelog: false,
        data_version: false,
    }
}

fn no_channels() -> ChannelConfig {
    ChannelConfig {
        direct: false,
        changelog: false,
        data_version: false,
    }
}

#[test]
fn first_tick_recomputes_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_at(&dir.path().join("db.sqlite")).unwrap();

    let mut watcher = Watcher::new(&store, push_only())
        .unwrap()
        .with_intervals(NEVER, NEVER);
    watch_expenses(&mut watcher);

    // Mount: the fingerprint is unknown, so the first tick reports a change.
    assert_eq!(watcher.tick().unwrap(), vec![keys::EXPENSES.to_string()]);
    // Nothing happened since: quiet.
    assert!(watcher.tick().unwrap().is_empty());
}

#[test]
fn label_only_writes_are_suppressed() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_at(&dir.path().join("db.sqlite")).unwrap();
    let mut doc = ExpensesDoc {
        expenses: vec![entry("e1", "10.00", "Groceries")],
        ..Default::default()
    };
    store.set(keys::EXPENSES, &doc).unwrap();

    let mut watcher = Watcher::new(&store, push_only())
        .unwrap()
        .with_intervals(NEVER, NEVER);
    watch_expenses(&mut watcher);
    watcher.tick().unwrap();

    // A write that changes nothing financially relevant: notified, checked,
    // but no recompute.
    doc.expenses[0].label = Some("Saturday market".to_string());
    store.set(keys::EXPENSES, &doc).unwrap();
    assert!(watcher.tick().unwrap().is_empty());

    // An amount edit does recompute.
    doc.expenses[0].amount = "11.00".parse().unwrap();
    store.set(keys::EXPENSES, &doc).unwrap();
    assert_eq!(watcher.tick().unwrap(), vec![keys::EXPENSES.to_string()]);
}

#[test]
fn rapid_writes_coalesce_into_one_recompute() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_at(&dir.path().join("db.sqlite")).unwrap();

    let mut watcher = Watcher::new(&store, push_only())
        .unwrap()
        .with_intervals(NEVER, NEVER);
    watch_expenses(&mut watcher);
    watcher.tick().unwrap();

    for i in 0..5 {
        let doc = ExpensesDoc {
            expenses: vec![entry("e1", &format!("{}.00", i + 1), "Groceries")],
            ..Default::default()
        };
        store.set(keys::EXPENSES, &doc).unwrap();
    }
    // Five notifications, one fingerprint check, one recompute.
    assert_eq!(watcher.tick().unwrap(), vec![keys::EXPENSES.to_string()]);
    assert!(watcher.tick().unwrap().is_empty());
}

#[test]
fn changelog_channel_carries_cross_context_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.sqlite");
    let a = Store::open_at(&path).unwrap();
    let b = Store::open_at(&path).unwrap();

    let mut watcher = Watcher::new(
        &b,
        ChannelConfig {
            direct: false,
            changelog: true,
            data_version: false,
        },
    )
    .unwrap()
    .with_intervals(NEVER, NEVER);
    watch_expenses(&mut watcher);
    watcher.tick().unwrap();

    a.set(
        keys::EXPENSES,
        &ExpensesDoc {
            expenses: vec![entry("e1", "42.00", "Groceries")],
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(watcher.tick().unwrap(), vec![keys::EXPENSES.to_string()]);
}

#[test]
fn data_version_channel_carries_cross_context_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.sqlite");
    let a = Store::open_at(&path).unwrap();
    let b = Store::open_at(&path).unwrap();

    let mut watcher = Watcher::new(
        &b,
        ChannelConfig {
            direct: false,
            changelog: false,
            data_version: true,
        },
    )
    .unwrap()
    .with_intervals(NEVER, NEVER);
    watch_expenses(&mut watcher);
    watcher.tick().unwrap();

    a.set(
        keys::EXPENSES,
        &ExpensesDoc {
            expenses: vec![entry("e1", "42.00", "Groceries")],
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(watcher.tick().unwrap(), vec![keys::EXPENSES.to_string()]);
}

#[test]
fn poll_fallback_converges_with_all_pushes_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.sqlite");
    let a = Store::open_at(&path).unwrap();
    let b = Store::open_at(&path).unwrap();

    // Context A seeds the ledger and the settlement month.
    a.set(
        keys::EXPENSES,
        &ExpensesDoc {
            monthly_budget: "300".parse().unwrap(),
            expenses: vec![entry("e1", "40.00", "Groceries")],
            ..Default::default()
        },
    )
    .unwrap();
    months::update_month(&a, MONTH, |st| {
        st.incomes.push(finsync::models::NamedAmount {
            id: "i1".to_string(),
            name: "Salary".to_string(),
            amount: "2000".parse().unwrap(),
        });
    })
    .unwrap();

    // Context B: every push channel simulated as unavailable; poll due on
    // every tick.
    let mut watcher = Watcher::new(&b, no_channels())
        .unwrap()
        .with_intervals(Duration::ZERO, Duration::ZERO);
    watch_expenses(&mut watcher);
    watcher.tick().unwrap();

    // A mutates the ledger while B is idle.
    a.set(
        keys::EXPENSES,
        &ExpensesDoc {
            monthly_budget: "300".parse().unwrap(),
            expenses: vec![
                entry("e1", "40.00", "Groceries"),
                entry("e2", "60.00", "Restaurant"),
            ],
            ..Default::default()
        },
    )
    .unwrap();

    // Within one poll interval B notices and re-derives the new net.
    assert_eq!(watcher.tick().unwrap(), vec![keys::EXPENSES.to_string()]);

    let doc = months::load(&b).unwrap();
    let expenses: ExpensesDoc = b.get_or_default(keys::EXPENSES).unwrap();
    let trades: TradesDoc = b.get_or_default(keys::TRADES).unwrap();
    let state = months::state_of(&doc, MONTH);
    let p = derive(MONTH, &expenses, &trades, &state, &doc.matcher);
    // 2000 - 100 spent - 260 auto-plan rest
    assert_eq!(format!("{:.2}", p.net), "1640.00");
}

#[test]
fn visibility_regain_forces_an_immediate_check() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.sqlite");
    let a = Store::open_at(&path).unwrap();
    let b = Store::open_at(&path).unwrap();

    let mut watcher = Watcher::new(&b, no_channels())
        .unwrap()
        .with_intervals(NEVER, NEVER);
    watch_expenses(&mut watcher);
    watcher.tick().unwrap();
    assert_eq!(watcher.visibility(), Visibility::Foreground);

    a.set(
        keys::EXPENSES,
        &ExpensesDoc {
            expenses: vec![entry("e1", "42.00", "Groceries")],
            ..Default::default()
        },
    )
    .unwrap();

    // No channel, poll clock far away: the change sits unnoticed.
    assert!(watcher.tick().unwrap().is_empty());

    // Coming back to the foreground checks right away.
    watcher.set_visibility(Visibility::Foreground);
    assert_eq!(watcher.tick().unwrap(), vec![keys::EXPENSES.to_string()]);
}

#[test]
fn dropping_the_watcher_tears_down_its_listener() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_at(&dir.path().join("db.sqlite")).unwrap();

    let mut watcher = Watcher::new(&store, push_only()).unwrap();
    watch_expenses(&mut watcher);
    assert_eq!(store.bus().subscriber_count(), 1);

    drop(watcher);
    assert_eq!(store.bus().subscriber_count(), 0);
}
