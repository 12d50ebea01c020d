// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finsync::derive::derive;
use finsync::models::{ExpensesDoc, TradesDoc};
use finsync::store::Store;
use finsync::{cli, commands, keys, months};

fn setup() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_at(&dir.path().join("finsync.sqlite")).unwrap();
    (dir, store)
}

fn run(store: &Store, argv: &[&str]) {
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("expense", sub)) => commands::expenses::handle(store, sub).unwrap(),
        Some(("budget", sub)) => commands::budget::handle(store, sub).unwrap(),
        Some(("trade", sub)) => commands::trades::handle(store, sub).unwrap(),
        Some(("settle", sub)) => commands::settle::handle(store, sub).unwrap(),
        other => panic!("unhandled subcommand {:?}", other.map(|(n, _)| n)),
    }
}

#[test]
fn ledger_and_settlement_flow() {
    let (_dir, store) = setup();

    run(&store, &["finsync", "budget", "set", "300"]);
    run(&store, &[
        "finsync", "expense", "add", "--date", "2024-03-02", "--amount", "40,00",
        "--category", "Groceries",
    ]);
    run(&store, &[
        "finsync", "expense", "add", "--date", "2024-03-10", "--amount", "55.50",
        "--category", "Groceries",
    ]);
    run(&store, &[
        "finsync", "expense", "add", "--date", "2024-03-21", "--amount", "10.00",
        "--category", "Groceries",
    ]);
    run(&store, &[
        "finsync", "expense", "add", "--date", "2024-03-15", "--amount", "20.00",
        "--category", "Restaurant",
    ]);
    run(&store, &[
        "finsync", "settle", "income", "add", "-m", "2024-03", "--name", "Salary",
        "--amount", "2000",
    ]);
    run(&store, &[
        "finsync", "settle", "fixed", "add", "-m", "2024-03", "--name", "Rent",
        "--amount", "800",
    ]);
    run(&store, &["finsync", "settle", "planned", "-m", "2024-03", "100"]);
    run(&store, &["finsync", "budget", "override", "--spent", "50"]);

    let expenses: ExpensesDoc = store.get_or_default(keys::EXPENSES).unwrap();
    assert_eq!(expenses.expenses.len(), 4);
    // Comma-decimal input is accepted.
    assert_eq!(expenses.expenses[0].amount, "40.00".parse().unwrap());
    assert!(expenses.use_override);

    let doc = months::load(&store).unwrap();
    let trades: TradesDoc = store.get_or_default(keys::TRADES).unwrap();
    let state = months::state_of(&doc, "2024-03");
    let p = derive("2024-03", &expenses, &trades, &state, &doc.matcher);
    assert_eq!(format!("{:.2}", p.net), "830.00");
}

#[test]
fn overrides_and_recalc() {
    let (_dir, store) = setup();
    run(&store, &[
        "finsync", "expense", "add", "--date", "2024-03-02", "--amount", "40.00",
        "--category", "Groceries",
    ]);
    run(&store, &[
        "finsync", "settle", "override", "-m", "2024-03", "--total-spent", "90",
    ]);

    let doc = months::load(&store).unwrap();
    let state = months::state_of(&doc, "2024-03");
    assert_eq!(state.overrides.total_spent, Some("90".parse().unwrap()));

    run(&store, &["finsync", "settle", "override", "-m", "2024-03", "--clear"]);
    let doc = months::load(&store).unwrap();
    assert!(months::state_of(&doc, "2024-03").overrides.is_empty());

    run(&store, &["finsync", "settle", "recalc", "-m", "2024-03"]);
    let doc = months::load(&store).unwrap();
    let state = months::state_of(&doc, "2024-03");
    assert_eq!(state.overrides.total_spent, Some("40.00".parse().unwrap()));
    assert_eq!(state.overrides.groceries_spent, Some("40.00".parse().unwrap()));
}

#[test]
fn matcher_is_configurable() {
    let (_dir, store) = setup();
    run(&store, &[
        "finsync", "settle", "matcher", "fuzzy", "supermarket", "grocer",
    ]);
    let doc = months::load(&store).unwrap();
    assert!(doc.matcher.matches("Corner grocer"));
    assert!(!doc.matcher.matches("Restaurant"));

    run(&store, &["finsync", "settle", "matcher", "exact", "Groceries"]);
    let doc = months::load(&store).unwrap();
    assert!(doc.matcher.matches("Groceries"));
    assert!(!doc.matcher.matches("groceries"));
}

#[test]
fn trade_toggle_feeds_income() {
    let (_dir, store) = setup();
    run(&store, &[
        "finsync", "trade", "add", "--date", "2024-03-05", "--name", "ACME",
        "--pnl", "-30.25",
    ]);
    run(&store, &[
        "finsync", "settle", "income", "add", "-m", "2024-03", "--name", "Salary",
        "--amount", "1000",
    ]);
    run(&store, &["finsync", "settle", "trades", "-m", "2024-03", "on"]);

    let doc = months::load(&store).unwrap();
    let expenses: ExpensesDoc = store.get_or_default(keys::EXPENSES).unwrap();
    let trades: TradesDoc = store.get_or_default(keys::TRADES).unwrap();
    let state = months::state_of(&doc, "2024-03");
    assert!(state.include_trades);
    let p = derive("2024-03", &expenses, &trades, &state, &doc.matcher);
    assert_eq!(format!("{:.2}", p.income_total), "969.75");
}
