// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::keys;
use crate::models::ExpensesDoc;
use crate::store::Store;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Result, bail};

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(store, sub)?,
        Some(("override", sub)) => override_cmd(store, sub)?,
        Some(("show", sub)) => show(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let mut doc: ExpensesDoc = store.get_or_default(keys::EXPENSES)?;
    doc.monthly_budget = amount;
    store.set(keys::EXPENSES, &doc)?;
    println!("Monthly groceries budget set to {:.2}", amount);
    Ok(())
}

fn override_cmd(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let mut doc: ExpensesDoc = store.get_or_default(keys::EXPENSES)?;
    if sub.get_flag("clear") {
        doc.use_override = false;
        doc.override_spent_to_date = None;
        store.set(keys::EXPENSES, &doc)?;
        println!("Spent-to-date override cleared");
    } else if let Some(s) = sub.get_one::<String>("spent") {
        let amount = parse_decimal(s)?;
        doc.use_override = true;
        doc.override_spent_to_date = Some(amount);
        store.set(keys::EXPENSES, &doc)?;
        println!("Spent-to-date override set to {:.2}", amount);
    } else {
        bail!("Provide --spent <amount> or --clear");
    }
    Ok(())
}

fn show(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let doc: ExpensesDoc = store.get_or_default(keys::EXPENSES)?;

    #[derive(serde::Serialize)]
    struct BudgetView {
        monthly_budget: rust_decimal::Decimal,
        use_override: bool,
        override_spent_to_date: Option<rust_decimal::Decimal>,
        entries: usize,
    }
    let view = BudgetView {
        monthly_budget: doc.monthly_budget,
        use_override: doc.use_override,
        override_spent_to_date: doc.override_spent_to_date,
        entries: doc.expenses.len(),
    };
    if !maybe_print_json(json_flag, jsonl_flag, &view)? {
        let rows = vec![
            vec![
                "Monthly budget".to_string(),
                format!("{:.2}", view.monthly_budget),
            ],
            vec!["Use override".to_string(), view.use_override.to_string()],
            vec![
                "Override spent-to-date".to_string(),
                view.override_spent_to_date
                    .map(|d| format!("{:.2}", d))
                    .unwrap_or_else(|| "-".to_string()),
            ],
            vec!["Ledger entries".to_string(), view.entries.to_string()],
        ];
        println!("{}", pretty_table(&["Field", "Value"], rows));
    }
    Ok(())
}
