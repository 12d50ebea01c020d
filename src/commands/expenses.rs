// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::keys;
use crate::models::{ExpensesDoc, LedgerEntry};
use crate::store::Store;
use crate::utils::{maybe_print_json, month_of, parse_date, parse_decimal, pretty_table, today, uid};
use anyhow::{Result, bail};

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("del", sub)) => del(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => today(),
    };
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    let label = sub.get_one::<String>("label").map(|s| s.to_string());

    let mut doc: ExpensesDoc = store.get_or_default(keys::EXPENSES)?;
    let id = uid();
    doc.expenses.push(LedgerEntry {
        id: id.clone(),
        date: Some(date),
        amount,
        category: category.clone(),
        label,
    });
    store.set(keys::EXPENSES, &doc)?;
    println!("Recorded {:.2} on {} ({}) [{}]", amount, date, category, id);
    Ok(())
}

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = sub.get_one::<String>("month");

    let doc: ExpensesDoc = store.get_or_default(keys::EXPENSES)?;
    let mut rows: Vec<&LedgerEntry> = doc
        .expenses
        .iter()
        .filter(|e| match (month, e.date) {
            (None, _) => true,
            (Some(m), Some(d)) => month_of(d) == *m,
            (Some(_), None) => false,
        })
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));

    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        let data = rows
            .iter()
            .map(|e| {
                vec![
                    e.id.clone(),
                    e.date.map(|d| d.to_string()).unwrap_or_default(),
                    format!("{:.2}", e.amount),
                    e.category.clone(),
                    e.label.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Date", "Amount", "Category", "Label"], data)
        );
    }
    Ok(())
}

fn edit(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let mut doc: ExpensesDoc = store.get_or_default(keys::EXPENSES)?;
    let Some(entry) = doc.expenses.iter_mut().find(|e| e.id == *id) else {
        bail!("Expense '{}' not found", id);
    };
    if let Some(s) = sub.get_one::<String>("date") {
        entry.date = Some(parse_date(s)?);
    }
    if let Some(s) = sub.get_one::<String>("amount") {
        entry.amount = parse_decimal(s)?;
    }
    if let Some(s) = sub.get_one::<String>("category") {
        entry.category = s.trim().to_string();
    }
    if let Some(s) = sub.get_one::<String>("label") {
        entry.label = Some(s.to_string());
    }
    store.set(keys::EXPENSES, &doc)?;
    println!("Updated expense {}", id);
    Ok(())
}

fn del(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let mut doc: ExpensesDoc = store.get_or_default(keys::EXPENSES)?;
    let before = doc.expenses.len();
    doc.expenses.retain(|e| e.id != *id);
    if doc.expenses.len() == before {
        bail!("Expense '{}' not found", id);
    }
    store.set(keys::EXPENSES, &doc)?;
    println!("Deleted expense {}", id);
    Ok(())
}
