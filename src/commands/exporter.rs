// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::keys;
use crate::models::{ExpensesDoc, TradesDoc};
use crate::store::Store;
use anyhow::Result;

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("expenses", sub)) => export_expenses(store, sub),
        Some(("trades", sub)) => export_trades(store, sub),
        _ => Ok(()),
    }
}

fn export_expenses(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let doc: ExpensesDoc = store.get_or_default(keys::EXPENSES)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["id", "date", "amount", "category", "label"])?;
            for e in &doc.expenses {
                wtr.write_record([
                    e.id.clone(),
                    e.date.map(|d| d.to_string()).unwrap_or_default(),
                    format!("{:.2}", e.amount),
                    e.category.clone(),
                    e.label.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&doc.expenses)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
        }
    }
    println!("Exported expenses to {}", out);
    Ok(())
}

fn export_trades(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let doc: TradesDoc = store.get_or_default(keys::TRADES)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["id", "date", "name", "pnl"])?;
            for t in &doc.trades {
                wtr.write_record([
                    t.id.clone(),
                    t.date.map(|d| d.to_string()).unwrap_or_default(),
                    t.name.clone(),
                    format!("{:.2}", t.pnl),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&doc.trades)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
        }
    }
    println!("Exported trades to {}", out);
    Ok(())
}
