// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::keys;
use crate::models::{WealthDoc, WealthSnapshot};
use crate::store::Store;
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table, today, uid};
use anyhow::Result;

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
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

    let mut doc: WealthDoc = store.get_or_default(keys::WEALTH)?;
    doc.snapshots.push(WealthSnapshot {
        id: uid(),
        date: Some(date),
        amount,
    });
    doc.snapshots.sort_by_key(|s| s.date);
    store.set(keys::WEALTH, &doc)?;
    println!("Recorded wealth snapshot {:.2} on {}", amount, date);
    Ok(())
}

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let doc: WealthDoc = store.get_or_default(keys::WEALTH)?;

    if !maybe_print_json(json_flag, jsonl_flag, &doc.snapshots)? {
        let data = doc
            .snapshots
            .iter()
            .map(|s| {
                vec![
                    s.id.clone(),
                    s.date.map(|d| d.to_string()).unwrap_or_default(),
                    format!("{:.2}", s.amount),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Id", "Date", "Amount"], data));
    }
    Ok(())
}
