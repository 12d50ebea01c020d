// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::derive::trades_month_total;
use crate::keys;
use crate::models::{TradeEntry, TradesDoc};
use crate::store::Store;
use crate::utils::{
    current_month, fmt_money, maybe_print_json, month_of, parse_date, parse_decimal, pretty_table,
    today, uid,
};
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
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let pnl = parse_decimal(sub.get_one::<String>("pnl").unwrap())?;

    let mut doc: TradesDoc = store.get_or_default(keys::TRADES)?;
    let id = uid();
    doc.trades.push(TradeEntry {
        id: id.clone(),
        name: name.clone(),
        date: Some(date),
        pnl,
    });
    store.set(keys::TRADES, &doc)?;
    println!("Recorded trade '{}' {:+.2} on {} [{}]", name, pnl, date, id);
    Ok(())
}

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = sub
        .get_one::<String>("month")
        .cloned()
        .unwrap_or_else(current_month);

    let doc: TradesDoc = store.get_or_default(keys::TRADES)?;
    let mut rows: Vec<&TradeEntry> = doc
        .trades
        .iter()
        .filter(|t| t.date.map(month_of).as_deref() == Some(month.as_str()))
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));

    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        let data = rows
            .iter()
            .map(|t| {
                vec![
                    t.id.clone(),
                    t.date.map(|d| d.to_string()).unwrap_or_default(),
                    t.name.clone(),
                    format!("{:+.2}", t.pnl),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Id", "Date", "Name", "P&L"], data));
        println!(
            "Month P&L ({}): {}",
            month,
            fmt_money(&trades_month_total(&doc, &month), "EUR")
        );
    }
    Ok(())
}

fn edit(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let mut doc: TradesDoc = store.get_or_default(keys::TRADES)?;
    let Some(trade) = doc.trades.iter_mut().find(|t| t.id == *id) else {
        bail!("Trade '{}' not found", id);
    };
    if let Some(s) = sub.get_one::<String>("date") {
        trade.date = Some(parse_date(s)?);
    }
    if let Some(s) = sub.get_one::<String>("name") {
        trade.name = s.trim().to_string();
    }
    if let Some(s) = sub.get_one::<String>("pnl") {
        trade.pnl = parse_decimal(s)?;
    }
    store.set(keys::TRADES, &doc)?;
    println!("Updated trade {}", id);
    Ok(())
}

fn del(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let mut doc: TradesDoc = store.get_or_default(keys::TRADES)?;
    let before = doc.trades.len();
    doc.trades.retain(|t| t.id != *id);
    if doc.trades.len() == before {
        bail!("Trade '{}' not found", id);
    }
    store.set(keys::TRADES, &doc)?;
    println!("Deleted trade {}", id);
    Ok(())
}
