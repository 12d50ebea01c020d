// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::settle;
use crate::fingerprint;
use crate::keys;
use crate::models::{ExpensesDoc, SettlementDoc, TradesDoc};
use crate::months;
use crate::store::Store;
use crate::utils::{current_month, parse_month};
use crate::watch::{ChannelConfig, Visibility, Watcher};
use anyhow::Result;

pub fn handle(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let month = match sub.get_one::<String>("month") {
        Some(s) => parse_month(s)?,
        None => current_month(),
    };
    months::ensure_month(store, &month)?;

    let mut watcher = Watcher::new(store, ChannelConfig::default())?;
    if sub.get_flag("background") {
        watcher.set_visibility(Visibility::Background);
    }

    let m = month.clone();
    watcher.watch(keys::EXPENSES, move |s| {
        let doc: ExpensesDoc = s.get_or_default(keys::EXPENSES)?;
        let settlement: SettlementDoc = s.get_or_default(keys::SETTLEMENT)?;
        Ok(fingerprint::expenses(&doc, &m, &settlement.matcher))
    });
    let m = month.clone();
    watcher.watch(keys::TRADES, move |s| {
        let doc: TradesDoc = s.get_or_default(keys::TRADES)?;
        Ok(fingerprint::trades(&doc, &m))
    });
    let m = month.clone();
    watcher.watch(keys::SETTLEMENT, move |s| {
        let doc: SettlementDoc = s.get_or_default(keys::SETTLEMENT)?;
        Ok(fingerprint::settlement(&doc, &m))
    });

    println!("Watching {} (Ctrl-C to stop)", month);
    watcher.run(|changed| {
        tracing::info!(keys = ?changed, "datasets changed, recomputing");
        settle::print_projection(store, &month)
    })
}
