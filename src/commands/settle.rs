// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::derive::derive;
use crate::keys;
use crate::models::{ExpensesDoc, GroceryMatcher, NamedAmount, Projection, TradesDoc};
use crate::months;
use crate::store::Store;
use crate::utils::{current_month, maybe_print_json, parse_decimal, parse_month, pretty_table, uid};
use anyhow::{Result, bail};

#[derive(Clone, Copy)]
enum RowKind {
    Income,
    Fixed,
}

impl RowKind {
    fn noun(self) -> &'static str {
        match self {
            RowKind::Income => "income",
            RowKind::Fixed => "fixed-cost",
        }
    }
}

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(store, sub)?,
        Some(("income", sub)) => rows(store, sub, RowKind::Income)?,
        Some(("fixed", sub)) => rows(store, sub, RowKind::Fixed)?,
        Some(("planned", sub)) => planned(store, sub)?,
        Some(("override", sub)) => override_cmd(store, sub)?,
        Some(("autoplan", sub)) => toggle(store, sub, true)?,
        Some(("trades", sub)) => toggle(store, sub, false)?,
        Some(("matcher", sub)) => matcher_cmd(store, sub)?,
        Some(("recalc", sub)) => recalc(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn month_from(sub: &clap::ArgMatches) -> Result<String> {
    match sub.get_one::<String>("month") {
        Some(s) => parse_month(s),
        None => Ok(current_month()),
    }
}

/// Derive the month's projection from current store content.
pub(crate) fn projection_for(store: &Store, month: &str) -> Result<Projection> {
    let doc = months::load(store)?;
    let expenses: ExpensesDoc = store.get_or_default(keys::EXPENSES)?;
    let trades: TradesDoc = store.get_or_default(keys::TRADES)?;
    let state = months::state_of(&doc, month);
    Ok(derive(month, &expenses, &trades, &state, &doc.matcher))
}

pub(crate) fn print_projection(store: &Store, month: &str) -> Result<()> {
    let p = projection_for(store, month)?;
    let rows = vec![
        vec!["Income".to_string(), format!("{:.2}", p.income_total)],
        vec!["Fixed costs".to_string(), format!("{:.2}", p.fixed_total)],
        vec!["Total spent".to_string(), format!("{:.2}", p.spend_total)],
        vec![
            "Groceries (effective)".to_string(),
            format!("{:.2}", p.groceries_total),
        ],
        vec![
            "Other spend".to_string(),
            format!("{:.2}", p.other_spend_total),
        ],
        vec![
            "Auto-plan (groceries rest)".to_string(),
            format!("{:.2}", p.auto_plan_amount),
        ],
        vec![
            "Planned (manual)".to_string(),
            format!("{:.2}", p.planned_manual),
        ],
    ];
    println!("{}", pretty_table(&[month, "Amount"], rows));
    println!("Net at month end: {:.2}", p.net);
    Ok(())
}

fn show(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = month_from(sub)?;
    // First view of a month materializes its partition for every context.
    months::ensure_month(store, &month)?;

    let p = projection_for(store, &month)?;
    if !maybe_print_json(json_flag, jsonl_flag, &p)? {
        print_projection(store, &month)?;
    }
    Ok(())
}

fn rows(store: &Store, m: &clap::ArgMatches, kind: RowKind) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let month = month_from(sub)?;
            let Some(name) = sub.get_one::<String>("name") else {
                bail!("--name is required for add");
            };
            let Some(amount) = sub.get_one::<String>("amount") else {
                bail!("--amount is required for add");
            };
            let amount = parse_decimal(amount)?;
            let id = uid();
            months::update_month(store, &month, |st| {
                let list = match kind {
                    RowKind::Income => &mut st.incomes,
                    RowKind::Fixed => &mut st.fixed_costs,
                };
                list.push(NamedAmount {
                    id: id.clone(),
                    name: name.trim().to_string(),
                    amount,
                });
            })?;
            println!("Added {} '{}' {:.2} to {} [{}]", kind.noun(), name, amount, month, id);
        }
        Some(("set", sub)) => {
            let month = month_from(sub)?;
            let id = sub.get_one::<String>("id").unwrap();
            let name = sub.get_one::<String>("name").map(|s| s.trim().to_string());
            let amount = match sub.get_one::<String>("amount") {
                Some(s) => Some(parse_decimal(s)?),
                None => None,
            };

            let mut doc = months::load(store)?;
            let state = doc.months.entry(month.clone()).or_default();
            let list = match kind {
                RowKind::Income => &mut state.incomes,
                RowKind::Fixed => &mut state.fixed_costs,
            };
            let Some(row) = list.iter_mut().find(|r| r.id == *id) else {
                bail!("No {} row '{}' in {}", kind.noun(), id, month);
            };
            if let Some(name) = name {
                row.name = name;
            }
            if let Some(amount) = amount {
                row.amount = amount;
            }
            doc.last_month = Some(month.clone());
            store.set(keys::SETTLEMENT, &doc)?;
            println!("Updated {} row {}", kind.noun(), id);
        }
        Some(("del", sub)) => {
            let month = month_from(sub)?;
            let id = sub.get_one::<String>("id").unwrap();

            let mut doc = months::load(store)?;
            let state = doc.months.entry(month.clone()).or_default();
            let list = match kind {
                RowKind::Income => &mut state.incomes,
                RowKind::Fixed => &mut state.fixed_costs,
            };
            let before = list.len();
            list.retain(|r| r.id != *id);
            if list.len() == before {
                bail!("No {} row '{}' in {}", kind.noun(), id, month);
            }
            doc.last_month = Some(month.clone());
            store.set(keys::SETTLEMENT, &doc)?;
            println!("Deleted {} row {}", kind.noun(), id);
        }
        _ => {}
    }
    Ok(())
}

fn planned(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let month = month_from(sub)?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    months::update_month(store, &month, |st| st.planned = amount)?;
    println!("Planned (manual) for {} set to {:.2}", month, amount);
    Ok(())
}

fn override_cmd(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let month = month_from(sub)?;
    if sub.get_flag("clear") {
        months::update_month(store, &month, |st| st.overrides = Default::default())?;
        println!("Overrides for {} cleared", month);
        return Ok(());
    }
    let total = match sub.get_one::<String>("total-spent") {
        Some(s) => Some(parse_decimal(s)?),
        None => None,
    };
    let groceries = match sub.get_one::<String>("groceries") {
        Some(s) => Some(parse_decimal(s)?),
        None => None,
    };
    if total.is_none() && groceries.is_none() {
        bail!("Provide --total-spent, --groceries or --clear");
    }
    months::update_month(store, &month, |st| {
        if let Some(v) = total {
            st.overrides.total_spent = Some(v);
        }
        if let Some(v) = groceries {
            st.overrides.groceries_spent = Some(v);
        }
    })?;
    println!("Overrides for {} updated", month);
    Ok(())
}

fn toggle(store: &Store, sub: &clap::ArgMatches, autoplan: bool) -> Result<()> {
    let month = month_from(sub)?;
    let on = sub.get_one::<String>("state").unwrap() == "on";
    months::update_month(store, &month, |st| {
        if autoplan {
            st.use_auto_plan = on;
        } else {
            st.include_trades = on;
        }
    })?;
    let what = if autoplan {
        "Auto-plan"
    } else {
        "Trade P&L in income"
    };
    println!("{} {} for {}", what, if on { "on" } else { "off" }, month);
    Ok(())
}

fn matcher_cmd(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    let matcher = match m.subcommand() {
        Some(("exact", sub)) => {
            GroceryMatcher::Exact(sub.get_one::<String>("tag").unwrap().to_string())
        }
        Some(("fuzzy", sub)) => GroceryMatcher::Fuzzy(
            sub.get_many::<String>("synonyms")
                .unwrap()
                .map(|s| s.to_string())
                .collect(),
        ),
        _ => return Ok(()),
    };
    months::update_doc(store, |doc| doc.matcher = matcher.clone())?;
    match matcher {
        GroceryMatcher::Exact(tag) => println!("Groceries matcher: exact tag '{}'", tag),
        GroceryMatcher::Fuzzy(synonyms) => {
            println!("Groceries matcher: fuzzy synonyms {:?}", synonyms)
        }
    }
    Ok(())
}

/// Pin the overrides to whatever the ledger currently yields (the "take
/// over current figures" action from the settlement surface).
fn recalc(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let month = month_from(sub)?;
    let doc = months::load(store)?;
    let expenses: ExpensesDoc = store.get_or_default(keys::EXPENSES)?;
    let trades: TradesDoc = store.get_or_default(keys::TRADES)?;
    let mut probe = months::state_of(&doc, &month);
    probe.overrides = Default::default();
    let p = derive(&month, &expenses, &trades, &probe, &doc.matcher);

    months::update_month(store, &month, |st| {
        st.overrides.total_spent = Some(p.spend_total);
        st.overrides.groceries_spent = Some(p.groceries_total);
    })?;
    println!(
        "Overrides for {} pinned to ledger figures: total {:.2}, groceries {:.2}",
        month, p.spend_total, p.groceries_total
    );
    Ok(())
}
