// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::keys;
use crate::models::{ExpensesDoc, LedgerEntry};
use crate::ocr;
use crate::store::Store;
use crate::utils::{maybe_print_json, pretty_table, today, uid};
use anyhow::{Context, Result};

pub fn handle(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let path = sub.get_one::<String>("file").unwrap();
    let text =
        std::fs::read_to_string(path).with_context(|| format!("Read scan text '{}'", path))?;

    let candidates = ocr::parse_amounts(&text);
    let label = ocr::suggest_label(&text);

    #[derive(serde::Serialize)]
    struct ScanView<'a> {
        label: Option<&'a str>,
        candidates: &'a [ocr::AmountCandidate],
    }
    let view = ScanView {
        label: label.as_deref(),
        candidates: &candidates,
    };
    if !maybe_print_json(json_flag, jsonl_flag, &view)? {
        if candidates.is_empty() {
            println!("No amounts recognized");
        } else {
            let rows = candidates
                .iter()
                .map(|c| {
                    vec![
                        format!("{:.2}", c.value),
                        c.raw.clone(),
                        c.index.to_string(),
                    ]
                })
                .collect();
            println!("{}", pretty_table(&["Value", "Raw", "Offset"], rows));
        }
        if let Some(ref l) = label {
            println!("Suggested label: {}", l);
        }
    }

    if sub.get_flag("add") {
        // A receipt total is normally its largest figure.
        let Some(best) = candidates.iter().max_by(|a, b| a.value.cmp(&b.value)) else {
            return Ok(());
        };
        let category = sub.get_one::<String>("category").unwrap().to_string();
        let mut doc: ExpensesDoc = store.get_or_default(keys::EXPENSES)?;
        let id = uid();
        doc.expenses.push(LedgerEntry {
            id: id.clone(),
            date: Some(today()),
            amount: best.value,
            category: category.clone(),
            label,
        });
        store.set(keys::EXPENSES, &doc)?;
        println!("Recorded {:.2} ({}) [{}]", best.value, category, id);
    }
    Ok(())
}
