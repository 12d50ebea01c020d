// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::keys;
use crate::models::SettlementDoc;
use crate::store::Store;
use crate::utils::{parse_month, pretty_table};
use anyhow::Result;

pub fn handle(store: &Store) -> Result<()> {
    let mut rows = Vec::new();

    // 1) Documents that no longer parse (read as defaults everywhere else)
    for (name, key) in keys::ALL {
        if let Some(raw) = store.get_raw(key)? {
            if serde_json::from_str::<serde_json::Value>(&raw).is_err() {
                rows.push(vec![
                    "malformed_document".to_string(),
                    format!("{} ({})", name, key),
                ]);
            }
        }
    }

    // 2) Data still sitting under legacy keys
    for key in keys::lingering_legacy(store)? {
        rows.push(vec!["legacy_key".to_string(), key]);
    }

    // 3) Settlement partitions that are not YYYY-MM
    if let Some(doc) = store.get::<SettlementDoc>(keys::SETTLEMENT)? {
        for month in doc.months.keys() {
            if parse_month(month).is_err() {
                rows.push(vec!["invalid_month_key".to_string(), month.clone()]);
            }
        }
    }

    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
