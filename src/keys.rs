// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::Store;
use anyhow::Result;

// Stable document keys, one per dataset. Renaming one requires a LEGACY
// entry below or existing data is orphaned.
pub const EXPENSES: &str = "expenses-ledger-v1";
pub const TRADES: &str = "trades-ledger-v1";
pub const WEALTH: &str = "wealth-snapshots-v1";
pub const SETTLEMENT: &str = "settlement-config-v1";

/// Dataset name -> key, in backup-envelope order.
pub const ALL: [(&str, &str); 4] = [
    ("expenses", EXPENSES),
    ("trades", TRADES),
    ("wealth", WEALTH),
    ("settlement", SETTLEMENT),
];

/// Keys older app generations wrote, newest first per dataset.
const LEGACY: [(&str, &[&str]); 4] = [
    (
        EXPENSES,
        &[
            "budget-tracker-react-v11",
            "budget-tracker-react-v10",
            "budget-tracker-react",
            "bx_expenses_v1",
        ],
    ),
    (
        TRADES,
        &[
            "trades-data-v1",
            "trades-tracker-v1",
            "trades-tracker-react-v1",
        ],
    ),
    (
        WEALTH,
        &[
            "wealth-data-v3",
            "wealth-data-v2",
            "wealth_snapshots_v1",
            "bx_wealth_v1",
        ],
    ),
    (SETTLEMENT, &["summary-data-v1"]),
];

/// One-shot adoption of data left under legacy keys: for each dataset whose
/// current key is absent, copy the first legacy body found. Goes through the
/// normal write path, so consumers are notified. Legacy rows are left in
/// place; `doctor` reports them.
pub fn adopt_legacy(store: &Store) -> Result<usize> {
    let mut adopted = 0;
    for (current, candidates) in LEGACY {
        if store.get_raw(current)?.is_some() {
            continue;
        }
        for legacy in candidates {
            if let Some(body) = store.get_raw(legacy)? {
                store.set_raw(current, &body)?;
                tracing::info!(from = legacy, to = current, "adopted legacy dataset key");
                adopted += 1;
                break;
            }
        }
    }
    Ok(adopted)
}

/// Legacy keys that still hold data (for `doctor`).
pub fn lingering_legacy(store: &Store) -> Result<Vec<String>> {
    let mut found = Vec::new();
    for (_, candidates) in LEGACY {
        for legacy in candidates {
            if store.get_raw(legacy)?.is_some() {
                found.push((*legacy).to_string());
            }
        }
    }
    Ok(found)
}
