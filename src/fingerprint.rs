// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{ExpensesDoc, GroceryMatcher, SettlementDoc, TradesDoc, WealthDoc};
use crate::utils::month_of;
use rust_decimal::Decimal;
use std::fmt;

/// Cheap deterministic summary of a dataset's financially relevant fields.
/// Equal fingerprints mean "nothing worth recomputing changed". Built from
/// counts and 2-dp sums only, so row order and display-only fields (labels,
/// trade names) never affect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn dp2(d: Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

/// Month-scoped expenses summary: row count, spend total, groceries total,
/// plus the budget and override fields the derivation reads.
pub fn expenses(doc: &ExpensesDoc, month: &str, matcher: &GroceryMatcher) -> Fingerprint {
    let mut count = 0usize;
    let mut total = Decimal::ZERO;
    let mut groceries = Decimal::ZERO;
    for e in &doc.expenses {
        let Some(date) = e.date else { continue };
        if month_of(date) != month {
            continue;
        }
        count += 1;
        total += e.amount;
        if matcher.matches(&e.category) {
            groceries += e.amount;
        }
    }
    let override_add = if doc.use_override {
        doc.override_spent_to_date.unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };
    Fingerprint(format!(
        "{}|{}|{}|{}|{}|{}",
        count,
        dp2(total),
        dp2(groceries),
        dp2(doc.monthly_budget),
        u8::from(doc.use_override),
        dp2(override_add)
    ))
}

pub fn trades(doc: &TradesDoc, month: &str) -> Fingerprint {
    let mut count = 0usize;
    let mut total = Decimal::ZERO;
    for t in &doc.trades {
        let Some(date) = t.date else { continue };
        if month_of(date) != month {
            continue;
        }
        count += 1;
        total += t.pnl;
    }
    Fingerprint(format!("{}|{}", count, dp2(total)))
}

pub fn wealth(doc: &WealthDoc) -> Fingerprint {
    let total: Decimal = doc.snapshots.iter().map(|s| s.amount).sum();
    Fingerprint(format!("{}|{}", doc.snapshots.len(), dp2(total)))
}

/// Settlement summary for one month, plus the matcher config (a matcher
/// switch changes what "groceries" means, so it must force a recompute).
pub fn settlement(doc: &SettlementDoc, month: &str) -> Fingerprint {
    let state = doc.months.get(month).cloned().unwrap_or_default();
    let income_total: Decimal = state.incomes.iter().map(|r| r.amount).sum();
    let fixed_total: Decimal = state.fixed_costs.iter().map(|r| r.amount).sum();
    let opt = |v: Option<Decimal>| v.map(dp2).unwrap_or_else(|| "-".to_string());
    let matcher = serde_json::to_string(&doc.matcher).unwrap_or_default();
    Fingerprint(format!(
        "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
        state.incomes.len(),
        dp2(income_total),
        state.fixed_costs.len(),
        dp2(fixed_total),
        dp2(state.planned),
        opt(state.overrides.total_spent),
        opt(state.overrides.groceries_spent),
        u8::from(state.use_auto_plan),
        u8::from(state.include_trades),
        matcher
    ))
}
