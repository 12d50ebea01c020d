// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{ExpensesDoc, GroceryMatcher, Projection, SettlementMonthState, TradesDoc};
use crate::utils::month_of;
use rust_decimal::Decimal;

/// Signed P&L total of all trades dated in `month`.
pub fn trades_month_total(trades: &TradesDoc, month: &str) -> Decimal {
    let mut total = Decimal::ZERO;
    for t in &trades.trades {
        let Some(date) = t.date else { continue };
        if month_of(date) == month {
            total += t.pnl;
        }
    }
    total
}

/// Compute the month's net projection. Pure: same inputs, same output, no
/// reads or writes. Absent documents are passed as defaults by callers, so
/// "no data" means zero totals here, never an error.
///
/// Overrides replace the automatic figure entirely while set; the auto-plan
/// and other-spend intermediates clamp at zero, `net` does not.
pub fn derive(
    month: &str,
    expenses: &ExpensesDoc,
    trades: &TradesDoc,
    state: &SettlementMonthState,
    matcher: &GroceryMatcher,
) -> Projection {
    let mut spend_total_raw = Decimal::ZERO;
    let mut groceries_raw = Decimal::ZERO;
    for e in &expenses.expenses {
        let Some(date) = e.date else { continue };
        if month_of(date) != month {
            continue;
        }
        spend_total_raw += e.amount;
        if matcher.matches(&e.category) {
            groceries_raw += e.amount;
        }
    }

    let groceries_with_override = if expenses.use_override {
        groceries_raw + expenses.override_spent_to_date.unwrap_or(Decimal::ZERO)
    } else {
        groceries_raw
    };
    let auto_plan_raw = (expenses.monthly_budget - groceries_with_override).max(Decimal::ZERO);

    let total_spent_eff = state.overrides.total_spent.unwrap_or(spend_total_raw);
    let groceries_eff = state
        .overrides
        .groceries_spent
        .unwrap_or(groceries_with_override);
    let other_spend_total = (total_spent_eff - groceries_eff).max(Decimal::ZERO);

    let auto_plan_amount = if state.use_auto_plan {
        auto_plan_raw
    } else {
        Decimal::ZERO
    };

    let mut income_total: Decimal = state.incomes.iter().map(|r| r.amount).sum();
    if state.include_trades {
        income_total += trades_month_total(trades, month);
    }
    let fixed_total: Decimal = state.fixed_costs.iter().map(|r| r.amount).sum();

    let net = income_total - fixed_total - total_spent_eff - state.planned - auto_plan_amount;

    Projection {
        month: month.to_string(),
        income_total,
        fixed_total,
        spend_total: total_spent_eff,
        groceries_total: groceries_eff,
        other_spend_total,
        auto_plan_amount,
        planned_manual: state.planned,
        net,
    }
}
