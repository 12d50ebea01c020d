// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One expense row. `label` is display-only and never enters a fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    #[serde(default, alias = "dateStr", deserialize_with = "de::lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::lenient_decimal")]
    pub amount: Decimal,
    #[serde(default)]
    pub category: String,
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// The expenses document: ledger rows plus the budget config the expense
/// surface owns (monthly budget and the spent-to-date override).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpensesDoc {
    #[serde(
        default,
        alias = "monthlyBudget",
        deserialize_with = "de::lenient_decimal"
    )]
    pub monthly_budget: Decimal,
    #[serde(default, alias = "useOverride")]
    pub use_override: bool,
    #[serde(
        default,
        alias = "overrideSpentToDate",
        deserialize_with = "de::lenient_opt_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub override_spent_to_date: Option<Decimal>,
    #[serde(default)]
    pub expenses: Vec<LedgerEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One trade row; `pnl` may be negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "dateStr", deserialize_with = "de::lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::lenient_decimal")]
    pub pnl: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradesDoc {
    #[serde(default)]
    pub trades: Vec<TradeEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WealthSnapshot {
    pub id: String,
    #[serde(default, alias = "dateStr", deserialize_with = "de::lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::lenient_decimal")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WealthDoc {
    #[serde(default)]
    pub snapshots: Vec<WealthSnapshot>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An income or fixed-cost row in a settlement month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedAmount {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "de::lenient_decimal")]
    pub amount: Decimal,
}

/// User-entered values that replace the automatic figures until cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Overrides {
    #[serde(
        default,
        alias = "totalSpent",
        deserialize_with = "de::lenient_opt_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_spent: Option<Decimal>,
    #[serde(
        default,
        alias = "groceriesSpent",
        deserialize_with = "de::lenient_opt_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub groceries_spent: Option<Decimal>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.total_spent.is_none() && self.groceries_spent.is_none()
    }
}

/// Per-month settlement state. Serde defaults backfill every field, so a
/// partially stored month never reaches callers with holes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementMonthState {
    #[serde(default)]
    pub incomes: Vec<NamedAmount>,
    #[serde(default, alias = "fixed")]
    pub fixed_costs: Vec<NamedAmount>,
    #[serde(default, deserialize_with = "de::lenient_decimal")]
    pub planned: Decimal,
    #[serde(default)]
    pub overrides: Overrides,
    #[serde(default = "de::yes", alias = "useAutoPlan")]
    pub use_auto_plan: bool,
    #[serde(default, alias = "includeTrades")]
    pub include_trades: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SettlementMonthState {
    fn default() -> Self {
        Self {
            incomes: Vec::new(),
            fixed_costs: Vec::new(),
            planned: Decimal::ZERO,
            overrides: Overrides::default(),
            use_auto_plan: true,
            include_trades: false,
            extra: Map::new(),
        }
    }
}

/// The settlement document: one state per month plus surface-wide config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettlementDoc {
    #[serde(default)]
    pub months: BTreeMap<String, SettlementMonthState>,
    #[serde(default, alias = "__lastYM", skip_serializing_if = "Option::is_none")]
    pub last_month: Option<String>,
    #[serde(default)]
    pub matcher: GroceryMatcher,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How a ledger category is recognized as the groceries tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum GroceryMatcher {
    /// Case-sensitive exact tag match.
    Exact(String),
    /// Case-insensitive substring match against a synonym list.
    Fuzzy(Vec<String>),
}

impl Default for GroceryMatcher {
    fn default() -> Self {
        GroceryMatcher::Exact("Groceries".to_string())
    }
}

impl GroceryMatcher {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            GroceryMatcher::Exact(tag) => category == tag,
            GroceryMatcher::Fuzzy(synonyms) => {
                let hay = category.to_lowercase();
                synonyms.iter().any(|s| hay.contains(&s.to_lowercase()))
            }
        }
    }
}

/// Derived monthly summary. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub month: String,
    pub income_total: Decimal,
    pub fixed_total: Decimal,
    pub spend_total: Decimal,
    pub groceries_total: Decimal,
    pub other_spend_total: Decimal,
    pub auto_plan_amount: Decimal,
    pub planned_manual: Decimal,
    pub net: Decimal,
}

/// Tolerant deserializers: user-entered numbers that fail to parse become
/// zero (amounts) or absent (overrides), and junk dates become `None`,
/// instead of poisoning the whole document.
pub(crate) mod de {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub(crate) fn yes() -> bool {
        true
    }

    pub(crate) fn decimal_of(v: &Value) -> Option<Decimal> {
        match v {
            Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
            Value::String(s) => {
                let t = s.trim();
                if t.is_empty() {
                    None
                } else {
                    t.replace(',', ".").parse::<Decimal>().ok()
                }
            }
            _ => None,
        }
    }

    pub(crate) fn lenient_decimal<'de, D>(d: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Option::<Value>::deserialize(d)?;
        Ok(v.as_ref().and_then(decimal_of).unwrap_or(Decimal::ZERO))
    }

    pub(crate) fn lenient_opt_decimal<'de, D>(d: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Option::<Value>::deserialize(d)?;
        Ok(v.as_ref().and_then(decimal_of))
    }

    pub(crate) fn lenient_date<'de, D>(d: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Option::<Value>::deserialize(d)?;
        Ok(v.as_ref()
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
    }
}
