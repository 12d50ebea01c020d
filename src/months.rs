// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::keys;
use crate::models::{SettlementDoc, SettlementMonthState, de};
use crate::store::Store;
use crate::utils::uid;
use anyhow::Result;
use serde_json::{Map, Value, json};

/// Load the settlement document, upgrading legacy shapes exactly once.
/// A rewrite is persisted through the normal store path (so every context is
/// notified) before the document is returned; a document already in the
/// current shape causes no write at all.
pub fn load(store: &Store) -> Result<SettlementDoc> {
    let Some(raw) = store.get::<Value>(keys::SETTLEMENT)? else {
        return Ok(SettlementDoc::default());
    };
    if let Some(upgraded) = upgrade(&raw) {
        // Round-tripping through the typed document normalizes legacy field
        // names; unknown siblings survive in `extra`.
        let doc: SettlementDoc = serde_json::from_value(upgraded).unwrap_or_default();
        store.set(keys::SETTLEMENT, &doc)?;
        tracing::info!(key = keys::SETTLEMENT, "upgraded legacy settlement document");
        return Ok(doc);
    }
    Ok(serde_json::from_value(raw).unwrap_or_default())
}

/// Read-only month state: existing partition or defaults, fields always
/// populated.
pub fn state_of(doc: &SettlementDoc, month: &str) -> SettlementMonthState {
    doc.months.get(month).cloned().unwrap_or_default()
}

/// Materialize a month partition on first view and persist it immediately,
/// making it visible to every other context.
pub fn ensure_month(store: &Store, month: &str) -> Result<SettlementDoc> {
    let mut doc = load(store)?;
    let mut dirty = false;
    if !doc.months.contains_key(month) {
        doc.months
            .insert(month.to_string(), SettlementMonthState::default());
        dirty = true;
    }
    if doc.last_month.as_deref() != Some(month) {
        doc.last_month = Some(month.to_string());
        dirty = true;
    }
    if dirty {
        store.set(keys::SETTLEMENT, &doc)?;
    }
    Ok(doc)
}

/// Apply one mutation to a month's state and persist right away.
pub fn update_month<F>(store: &Store, month: &str, f: F) -> Result<SettlementDoc>
where
    F: FnOnce(&mut SettlementMonthState),
{
    let mut doc = load(store)?;
    let state = doc.months.entry(month.to_string()).or_default();
    f(state);
    doc.last_month = Some(month.to_string());
    store.set(keys::SETTLEMENT, &doc)?;
    Ok(doc)
}

/// Apply one mutation to the document root (matcher config etc.) and persist.
pub fn update_doc<F>(store: &Store, f: F) -> Result<SettlementDoc>
where
    F: FnOnce(&mut SettlementDoc),
{
    let mut doc = load(store)?;
    f(&mut doc);
    store.set(keys::SETTLEMENT, &doc)?;
    Ok(doc)
}

fn is_month_key(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 7
        && b[4] == b'-'
        && b[..4].iter().all(|c| c.is_ascii_digit())
        && b[5..].iter().all(|c| c.is_ascii_digit())
}

/// Detect legacy settlement shapes and produce the upgraded value, or `None`
/// when the document is already current. Recognized legacy forms:
///
/// - month states keyed directly at the root (pre-`months` layout)
/// - `__lastYM` instead of `last_month`
/// - a scalar `income` where `incomes` rows are expected
///
/// Anything unrecognized is carried along untouched; an unrecognizable root
/// is left entirely alone and callers proceed on defaults.
pub fn upgrade(raw: &Value) -> Option<Value> {
    let obj = raw.as_object()?;
    let mut root = obj.clone();
    let mut changed = false;

    if !root.contains_key("months") {
        let month_keys: Vec<String> = root.keys().filter(|k| is_month_key(k)).cloned().collect();
        if !month_keys.is_empty() {
            let mut months = Map::new();
            for k in month_keys {
                if let Some(state) = root.remove(&k) {
                    months.insert(k, state);
                }
            }
            root.insert("months".to_string(), Value::Object(months));
            changed = true;
        }
    }

    if let Some(v) = root.remove("__lastYM") {
        root.insert("last_month".to_string(), v);
        changed = true;
    }

    if let Some(Value::Object(months)) = root.get_mut("months") {
        for state in months.values_mut() {
            let Some(st) = state.as_object_mut() else {
                continue;
            };
            if let Some(income) = st.remove("income") {
                let has_rows =
                    matches!(st.get("incomes"), Some(Value::Array(rows)) if !rows.is_empty());
                if !has_rows {
                    let rows = match de::decimal_of(&income) {
                        Some(amount) if !amount.is_zero() => vec![json!({
                            "id": uid(),
                            "name": "Income",
                            "amount": amount.to_string(),
                        })],
                        _ => Vec::new(),
                    };
                    st.insert("incomes".to_string(), Value::Array(rows));
                }
                changed = true;
            }
        }
    }

    if changed { Some(Value::Object(root)) } else { None }
}
