// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::keys;
use crate::store::Store;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const ENVELOPE_TYPE: &str = "finance-app-backup";
pub const ENVELOPE_VERSION: u32 = 2;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("not a backup file (missing or wrong type marker)")]
    WrongType,
    #[error("backup file has no data section")]
    MissingData,
    #[error("backup file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The backup envelope: every known dataset under its name, plus enough
/// provenance to eyeball a file before restoring it.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "_type")]
    pub type_marker: String,
    #[serde(rename = "_version")]
    pub version: u32,
    #[serde(rename = "_timestamp")]
    pub timestamp: String,
    #[serde(rename = "_origin")]
    pub origin: String,
    pub data: Map<String, Value>,
}

/// Snapshot all present datasets. A body that fails to parse is carried as a
/// raw string rather than dropped, so a backup never loses data it cannot
/// read.
pub fn export(store: &Store) -> Result<Envelope> {
    let mut data = Map::new();
    for (name, key) in keys::ALL {
        if let Some(raw) = store.get_raw(key)? {
            let body = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
            data.insert(name.to_string(), body);
        }
    }
    Ok(Envelope {
        type_marker: ENVELOPE_TYPE.to_string(),
        version: ENVELOPE_VERSION,
        timestamp: chrono::Utc::now().to_rfc3339(),
        origin: store.path(),
        data,
    })
}

/// Validate the envelope and write each present dataset back through the
/// normal store path, so every context is notified as usual. Returns how
/// many datasets were restored.
pub fn restore(store: &Store, text: &str) -> Result<usize> {
    let envelope: Value = serde_json::from_str(text).map_err(BackupError::Parse)?;
    if envelope.get("_type").and_then(Value::as_str) != Some(ENVELOPE_TYPE) {
        return Err(BackupError::WrongType.into());
    }
    let Some(data) = envelope.get("data").and_then(Value::as_object) else {
        return Err(BackupError::MissingData.into());
    };

    let mut count = 0;
    for (name, key) in keys::ALL {
        if let Some(body) = data.get(name) {
            store.set_raw(key, &serde_json::to_string(body)?)?;
            count += 1;
        }
    }
    Ok(count)
}
