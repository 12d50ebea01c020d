// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::bus::Bus;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Finsync", "finsync"));

/// Changelog rows kept after a write; a consumer whose cursor falls behind
/// this window degrades to a full fingerprint poll.
const CHANGELOG_KEEP: i64 = 512;

pub fn db_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var("FINSYNC_DB") {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("finsync.sqlite"))
}

/// Key -> JSON document store over one shared SQLite file. Every `set` and
/// `remove` appends to the changelog and fires the same-context bus before
/// returning, so the notification backlog never exceeds one mutation. There
/// is no un-notifying write path.
pub struct Store {
    conn: Connection,
    bus: Bus,
}

impl Store {
    pub fn open_default() -> Result<Store> {
        Store::open_at(&db_path()?)
    }

    pub fn open_at(path: &Path) -> Result<Store> {
        let conn = Connection::open(path)
            .with_context(|| format!("Open store at {}", path.display()))?;
        conn.busy_timeout(Duration::from_secs(5))?;
        // WAL keeps concurrent readers from blocking the writer context.
        let _mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |r| r.get(0))?;
        init_schema(&conn)?;
        Ok(Store {
            conn,
            bus: Bus::new(),
        })
    }

    /// The same-context signal channel for this store handle.
    pub fn bus(&self) -> Bus {
        self.bus.clone()
    }

    pub fn path(&self) -> String {
        self.conn.path().unwrap_or(":memory:").to_string()
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE key=?1",
                params![key],
                |r| r.get(0),
            )
            .optional()?;
        Ok(body)
    }

    /// Read and parse a document. Absent and malformed bodies are the same
    /// thing to callers: `Ok(None)`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key)? {
            None => Ok(None),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(doc) => Ok(Some(doc)),
                Err(err) => {
                    tracing::debug!(key, error = %err, "malformed document treated as absent");
                    Ok(None)
                }
            },
        }
    }

    pub fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        Ok(self.get(key)?.unwrap_or_default())
    }

    pub fn set<T: Serialize>(&self, key: &str, doc: &T) -> Result<()> {
        self.set_raw(key, &serde_json::to_string(doc)?)
    }

    pub fn set_raw(&self, key: &str, body: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO documents(key, body, updated_at) VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(key) DO UPDATE SET body=excluded.body, updated_at=excluded.updated_at",
                params![key, body],
            )
            .with_context(|| format!("Write document '{}'", key))?;
        self.log_change(key)?;
        self.bus.publish(key);
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM documents WHERE key=?1", params![key])
            .with_context(|| format!("Remove document '{}'", key))?;
        self.log_change(key)?;
        self.bus.publish(key);
        Ok(())
    }

    fn log_change(&self, key: &str) -> Result<()> {
        self.conn
            .execute("INSERT INTO changelog(key) VALUES (?1)", params![key])?;
        let head = self.conn.last_insert_rowid();
        self.conn.execute(
            "DELETE FROM changelog WHERE seq <= ?1",
            params![head - CHANGELOG_KEEP],
        )?;
        Ok(())
    }

    /// Storage-level change probe. SQLite bumps this value on a connection
    /// only when a *different* connection committed, which matches the
    /// cross-context storage signal exactly: the writer never sees its own.
    pub fn data_version(&self) -> Result<i64> {
        let v: i64 = self.conn.query_row("PRAGMA data_version", [], |r| r.get(0))?;
        Ok(v)
    }

    pub fn changelog_head(&self) -> Result<i64> {
        let head: Option<i64> = self
            .conn
            .query_row("SELECT MAX(seq) FROM changelog", [], |r| r.get(0))?;
        Ok(head.unwrap_or(0))
    }

    /// Changed keys recorded after `cursor`, the new cursor, and whether the
    /// retention window already dropped rows the cursor never saw.
    pub fn changelog_since(&self, cursor: i64) -> Result<ChangelogPage> {
        let min_seq: Option<i64> = self
            .conn
            .query_row("SELECT MIN(seq) FROM changelog", [], |r| r.get(0))?;
        let gap = matches!(min_seq, Some(min) if min > cursor + 1);

        let mut stmt = self
            .conn
            .prepare_cached("SELECT seq, key FROM changelog WHERE seq > ?1 ORDER BY seq")?;
        let mut rows = stmt.query(params![cursor])?;
        let mut next = cursor;
        let mut keys = Vec::new();
        while let Some(r) = rows.next()? {
            next = r.get(0)?;
            let key: String = r.get(1)?;
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        Ok(ChangelogPage {
            cursor: next,
            keys,
            gap,
        })
    }

    pub fn changelog_len(&self) -> Result<i64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM changelog", [], |r| r.get(0))?;
        Ok(n)
    }
}

#[derive(Debug)]
pub struct ChangelogPage {
    pub cursor: i64,
    pub keys: Vec<String>,
    pub gap: bool,
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS documents(
        key TEXT PRIMARY KEY,
        body TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS changelog(
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        key TEXT NOT NULL,
        changed_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    )?;
    Ok(())
}
