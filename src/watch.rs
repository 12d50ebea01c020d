// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::bus::Subscription;
use crate::fingerprint::Fingerprint;
use crate::store::Store;
use anyhow::Result;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Poll cadence while the surface is being looked at.
pub const FOREGROUND_POLL: Duration = Duration::from_millis(900);
/// Poll cadence while hidden; pushes still land between polls.
pub const BACKGROUND_POLL: Duration = Duration::from_millis(3000);

/// How often `run` re-checks the push channels between polls.
const RUN_GRANULARITY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Foreground,
    Background,
}

/// Which push channels this consumer uses. Any of them may be switched off
/// (or be unavailable on a host) without affecting correctness; the poll
/// fallback cannot be disabled, only slowed.
#[derive(Debug, Clone, Copy)]
pub struct ChannelConfig {
    /// Same-context bus signal.
    pub direct: bool,
    /// Cross-context changelog broadcast.
    pub changelog: bool,
    /// Cross-context storage-level probe.
    pub data_version: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            direct: true,
            changelog: true,
            data_version: true,
        }
    }
}

type FingerprintFn = Box<dyn Fn(&Store) -> Result<Fingerprint>>;

struct WatchedKey {
    key: String,
    fingerprint: FingerprintFn,
    last: Option<Fingerprint>,
}

/// Per-consumer subscription loop: push notifications mark keys as due, the
/// poll clock marks everything due on an interval, and a due key triggers a
/// recompute only when its freshly computed fingerprint differs from the
/// last observed one. Notifications carry no payload worth trusting; every
/// check re-reads current store content.
///
/// Dropping the watcher tears down its bus listener.
pub struct Watcher<'s> {
    store: &'s Store,
    keys: Vec<WatchedKey>,
    channels: ChannelConfig,
    pending: Arc<Mutex<HashSet<String>>>,
    _direct: Option<Subscription>,
    cursor: i64,
    seen_version: i64,
    visibility: Visibility,
    fg_interval: Duration,
    bg_interval: Duration,
    next_poll: Instant,
}

impl<'s> Watcher<'s> {
    pub fn new(store: &'s Store, channels: ChannelConfig) -> Result<Watcher<'s>> {
        let pending = Arc::new(Mutex::new(HashSet::new()));
        let direct = if channels.direct {
            let pending = Arc::clone(&pending);
            Some(store.bus().subscribe(move |key| {
                pending
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .insert(key.to_string());
            }))
        } else {
            None
        };
        let cursor = if channels.changelog {
            store.changelog_head()?
        } else {
            0
        };
        let seen_version = if channels.data_version {
            store.data_version()?
        } else {
            0
        };
        Ok(Watcher {
            store,
            keys: Vec::new(),
            channels,
            pending,
            _direct: direct,
            cursor,
            seen_version,
            visibility: Visibility::Foreground,
            fg_interval: FOREGROUND_POLL,
            bg_interval: BACKGROUND_POLL,
            // First tick checks everything: the mount-time recompute.
            next_poll: Instant::now(),
        })
    }

    pub fn with_intervals(mut self, foreground: Duration, background: Duration) -> Watcher<'s> {
        self.fg_interval = foreground;
        self.bg_interval = background;
        self
    }

    /// Track a key with the fingerprint computation that decides whether a
    /// change is worth reacting to.
    pub fn watch(&mut self, key: &str, fingerprint: impl Fn(&Store) -> Result<Fingerprint> + 'static) {
        self.keys.push(WatchedKey {
            key: key.to_string(),
            fingerprint: Box::new(fingerprint),
            last: None,
        });
    }

    /// A visibility change adjusts the poll cadence and always forces one
    /// immediate check, regardless of where the poll clock stood.
    pub fn set_visibility(&mut self, v: Visibility) {
        self.visibility = v;
        self.next_poll = Instant::now();
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn poll_interval(&self) -> Duration {
        match self.visibility {
            Visibility::Foreground => self.fg_interval,
            Visibility::Background => self.bg_interval,
        }
    }

    /// One pass over every channel. Returns the keys whose fingerprint
    /// actually changed; an empty result means no recompute is needed.
    pub fn tick(&mut self) -> Result<Vec<String>> {
        let mut due: HashSet<String> = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain()
            .collect();
        let mut check_all = false;

        if self.channels.changelog {
            let page = self.store.changelog_since(self.cursor)?;
            self.cursor = page.cursor;
            if page.gap {
                // Cursor fell out of the retention window: degrade to a
                // full check rather than trust a partial page.
                check_all = true;
            }
            due.extend(page.keys);
        }

        if self.channels.data_version {
            let v = self.store.data_version()?;
            if v != self.seen_version {
                self.seen_version = v;
                check_all = true;
            }
        }

        let now = Instant::now();
        if now >= self.next_poll {
            check_all = true;
            self.next_poll = now + self.poll_interval();
        }

        let mut changed = Vec::new();
        for wk in &mut self.keys {
            if !check_all && !due.contains(&wk.key) {
                continue;
            }
            let fp = (wk.fingerprint)(self.store)?;
            if wk.last.as_ref() != Some(&fp) {
                tracing::debug!(key = %wk.key, fingerprint = %fp, "fingerprint changed");
                wk.last = Some(fp);
                changed.push(wk.key.clone());
            }
        }
        Ok(changed)
    }

    /// Blocking loop for the watch surface: drains channels continuously and
    /// invokes `on_change` with the keys that changed. Runs until the
    /// process is interrupted.
    pub fn run<F>(&mut self, mut on_change: F) -> Result<()>
    where
        F: FnMut(&[String]) -> Result<()>,
    {
        loop {
            let changed = self.tick()?;
            if !changed.is_empty() {
                on_change(&changed)?;
            }
            std::thread::sleep(RUN_GRANULARITY);
        }
    }
}
