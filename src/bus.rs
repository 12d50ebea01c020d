// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::{Arc, Mutex, Weak};

type Listener = Box<dyn Fn(&str) + Send>;

struct Inner {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Same-context change signal: a listener registry owned by the store handle
/// and fired synchronously after every write. One `Bus` exists per store
/// handle (per execution context); cross-context delivery goes through the
/// changelog and the storage-level data-version probe instead.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<Mutex<Inner>>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Bus {
            inner: Arc::new(Mutex::new(Inner {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register a listener for key-change events. The listener runs on the
    /// writer's call stack and must not write back into the store.
    pub fn subscribe(&self, f: impl Fn(&str) + Send + 'static) -> Subscription {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Box::new(f)));
        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn publish(&self, key: &str) {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        tracing::debug!(key, listeners = inner.listeners.len(), "bus publish");
        for (_, f) in &inner.listeners {
            f(key);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .listeners
            .len()
    }
}

/// Unregisters its listener when dropped, so a dismissed consumer leaves no
/// dangling callback behind.
pub struct Subscription {
    id: u64,
    inner: Weak<Mutex<Inner>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            let mut inner = inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
