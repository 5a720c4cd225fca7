//! Per-identity cooldown gates for repeatable chat commands.
//!
//! One `Cooldown` instance guards one command; ledgers are independent.
//! Entries are never pruned, which is fine for a single-session lifetime.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownCheck {
    Allowed,
    Denied { remaining: Duration },
}

/// Tracks the last successful invocation per identity.
#[derive(Debug)]
pub struct Cooldown {
    window: Duration,
    last_run: RwLock<HashMap<String, Instant>>,
}

impl Cooldown {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_run: RwLock::new(HashMap::new()),
        }
    }

    /// Check-and-update under a single write lock, so two simultaneous calls
    /// by the same identity cannot both pass. The ledger only advances on
    /// `Allowed`.
    pub async fn try_invoke(&self, key: &str) -> CooldownCheck {
        let now = Instant::now();
        let mut ledger = self.last_run.write().await;

        if let Some(last) = ledger.get(key) {
            let elapsed = now.duration_since(*last);
            if elapsed <= self.window {
                return CooldownCheck::Denied {
                    remaining: self.window - elapsed,
                };
            }
        }

        ledger.insert(key.to_string(), now);
        CooldownCheck::Allowed
    }
}
