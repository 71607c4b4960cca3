//! Passive balance time-gate.
//!
//! The passive balance (fixed assets, long-term reserves) may be edited only
//! when the last edit is older than the lock period, or when the per-day
//! unlock override is set. This is a plain time check, not a concurrency lock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use floatbook_core::{DomainError, DomainResult};

use crate::snapshot::LiquiditySnapshot;

pub const DEFAULT_PASSIVE_LOCK_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassiveLockPolicy {
    pub lock_days: i64,
}

impl Default for PassiveLockPolicy {
    fn default() -> Self {
        Self {
            lock_days: DEFAULT_PASSIVE_LOCK_DAYS,
        }
    }
}

impl PassiveLockPolicy {
    pub fn new(lock_days: i64) -> Self {
        Self { lock_days }
    }

    pub fn lock_period(&self) -> Duration {
        Duration::days(self.lock_days)
    }

    pub fn is_locked(&self, snapshot: &LiquiditySnapshot, now: DateTime<Utc>) -> bool {
        if snapshot.is_passive_unlock_override {
            return false;
        }
        match snapshot.passive_balance_last_updated {
            Some(last) => now - last <= self.lock_period(),
            None => false,
        }
    }

    /// When the lock lifts on its own, if it is currently held by time.
    pub fn unlocks_at(&self, snapshot: &LiquiditySnapshot) -> Option<DateTime<Utc>> {
        snapshot
            .passive_balance_last_updated
            .map(|last| last + self.lock_period())
    }

    pub fn ensure_editable(
        &self,
        snapshot: &LiquiditySnapshot,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.is_locked(snapshot, now) {
            return Err(DomainError::locked(format!(
                "passive balance is locked for {} days after each edit",
                self.lock_days
            )));
        }
        Ok(())
    }
}
