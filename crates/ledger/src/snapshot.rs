use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use floatbook_core::{DomainError, DomainResult, Money};

use crate::channel::{Channel, ChannelBalances};
use crate::passive::PassiveLockPolicy;

/// Liquidity state for one business-local calendar date.
///
/// Every field has a zero default, so a date nobody wrote yet reads as an
/// empty, open day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiquiditySnapshot {
    pub opening_balances: ChannelBalances,
    pub actual_balances: ChannelBalances,
    /// Fixed / long-term assets; never part of the active balance.
    pub passive_balance: Money,
    pub passive_balance_last_updated: Option<DateTime<Utc>>,
    /// `None` until the day is closed.
    pub closing_balance: Option<Money>,
    pub reconciliation_notes: String,
    pub is_passive_unlock_override: bool,
}

impl LiquiditySnapshot {
    /// Σ opening balances.
    pub fn opening_balance(&self) -> Money {
        self.opening_balances.total()
    }

    /// Σ actual (counted) balances.
    pub fn active_balance(&self) -> Money {
        self.actual_balances.total()
    }

    pub fn is_closed(&self) -> bool {
        self.closing_balance.is_some()
    }

    /// Start-of-day figures are frozen once the day has been closed.
    pub fn ensure_opening_editable(&self) -> DomainResult<()> {
        if self.is_closed() {
            return Err(DomainError::locked(
                "opening balances cannot change after the day is closed",
            ));
        }
        Ok(())
    }

    /// Check every guarded field a patch touches; the snapshot is not modified.
    pub fn ensure_patch_allowed(
        &self,
        patch: &SnapshotPatch,
        policy: &PassiveLockPolicy,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if patch.opening_balances.is_some() {
            self.ensure_opening_editable()?;
        }
        if patch.passive_balance.is_some() {
            policy.ensure_editable(self, now)?;
        }
        Ok(())
    }

    /// Validate a caller-supplied patch and return the write to store.
    ///
    /// The closing balance is written only by the day close, and the passive
    /// edit time is always stamped with `now` whenever the passive balance
    /// changes.
    pub fn prepare_patch(
        &self,
        patch: &SnapshotPatch,
        policy: &PassiveLockPolicy,
        now: DateTime<Utc>,
    ) -> DomainResult<SnapshotPatch> {
        if patch.closing_balance.is_some() {
            return Err(DomainError::locked("the closing balance is set by closing the day"));
        }
        if patch.passive_balance_last_updated.is_some() {
            return Err(DomainError::validation(
                "passiveBalanceLastUpdated is stamped by the ledger",
            ));
        }
        self.ensure_patch_allowed(patch, policy, now)?;

        let mut write = patch.clone();
        if write.passive_balance.is_some() {
            write.passive_balance_last_updated = Some(now);
        }
        Ok(write)
    }

    /// Merge a partial update (no guards; see [`Self::prepare_patch`]).
    pub fn merge(&mut self, patch: &SnapshotPatch) {
        if let Some(opening) = &patch.opening_balances {
            self.opening_balances.merge(opening);
        }
        if let Some(actual) = &patch.actual_balances {
            self.actual_balances.merge(actual);
        }
        if let Some(passive) = patch.passive_balance {
            self.passive_balance = passive;
        }
        if let Some(stamp) = patch.passive_balance_last_updated {
            self.passive_balance_last_updated = Some(stamp);
        }
        if let Some(closing) = patch.closing_balance {
            self.closing_balance = Some(closing);
        }
        if let Some(notes) = &patch.reconciliation_notes {
            self.reconciliation_notes = notes.clone();
        }
        if let Some(flag) = patch.is_passive_unlock_override {
            self.is_passive_unlock_override = flag;
        }
    }
}

/// Partial snapshot write (`mergeLiquiditySnapshot(date, partial)`).
///
/// Absent fields are left alone; balance maps merge channel by channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_balances: Option<ChannelBalances>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_balances: Option<ChannelBalances>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passive_balance: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passive_balance_last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_balance: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciliation_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_passive_unlock_override: Option<bool>,
}

impl SnapshotPatch {
    pub fn opening(channel: Channel, amount: Money) -> Self {
        Self {
            opening_balances: Some(ChannelBalances::single(channel, amount)),
            ..Self::default()
        }
    }

    pub fn actual(channel: Channel, amount: Money) -> Self {
        Self {
            actual_balances: Some(ChannelBalances::single(channel, amount)),
            ..Self::default()
        }
    }

    pub fn passive(amount: Money) -> Self {
        Self {
            passive_balance: Some(amount),
            ..Self::default()
        }
    }

    pub fn unlock_override(enabled: bool) -> Self {
        Self {
            is_passive_unlock_override: Some(enabled),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Liquidity snapshots keyed by date, with get-or-default reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotBook(BTreeMap<NaiveDate, LiquiditySnapshot>);

impl SnapshotBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored snapshot, or a zeroed one for a date never written.
    pub fn get_or_default(&self, date: NaiveDate) -> LiquiditySnapshot {
        self.0.get(&date).cloned().unwrap_or_default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains_key(&date)
    }

    /// Merge into `date`, creating the snapshot lazily.
    pub fn merge(&mut self, date: NaiveDate, patch: &SnapshotPatch) -> &LiquiditySnapshot {
        let snapshot = self.0.entry(date).or_default();
        snapshot.merge(patch);
        snapshot
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.keys().copied()
    }
}
