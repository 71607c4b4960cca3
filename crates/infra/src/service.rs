//! Float book service: the ledger engine wired to a store and a clock.
//!
//! Reads re-reduce the full log on every call. Writes are read-modify-write
//! sequences against the [`LedgerStore`]:
//!
//! ```text
//! load agents / transactions / snapshot
//!   ↓
//! pure decision (floatbook-ledger): balances, reconciliation, plans, guards
//!   ↓
//! apply the resulting writes to the store
//! ```
//!
//! The service does not isolate concurrent writers; callers serialize
//! mutating calls per business, or the store applies each merge atomically.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use floatbook_core::{BusinessId, DomainError, Money, TransactionId};
use floatbook_ledger::{
    AdjustmentOutcome, AdjustmentRequest, Agent, AgentBalances, Channel, ChannelReconciliation,
    DailyStats, DayState, LiquiditySnapshot, NewTransaction, SnapshotPatch, Transaction,
    TransactionEdit, TransactionSubject, compute_agent_balances, compute_daily_stats,
    ensure_close_allowed, plan_adjustment, plan_day_close, reconcile,
};

use crate::clock::{Clock, SystemClock};
use crate::config::FloatBookConfig;
use crate::store::{LedgerStore, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FloatBookError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FloatBookError {
    /// Rejections the caller can fix and retry (locked fields, bad input).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FloatBookError::Domain(
                DomainError::Locked(_) | DomainError::Validation(_) | DomainError::NotFound
            )
        )
    }
}

pub type FloatBookResult<T> = Result<T, FloatBookError>;

/// Everything the dashboard shows for one date, computed in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerView {
    pub date: NaiveDate,
    pub day_state: DayState,
    pub snapshot: LiquiditySnapshot,
    pub agent_balances: AgentBalances,
    pub stats: DailyStats,
    pub reconciliation: ChannelReconciliation,
    pub passive_locked: bool,
}

/// The pair of snapshots written by a day close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCloseOutcome {
    pub date: NaiveDate,
    pub closed: LiquiditySnapshot,
    pub next_date: NaiveDate,
    pub next: LiquiditySnapshot,
}

#[derive(Debug)]
pub struct FloatBook<S, C = SystemClock> {
    business_id: BusinessId,
    store: S,
    clock: C,
    config: FloatBookConfig,
}

impl<S, C> FloatBook<S, C>
where
    S: LedgerStore,
    C: Clock,
{
    pub fn new(business_id: BusinessId, store: S, clock: C, config: FloatBookConfig) -> Self {
        Self {
            business_id,
            store,
            clock,
            config,
        }
    }

    pub fn business_id(&self) -> BusinessId {
        self.business_id
    }

    pub fn config(&self) -> &FloatBookConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Business-local "today".
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ---- reads -------------------------------------------------------------

    pub fn agents(&self) -> FloatBookResult<Vec<Agent>> {
        Ok(self.store.list_agents(self.business_id)?)
    }

    pub fn transactions(&self) -> FloatBookResult<Vec<Transaction>> {
        Ok(self.store.list_transactions(self.business_id)?)
    }

    /// Rows dated `date`, oldest first.
    pub fn transactions_on(&self, date: NaiveDate) -> FloatBookResult<Vec<Transaction>> {
        let mut rows: Vec<Transaction> = self
            .transactions()?
            .into_iter()
            .filter(|t| t.date == date)
            .collect();
        rows.sort_by_key(|t| t.timestamp);
        Ok(rows)
    }

    pub fn snapshot(&self, date: NaiveDate) -> FloatBookResult<LiquiditySnapshot> {
        Ok(self.store.get_liquidity_snapshot(self.business_id, date)?)
    }

    /// Balances as of `as_of` (today for live figures, any past date for reports).
    pub fn agent_balances(&self, as_of: NaiveDate) -> FloatBookResult<AgentBalances> {
        let agents = self.agents()?;
        let log = self.transactions()?;
        Ok(compute_agent_balances(&agents, &log, as_of))
    }

    pub fn daily_stats(&self, date: NaiveDate) -> FloatBookResult<DailyStats> {
        let agents = self.agents()?;
        let log = self.transactions()?;
        let balances = compute_agent_balances(&agents, &log, date);
        Ok(compute_daily_stats(&balances, &log, date))
    }

    pub fn reconciliation(&self, date: NaiveDate) -> FloatBookResult<ChannelReconciliation> {
        Ok(self.view(date)?.reconciliation)
    }

    pub fn view(&self, date: NaiveDate) -> FloatBookResult<LedgerView> {
        let agents = self.agents()?;
        let log = self.transactions()?;
        let snapshot = self.snapshot(date)?;

        let agent_balances = compute_agent_balances(&agents, &log, date);
        let stats = compute_daily_stats(&agent_balances, &log, date);
        let reconciliation = reconcile(&snapshot, &stats);
        let passive_locked = self.config.passive_lock.is_locked(&snapshot, self.clock.now());

        Ok(LedgerView {
            date,
            day_state: DayState::of(&snapshot),
            snapshot,
            agent_balances,
            stats,
            reconciliation,
            passive_locked,
        })
    }

    pub fn live_view(&self) -> FloatBookResult<LedgerView> {
        self.view(self.today())
    }

    // ---- agents & transactions --------------------------------------------

    pub fn register_agent(
        &self,
        name: &str,
        location: &str,
        phone: &str,
    ) -> FloatBookResult<Agent> {
        let agent = Agent::register(name, location, phone)?;
        self.store.put_agent(self.business_id, agent.clone())?;
        tracing::info!(business_id = %self.business_id, agent_id = %agent.id, "agent registered");
        Ok(agent)
    }

    /// Book an agent transaction on today's date.
    pub fn record_transaction(&self, new: NewTransaction) -> FloatBookResult<Transaction> {
        let known = self.agents()?.iter().any(|a| a.id == new.agent_id);
        if !known {
            return Err(DomainError::NotFound.into());
        }

        let tx = new.into_transaction(TransactionId::new(), self.today(), self.clock.now())?;
        self.store.put_transaction(self.business_id, tx.clone())?;

        tracing::info!(
            business_id = %self.business_id,
            transaction_id = %tx.id,
            kind = ?tx.kind,
            method = %tx.method,
            amount = %tx.amount,
            "transaction recorded"
        );
        Ok(tx)
    }

    /// Change amount, method or note of an agent transaction.
    ///
    /// Adjustment rows are owned by [`Self::create_adjustment`] and refuse edits.
    pub fn edit_transaction(
        &self,
        id: TransactionId,
        edit: &TransactionEdit,
    ) -> FloatBookResult<Transaction> {
        let mut tx = self
            .transactions()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(DomainError::NotFound)?;

        if tx.subject == TransactionSubject::SystemAdjustment {
            return Err(DomainError::validation(
                "adjustment entries are maintained by reconciliation and cannot be edited",
            )
            .into());
        }
        if edit.is_empty() {
            return Ok(tx);
        }

        tx.apply_edit(edit)?;
        self.store.put_transaction(self.business_id, tx.clone())?;
        tracing::info!(
            business_id = %self.business_id,
            transaction_id = %tx.id,
            "transaction edited"
        );
        Ok(tx)
    }

    pub fn delete_transaction(&self, id: TransactionId) -> FloatBookResult<()> {
        self.store.delete_transaction(self.business_id, id.clone())?;
        tracing::info!(
            business_id = %self.business_id,
            transaction_id = %id,
            "transaction deleted"
        );
        Ok(())
    }

    // ---- liquidity snapshot -----------------------------------------------

    /// Guarded partial write to today's snapshot.
    ///
    /// A patch that sets the passive balance is stamped with the clock's
    /// `now`. Patches carrying a closing balance or their own passive edit
    /// time are rejected.
    pub fn update_liquidity(&self, patch: &SnapshotPatch) -> FloatBookResult<LiquiditySnapshot> {
        let today = self.today();
        let current = self.snapshot(today)?;

        let now = self.clock.now();
        let write = match current.prepare_patch(patch, &self.config.passive_lock, now) {
            Ok(write) => write,
            Err(err) => {
                tracing::warn!(
                    business_id = %self.business_id,
                    date = %today,
                    error = %err,
                    "liquidity write rejected"
                );
                return Err(err.into());
            }
        };

        Ok(self
            .store
            .merge_liquidity_snapshot(self.business_id, today, &write)?)
    }

    pub fn set_opening_balance(
        &self,
        channel: Channel,
        amount: Money,
    ) -> FloatBookResult<LiquiditySnapshot> {
        self.update_liquidity(&SnapshotPatch::opening(channel, amount))
    }

    pub fn set_actual_balance(
        &self,
        channel: Channel,
        amount: Money,
    ) -> FloatBookResult<LiquiditySnapshot> {
        self.update_liquidity(&SnapshotPatch::actual(channel, amount))
    }

    pub fn set_passive_balance(&self, amount: Money) -> FloatBookResult<LiquiditySnapshot> {
        let snapshot = self.update_liquidity(&SnapshotPatch::passive(amount))?;
        tracing::info!(
            business_id = %self.business_id,
            amount = %amount,
            "passive balance updated"
        );
        Ok(snapshot)
    }

    /// Flip today's passive unlock override; returns the new value.
    pub fn toggle_passive_unlock_override(&self) -> FloatBookResult<bool> {
        let today = self.today();
        let enabled = !self.snapshot(today)?.is_passive_unlock_override;
        self.store.merge_liquidity_snapshot(
            self.business_id,
            today,
            &SnapshotPatch::unlock_override(enabled),
        )?;
        tracing::info!(
            business_id = %self.business_id,
            date = %today,
            enabled,
            "passive unlock override toggled"
        );
        Ok(enabled)
    }

    // ---- reconciliation ----------------------------------------------------

    /// Fold `signed_delta` into today's adjustment row for `channel`.
    ///
    /// Pass the channel's reconciliation `diff` to bring it to zero.
    pub fn create_adjustment(
        &self,
        channel: Channel,
        signed_delta: Money,
    ) -> FloatBookResult<AdjustmentOutcome> {
        let log = self.transactions()?;
        let request = AdjustmentRequest::new(channel, signed_delta, self.today(), self.clock.now());
        let outcome = plan_adjustment(&log, &request);

        match &outcome {
            AdjustmentOutcome::NoOp => {
                tracing::debug!(
                    business_id = %self.business_id,
                    channel = %channel,
                    "adjustment below one cent ignored"
                );
            }
            AdjustmentOutcome::Created(tx) | AdjustmentOutcome::Updated(tx) => {
                self.store.put_transaction(self.business_id, tx.clone())?;
                tracing::info!(
                    business_id = %self.business_id,
                    channel = %channel,
                    delta = %signed_delta,
                    signed_total = %tx.signed_amount(),
                    "adjustment written"
                );
            }
            AdjustmentOutcome::Retired(id) => {
                self.store.delete_transaction(self.business_id, id.clone())?;
                tracing::info!(
                    business_id = %self.business_id,
                    channel = %channel,
                    "adjustment retired"
                );
            }
        }

        Ok(outcome)
    }

    /// Close today and seed tomorrow's opening balances.
    ///
    /// Unreconciled channels require non-blank `notes`. Re-closing is allowed
    /// and overwrites both writes. A tomorrow that is already closed is never
    /// overwritten.
    pub fn close_day(&self, notes: &str) -> FloatBookResult<DayCloseOutcome> {
        let today = self.today();
        let view = self.view(today)?;

        ensure_close_allowed(&view.reconciliation, notes)?;

        let plan = plan_day_close(&view.snapshot, today, notes)?;
        if self.snapshot(plan.next_date)?.is_closed() {
            return Err(DomainError::locked(format!(
                "{} is already closed; its opening balances cannot be carried over",
                plan.next_date
            ))
            .into());
        }

        if !view.reconciliation.is_balanced() {
            tracing::warn!(
                business_id = %self.business_id,
                date = %today,
                discrepancy = %view.reconciliation.totals.overall_discrepancy,
                "closing day with unreconciled channels"
            );
        }

        let closed = self
            .store
            .merge_liquidity_snapshot(self.business_id, plan.date, &plan.closing)?;
        let next = self
            .store
            .merge_liquidity_snapshot(self.business_id, plan.next_date, &plan.carry_forward)?;

        tracing::info!(
            business_id = %self.business_id,
            date = %today,
            closing_balance = %view.snapshot.active_balance(),
            reclose = view.day_state == DayState::Closed,
            "day closed"
        );

        Ok(DayCloseOutcome {
            date: plan.date,
            closed,
            next_date: plan.next_date,
            next,
        })
    }
}
