//! Float ledger & reconciliation engine.
//!
//! Pure domain logic only: no IO, no persistence, no clocks. Every function
//! takes the entity lists it needs and returns computed values or an
//! explicit write plan for the store adapter to apply.
//!
//! - [`balances`]: per-agent outstanding balances as of a date
//! - [`stats`]: same-day global and per-channel movement
//! - [`reconcile`]: opening / expected / actual / discrepancy per channel
//! - [`adjustment`]: one self-balancing system entry per channel and day
//! - [`day_close`]: closing figures and next-day carry-forward
//! - [`passive`]: time-gated passive balance edits

pub mod adjustment;
pub mod agent;
pub mod balances;
pub mod channel;
pub mod day_close;
pub mod passive;
pub mod reconcile;
pub mod snapshot;
pub mod stats;
pub mod transaction;

pub use adjustment::{AdjustmentOutcome, AdjustmentRequest, apply_outcome, plan_adjustment};
pub use agent::Agent;
pub use balances::{AgentBalance, AgentBalances, BalanceStatus, compute_agent_balances};
pub use channel::{Channel, ChannelBalances, PaymentMethod};
pub use day_close::{DayClosePlan, DayState, plan_day_close};
pub use passive::PassiveLockPolicy;
pub use reconcile::{
    ChannelReconciliation, ChannelRow, ReconciliationTotals, ensure_close_allowed, reconcile,
};
pub use snapshot::{LiquiditySnapshot, SnapshotBook, SnapshotPatch};
pub use stats::{ChannelFlow, DailyStats, compute_daily_stats};
pub use transaction::{
    NewTransaction, Transaction, TransactionCategory, TransactionEdit, TransactionKind,
    TransactionSubject, SYSTEM_SUBJECT,
};
