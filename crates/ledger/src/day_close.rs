//! Day close and carry-forward.
//!
//! `Open -> Closed`, and `Closed -> Closed` re-runs the same transition,
//! overwriting the closing figures. Closing never refuses; callers apply
//! [`ensure_close_allowed`](crate::reconcile::ensure_close_allowed) first.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use floatbook_core::{DomainError, DomainResult};

use crate::snapshot::{LiquiditySnapshot, SnapshotPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayState {
    Open,
    Closed,
}

impl DayState {
    pub fn of(snapshot: &LiquiditySnapshot) -> Self {
        if snapshot.is_closed() {
            DayState::Closed
        } else {
            DayState::Open
        }
    }
}

/// The two snapshot writes that close `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayClosePlan {
    pub date: NaiveDate,
    /// Closing balance and notes for `date`.
    pub closing: SnapshotPatch,
    pub next_date: NaiveDate,
    /// Opening balances for the following day, plus the override reset.
    pub carry_forward: SnapshotPatch,
}

/// Plan the close of `date` from its current snapshot.
///
/// The next day's opening balances are the counted balances verbatim, with
/// an explicit entry for every channel, so the next day's opening total is
/// exactly this day's active balance.
pub fn plan_day_close(
    snapshot: &LiquiditySnapshot,
    date: NaiveDate,
    notes: &str,
) -> DomainResult<DayClosePlan> {
    let next_date = date
        .succ_opt()
        .ok_or_else(|| DomainError::invariant(format!("no calendar day after {date}")))?;

    Ok(DayClosePlan {
        date,
        closing: SnapshotPatch {
            closing_balance: Some(snapshot.active_balance()),
            reconciliation_notes: Some(notes.to_string()),
            ..SnapshotPatch::default()
        },
        next_date,
        carry_forward: SnapshotPatch {
            opening_balances: Some(snapshot.actual_balances.to_total()),
            is_passive_unlock_override: Some(false),
            ..SnapshotPatch::default()
        },
    })
}
