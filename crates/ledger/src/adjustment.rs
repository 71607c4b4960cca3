//! Self-balancing adjustment entries.
//!
//! At most one adjustment row exists per `(date, channel)`. A correction is
//! merged into the existing row; a row whose signed total falls below one
//! cent is retired instead of being left at zero.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use floatbook_core::{Money, TransactionId};

use crate::channel::Channel;
use crate::transaction::{Transaction, TransactionCategory, TransactionKind, TransactionSubject};

pub const DEFAULT_ADJUSTMENT_NOTE: &str = "Reconciliation Adjustment";
pub const ADJUSTMENT_PERFORMER: &str = "System";

/// A correction to apply to a channel on `date`.
///
/// `signed_delta` follows the ledger polarity: positive moves the channel's
/// expected balance up (a `return`), negative moves it down (an `issue`).
/// Passing a channel's reconciliation `diff` drives that diff to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentRequest {
    pub channel: Channel,
    pub signed_delta: Money,
    pub date: NaiveDate,
    pub now: DateTime<Utc>,
    pub note: String,
}

impl AdjustmentRequest {
    pub fn new(channel: Channel, signed_delta: Money, date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            channel,
            signed_delta,
            date,
            now,
            note: DEFAULT_ADJUSTMENT_NOTE.to_string(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// What the store must do to apply an adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "transaction", rename_all = "camelCase")]
pub enum AdjustmentOutcome {
    /// Delta below one cent; nothing to write.
    NoOp,
    Created(Transaction),
    Updated(Transaction),
    /// The merged total cancelled out; delete this row.
    Retired(TransactionId),
}

/// Decide how to fold `request` into the ledger.
pub fn plan_adjustment(
    transactions: &[Transaction],
    request: &AdjustmentRequest,
) -> AdjustmentOutcome {
    if request.signed_delta.is_negligible() {
        return AdjustmentOutcome::NoOp;
    }

    let existing = transactions
        .iter()
        .find(|t| t.is_adjustment_for(request.date, request.channel));

    match existing {
        Some(current) => {
            let merged = current.signed_amount() + request.signed_delta;
            if merged.is_negligible() {
                return AdjustmentOutcome::Retired(current.id.clone());
            }
            let mut updated = current.clone();
            updated.kind = kind_for(merged);
            updated.amount = merged.abs();
            updated.timestamp = request.now;
            AdjustmentOutcome::Updated(updated)
        }
        None => AdjustmentOutcome::Created(Transaction {
            id: TransactionId::new(),
            subject: TransactionSubject::SystemAdjustment,
            kind: kind_for(request.signed_delta),
            category: TransactionCategory::Adjustment,
            amount: request.signed_delta.abs(),
            method: request.channel.into(),
            date: request.date,
            timestamp: request.now,
            note: request.note.clone(),
            performed_by: ADJUSTMENT_PERFORMER.to_string(),
        }),
    }
}

fn kind_for(signed: Money) -> TransactionKind {
    if signed.is_positive() {
        TransactionKind::Return
    } else {
        TransactionKind::Issue
    }
}

/// Apply an outcome to an in-memory log (used by stores without native merge).
pub fn apply_outcome(transactions: &mut Vec<Transaction>, outcome: &AdjustmentOutcome) {
    match outcome {
        AdjustmentOutcome::NoOp => {}
        AdjustmentOutcome::Created(tx) => transactions.push(tx.clone()),
        AdjustmentOutcome::Updated(tx) => {
            if let Some(slot) = transactions.iter_mut().find(|t| t.id == tx.id) {
                *slot = tx.clone();
            }
        }
        AdjustmentOutcome::Retired(id) => transactions.retain(|t| &t.id != id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balances::compute_agent_balances;
    use crate::channel::ChannelBalances;
    use crate::reconcile::reconcile;
    use crate::snapshot::LiquiditySnapshot;
    use crate::stats::compute_daily_stats;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 18, 0, 0).unwrap()
    }

    fn request(channel: Channel, minor: i64) -> AdjustmentRequest {
        AdjustmentRequest::new(channel, Money::from_minor(minor), today(), now())
    }

    fn adjustments(log: &[Transaction]) -> Vec<&Transaction> {
        log.iter().filter(|t| t.category == TransactionCategory::Adjustment).collect()
    }

    fn diff_after(log: &[Transaction], snapshot: &LiquiditySnapshot, channel: Channel) -> Money {
        let balances = compute_agent_balances(&[], log, today());
        let stats = compute_daily_stats(&balances, log, today());
        reconcile(snapshot, &stats).diff(channel)
    }

    #[test]
    fn negative_delta_creates_issue_row() {
        let outcome = plan_adjustment(&[], &request(Channel::Cash, -5_000));
        let AdjustmentOutcome::Created(tx) = outcome else {
            panic!("expected a new adjustment row");
        };
        assert_eq!(tx.kind, TransactionKind::Issue);
        assert_eq!(tx.amount, Money::from_major_units(50));
        assert_eq!(tx.subject, TransactionSubject::SystemAdjustment);
        assert_eq!(tx.note, DEFAULT_ADJUSTMENT_NOTE);
    }

    #[test]
    fn sub_cent_delta_is_noop() {
        assert_eq!(plan_adjustment(&[], &request(Channel::Cash, 0)), AdjustmentOutcome::NoOp);
    }

    #[test]
    fn surplus_is_reconciled_by_its_own_diff() {
        // opening 200, issues 500, returns 300 => expected 0; counted 50.
        let snapshot = LiquiditySnapshot {
            opening_balances: ChannelBalances::single(Channel::Cash, Money::from_major_units(200)),
            actual_balances: ChannelBalances::single(Channel::Cash, Money::from_major_units(50)),
            ..LiquiditySnapshot::default()
        };
        let agent = floatbook_core::AgentId::new();
        let mut log = Vec::new();
        for (kind, category, amount) in [
            (TransactionKind::Issue, TransactionCategory::Issue, 500),
            (TransactionKind::Return, TransactionCategory::Payment, 300),
        ] {
            log.push(Transaction {
                id: TransactionId::new(),
                subject: TransactionSubject::Agent(agent.clone()),
                kind,
                category,
                amount: Money::from_major_units(amount),
                method: Channel::Cash.into(),
                date: today(),
                timestamp: now(),
                note: String::new(),
                performed_by: String::new(),
            });
        }

        let diff = diff_after(&log, &snapshot, Channel::Cash);
        assert_eq!(diff, Money::from_major_units(50));

        let outcome = plan_adjustment(&log, &request(Channel::Cash, diff.minor_units()));
        apply_outcome(&mut log, &outcome);

        let rows = adjustments(&log);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, TransactionKind::Return);
        assert_eq!(diff_after(&log, &snapshot, Channel::Cash), Money::ZERO);
    }

    #[test]
    fn opposite_corrections_retire_the_row() {
        let mut log = Vec::new();
        let first = plan_adjustment(&log, &request(Channel::Wave, 5_000));
        apply_outcome(&mut log, &first);
        assert_eq!(adjustments(&log).len(), 1);

        let outcome = plan_adjustment(&log, &request(Channel::Wave, -5_000));
        assert!(matches!(outcome, AdjustmentOutcome::Retired(_)));
        apply_outcome(&mut log, &outcome);
        assert!(adjustments(&log).is_empty());
    }

    #[test]
    fn merge_flips_polarity_and_refreshes_timestamp() {
        let mut log = Vec::new();
        let first = plan_adjustment(&log, &request(Channel::Bank, 1_000));
        apply_outcome(&mut log, &first);

        let later = now() + chrono::Duration::minutes(5);
        let flip = AdjustmentRequest::new(Channel::Bank, Money::from_minor(-3_000), today(), later);
        let AdjustmentOutcome::Updated(tx) = plan_adjustment(&log, &flip) else {
            panic!("expected the row to be merged");
        };
        assert_eq!(tx.kind, TransactionKind::Issue);
        assert_eq!(tx.amount, Money::from_major_units(20));
        assert_eq!(tx.timestamp, later);
    }

    #[test]
    fn other_days_and_channels_are_not_merged() {
        let mut log = Vec::new();
        let first = plan_adjustment(&log, &request(Channel::Cash, 1_000));
        apply_outcome(&mut log, &first);

        let yesterday = AdjustmentRequest::new(
            Channel::Cash,
            Money::from_minor(1_000),
            today().pred_opt().unwrap(),
            now(),
        );
        assert!(matches!(plan_adjustment(&log, &yesterday), AdjustmentOutcome::Created(_)));
        assert!(matches!(
            plan_adjustment(&log, &request(Channel::Orange, 1_000)),
            AdjustmentOutcome::Created(_)
        ));
    }

    proptest! {
        /// Property: however many corrections land on one channel, at most one
        /// adjustment row exists and its signed amount equals their sum.
        #[test]
        fn one_row_per_channel_per_day(
            deltas in prop::collection::vec(-100_000i64..100_000, 1..20),
        ) {
            let mut log = Vec::new();
            for d in &deltas {
                let outcome = plan_adjustment(&log, &request(Channel::Aps, *d));
                apply_outcome(&mut log, &outcome);
            }
            let rows = adjustments(&log);
            prop_assert!(rows.len() <= 1);

            let signed: Money = rows.iter().map(|t| t.signed_amount()).sum();
            prop_assert_eq!(signed.minor_units(), deltas.iter().sum::<i64>());
        }
    }
}
