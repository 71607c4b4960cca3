//! Channel reconciliation: opening vs. expected vs. counted balances.
//!
//! Reading never mutates anything; writes to the snapshot go through
//! [`SnapshotPatch`](crate::snapshot::SnapshotPatch) and its guards.

use serde::{Deserialize, Serialize};

use floatbook_core::{DomainError, DomainResult, Money};

use crate::channel::Channel;
use crate::snapshot::LiquiditySnapshot;
use crate::stats::DailyStats;

/// One row of the reconciliation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRow {
    pub channel: Channel,
    pub opening: Money,
    pub inflow: Money,
    pub outflow: Money,
    pub net_today: Money,
    /// `opening + net_today`
    pub expected: Money,
    /// Stored counted balance (zero when never entered).
    pub actual: Money,
    /// `actual`, or `expected` when nothing was counted yet. Display only.
    pub display_actual: Money,
    /// `actual - expected`
    pub diff: Money,
}

impl ChannelRow {
    pub fn is_reconciled(&self) -> bool {
        self.diff.is_negligible()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationTotals {
    pub opening_total: Money,
    pub net_today: Money,
    pub expected_closing_total: Money,
    /// Σ actual balances.
    pub active_balance: Money,
    /// `active_balance - expected_closing_total`
    pub overall_discrepancy: Money,
    pub total_outstanding: Money,
    /// Cash the business controls plus what agents still owe.
    pub total_operational_liquidity: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelReconciliation {
    pub rows: Vec<ChannelRow>,
    pub totals: ReconciliationTotals,
}

impl ChannelReconciliation {
    pub fn row(&self, channel: Channel) -> Option<&ChannelRow> {
        self.rows.iter().find(|r| r.channel == channel)
    }

    pub fn diff(&self, channel: Channel) -> Money {
        self.row(channel).map(|r| r.diff).unwrap_or(Money::ZERO)
    }

    pub fn unreconciled(&self) -> impl Iterator<Item = &ChannelRow> {
        self.rows.iter().filter(|r| !r.is_reconciled())
    }

    pub fn is_balanced(&self) -> bool {
        self.unreconciled().next().is_none()
    }
}

/// Build the reconciliation table for the snapshot's day.
pub fn reconcile(snapshot: &LiquiditySnapshot, stats: &DailyStats) -> ChannelReconciliation {
    let rows: Vec<ChannelRow> = Channel::ALL
        .into_iter()
        .map(|channel| {
            let opening = snapshot.opening_balances.get(channel);
            let flow = stats.channel(channel);
            let net_today = flow.net();
            let expected = opening + net_today;
            let actual = snapshot.actual_balances.get(channel);
            let display_actual = if actual.is_zero() { expected } else { actual };

            ChannelRow {
                channel,
                opening,
                inflow: flow.inflow,
                outflow: flow.outflow,
                net_today,
                expected,
                actual,
                display_actual,
                diff: actual - expected,
            }
        })
        .collect();

    let opening_total: Money = rows.iter().map(|r| r.opening).sum();
    let net_today: Money = rows.iter().map(|r| r.net_today).sum();
    let expected_closing_total: Money = rows.iter().map(|r| r.expected).sum();
    let active_balance = snapshot.active_balance();

    ChannelReconciliation {
        rows,
        totals: ReconciliationTotals {
            opening_total,
            net_today,
            expected_closing_total,
            active_balance,
            overall_discrepancy: active_balance - expected_closing_total,
            total_outstanding: stats.total_outstanding,
            total_operational_liquidity: active_balance + stats.total_outstanding,
        },
    }
}

/// Boundary policy for day close: an unreconciled channel needs an explanation.
///
/// The day-close planner itself never refuses; callers run this first.
pub fn ensure_close_allowed(
    reconciliation: &ChannelReconciliation,
    notes: &str,
) -> DomainResult<()> {
    if !notes.trim().is_empty() {
        return Ok(());
    }
    let open: Vec<&str> = reconciliation.unreconciled().map(|r| r.channel.id()).collect();
    if open.is_empty() {
        return Ok(());
    }
    Err(DomainError::validation(format!(
        "unreconciled channels need an explanation before closing: {}",
        open.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balances::AgentBalances;
    use crate::channel::ChannelBalances;
    use crate::stats::ChannelFlow;
    use chrono::NaiveDate;

    fn stats_with(channel: Channel, inflow: i64, outflow: i64) -> DailyStats {
        let mut stats = crate::stats::compute_daily_stats(
            &AgentBalances::default(),
            &[],
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
        );
        stats.channel_stats.insert(
            channel,
            ChannelFlow {
                inflow: Money::from_major_units(inflow),
                outflow: Money::from_major_units(outflow),
            },
        );
        stats.returned_today = Money::from_major_units(inflow);
        stats.issued_today = Money::from_major_units(outflow);
        stats
    }

    #[test]
    fn cash_scenario_reports_surplus() {
        let snapshot = LiquiditySnapshot {
            opening_balances: ChannelBalances::single(Channel::Cash, Money::from_major_units(200)),
            actual_balances: ChannelBalances::single(Channel::Cash, Money::from_major_units(50)),
            ..LiquiditySnapshot::default()
        };
        let stats = stats_with(Channel::Cash, 300, 500);

        let rec = reconcile(&snapshot, &stats);
        let cash = rec.row(Channel::Cash).unwrap();

        assert_eq!(cash.net_today, Money::from_major_units(-200));
        assert_eq!(cash.expected, Money::ZERO);
        assert_eq!(cash.diff, Money::from_major_units(50));
        assert!(!rec.is_balanced());
        assert_eq!(rec.totals.overall_discrepancy, Money::from_major_units(50));
        assert_eq!(rec.totals.net_today, stats.net_today());
    }

    #[test]
    fn uncounted_channel_displays_expected_but_keeps_stored_zero() {
        let snapshot = LiquiditySnapshot {
            opening_balances: ChannelBalances::single(Channel::Bank, Money::from_major_units(80)),
            ..LiquiditySnapshot::default()
        };
        let stats = stats_with(Channel::Bank, 20, 0);

        let rec = reconcile(&snapshot, &stats);
        let bank = rec.row(Channel::Bank).unwrap();

        assert_eq!(bank.display_actual, Money::from_major_units(100));
        assert_eq!(bank.actual, Money::ZERO);
        assert_eq!(bank.diff, Money::from_major_units(-100));
        assert_eq!(snapshot.actual_balances.get(Channel::Bank), Money::ZERO);
    }

    #[test]
    fn totals_are_channel_sums() {
        let snapshot = LiquiditySnapshot {
            opening_balances: [
                (Channel::Cash, Money::from_major_units(100)),
                (Channel::Wave, Money::from_major_units(40)),
            ]
            .into_iter()
            .collect(),
            actual_balances: [
                (Channel::Cash, Money::from_major_units(90)),
                (Channel::Wave, Money::from_major_units(40)),
            ]
            .into_iter()
            .collect(),
            ..LiquiditySnapshot::default()
        };
        let mut stats = stats_with(Channel::Cash, 0, 10);
        stats.total_outstanding = Money::from_major_units(500);

        let rec = reconcile(&snapshot, &stats);

        assert_eq!(rec.totals.opening_total, Money::from_major_units(140));
        assert_eq!(rec.totals.expected_closing_total, Money::from_major_units(130));
        assert_eq!(rec.totals.active_balance, Money::from_major_units(130));
        assert_eq!(rec.totals.overall_discrepancy, Money::ZERO);
        assert_eq!(rec.totals.total_operational_liquidity, Money::from_major_units(630));
        assert!(rec.is_balanced());
    }

    #[test]
    fn close_guard_requires_notes_only_when_unbalanced() {
        let snapshot = LiquiditySnapshot {
            actual_balances: ChannelBalances::single(Channel::Cash, Money::from_minor(1)),
            ..LiquiditySnapshot::default()
        };
        let unbalanced = reconcile(&snapshot, &stats_with(Channel::Cash, 0, 0));
        assert!(ensure_close_allowed(&unbalanced, "  ").is_err());
        assert!(ensure_close_allowed(&unbalanced, "till short by a coin").is_ok());

        let balanced = reconcile(&LiquiditySnapshot::default(), &stats_with(Channel::Cash, 0, 0));
        assert!(ensure_close_allowed(&balanced, "").is_ok());
    }
}
