//! Same-day totals: global issued/returned and per-channel cash flow.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use floatbook_core::Money;

use crate::balances::AgentBalances;
use crate::channel::Channel;
use crate::transaction::{Transaction, TransactionKind};

/// Movement through one channel on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelFlow {
    /// Returns received through the channel.
    #[serde(rename = "in")]
    pub inflow: Money,
    /// Issues paid out through the channel.
    #[serde(rename = "out")]
    pub outflow: Money,
}

impl ChannelFlow {
    pub fn net(&self) -> Money {
        self.inflow - self.outflow
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: NaiveDate,
    pub issued_today: Money,
    pub returned_today: Money,
    pub total_outstanding: Money,
    /// One entry per channel, zeroed when idle.
    pub channel_stats: BTreeMap<Channel, ChannelFlow>,
}

impl DailyStats {
    pub fn channel(&self, channel: Channel) -> ChannelFlow {
        self.channel_stats.get(&channel).copied().unwrap_or_default()
    }

    /// Returns minus issues across every channel.
    pub fn net_today(&self) -> Money {
        self.returned_today - self.issued_today
    }
}

/// Aggregate the rows dated `date`.
///
/// System adjustments count here even though agent balances skip them:
/// they are real channel cash flow. Rows paid through a method outside the
/// channel set count toward the global totals only. `balances` must be computed for the
/// same date; it only contributes the outstanding total.
pub fn compute_daily_stats(
    balances: &AgentBalances,
    transactions: &[Transaction],
    date: NaiveDate,
) -> DailyStats {
    let mut stats = DailyStats {
        date,
        issued_today: Money::ZERO,
        returned_today: Money::ZERO,
        total_outstanding: balances.total_outstanding(),
        channel_stats: Channel::ALL
            .into_iter()
            .map(|c| (c, ChannelFlow::default()))
            .collect(),
    };

    for tx in transactions.iter().filter(|t| t.date == date) {
        let flow = tx
            .method
            .channel()
            .map(|channel| stats.channel_stats.entry(channel).or_default());
        match tx.kind {
            TransactionKind::Issue => {
                stats.issued_today += tx.amount;
                if let Some(flow) = flow {
                    flow.outflow += tx.amount;
                }
            }
            TransactionKind::Return => {
                stats.returned_today += tx.amount;
                if let Some(flow) = flow {
                    flow.inflow += tx.amount;
                }
            }
        }
    }

    stats
}
