//! Per-agent outstanding balances as of a reference date.
//!
//! Recomputed from the full transaction log on every call; there are no
//! running counters to drift.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use floatbook_core::{AgentId, Money, ValueObject};

use crate::agent::Agent;
use crate::transaction::{Transaction, TransactionKind, TransactionSubject};

/// Balance of one agent relative to a reference date `D`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentBalance {
    /// Issues minus returns dated strictly before `D`.
    pub prev_debt: Money,
    pub issued_today: Money,
    pub returned_today: Money,
    /// `prev_debt + issued_today - returned_today`; negative means credit.
    pub total_due: Money,
}

impl ValueObject for AgentBalance {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BalanceStatus {
    Cleared,
    Owing,
    InCredit,
}

impl AgentBalance {
    pub fn status(&self) -> BalanceStatus {
        if self.total_due.is_zero() {
            BalanceStatus::Cleared
        } else if self.total_due.is_positive() {
            BalanceStatus::Owing
        } else {
            BalanceStatus::InCredit
        }
    }
}

/// `agentId -> balance` for every known agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentBalances(BTreeMap<AgentId, AgentBalance>);

impl AgentBalances {
    pub fn get(&self, agent_id: &AgentId) -> Option<&AgentBalance> {
        self.0.get(agent_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AgentId, &AgentBalance)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Σ total due across agents (prior uncollected debt included).
    pub fn total_outstanding(&self) -> Money {
        self.0.values().map(|b| b.total_due).sum()
    }
}

/// Reduce the log into per-agent balances as of `as_of`.
///
/// - same-day rows feed `issued_today` / `returned_today`
/// - earlier rows feed `prev_debt`
/// - later rows are ignored, so a past report date never sees future activity
/// - rows for unknown agents and system adjustments are skipped
pub fn compute_agent_balances(
    agents: &[Agent],
    transactions: &[Transaction],
    as_of: NaiveDate,
) -> AgentBalances {
    let mut balances: BTreeMap<AgentId, AgentBalance> = agents
        .iter()
        .map(|a| (a.id.clone(), AgentBalance::default()))
        .collect();

    for tx in transactions {
        let agent_id = match &tx.subject {
            TransactionSubject::Agent(id) => id,
            TransactionSubject::SystemAdjustment => continue,
        };
        let Some(balance) = balances.get_mut(agent_id) else {
            continue;
        };

        if tx.date == as_of {
            match tx.kind {
                TransactionKind::Issue => balance.issued_today += tx.amount,
                TransactionKind::Return => balance.returned_today += tx.amount,
            }
        } else if tx.date < as_of {
            match tx.kind {
                TransactionKind::Issue => balance.prev_debt += tx.amount,
                TransactionKind::Return => balance.prev_debt -= tx.amount,
            }
        }
    }

    for balance in balances.values_mut() {
        balance.total_due = balance.prev_debt + balance.issued_today - balance.returned_today;
    }

    AgentBalances(balances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use crate::stats::compute_daily_stats;
    use crate::transaction::TransactionCategory;
    use chrono::{TimeZone, Utc};
    use floatbook_core::TransactionId;
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn tx(
        subject: &TransactionSubject,
        kind: TransactionKind,
        amount: i64,
        date: NaiveDate,
    ) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            subject: subject.clone(),
            kind,
            category: match kind {
                TransactionKind::Issue => TransactionCategory::Issue,
                TransactionKind::Return => TransactionCategory::Payment,
            },
            amount: Money::from_major_units(amount),
            method: Channel::Cash.into(),
            date,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            note: String::new(),
            performed_by: String::new(),
        }
    }

    fn modou() -> Agent {
        Agent::register("Modou", "Serrekunda Market", "3344556").unwrap()
    }

    fn subject(agent: &Agent) -> TransactionSubject {
        TransactionSubject::Agent(agent.id.clone())
    }

    #[test]
    fn prior_debt_plus_today_movement() {
        let agent = modou();
        let who = subject(&agent);
        let log = vec![
            tx(&who, TransactionKind::Issue, 1000, day(1)),
            tx(&who, TransactionKind::Issue, 500, day(2)),
            tx(&who, TransactionKind::Return, 300, day(2)),
        ];

        let balances = compute_agent_balances(&[agent.clone()], &log, day(2));
        let b = balances.get(&agent.id).unwrap();

        assert_eq!(b.prev_debt, Money::from_major_units(1000));
        assert_eq!(b.issued_today, Money::from_major_units(500));
        assert_eq!(b.returned_today, Money::from_major_units(300));
        assert_eq!(b.total_due, Money::from_major_units(1200));
        assert_eq!(b.status(), BalanceStatus::Owing);
    }

    #[test]
    fn agent_without_activity_is_all_zero() {
        let agent = modou();
        let balances = compute_agent_balances(&[agent.clone()], &[], day(2));
        assert_eq!(balances.get(&agent.id), Some(&AgentBalance::default()));
        assert_eq!(balances.get(&agent.id).unwrap().status(), BalanceStatus::Cleared);
    }

    #[test]
    fn future_rows_do_not_leak_into_past_report() {
        let agent = modou();
        let who = subject(&agent);
        let log = vec![
            tx(&who, TransactionKind::Issue, 100, day(1)),
            tx(&who, TransactionKind::Issue, 900, day(5)),
        ];

        let balances = compute_agent_balances(&[agent.clone()], &log, day(3));
        assert_eq!(balances.get(&agent.id).unwrap().total_due, Money::from_major_units(100));
    }

    #[test]
    fn overpayment_is_credit_not_clamped() {
        let agent = modou();
        let who = subject(&agent);
        let log = vec![
            tx(&who, TransactionKind::Issue, 100, day(1)),
            tx(&who, TransactionKind::Return, 150, day(2)),
        ];

        let balances = compute_agent_balances(&[agent.clone()], &log, day(2));
        let b = balances.get(&agent.id).unwrap();
        assert_eq!(b.total_due, Money::from_major_units(-50));
        assert_eq!(b.status(), BalanceStatus::InCredit);
    }

    #[test]
    fn system_and_unknown_subjects_are_skipped() {
        let agent = modou();
        let stranger = TransactionSubject::Agent(AgentId::new());
        let log = vec![
            tx(&TransactionSubject::SystemAdjustment, TransactionKind::Return, 50, day(2)),
            tx(&stranger, TransactionKind::Issue, 70, day(2)),
        ];

        let balances = compute_agent_balances(&[agent.clone()], &log, day(2));
        assert_eq!(balances.len(), 1);
        assert_eq!(balances.total_outstanding(), Money::ZERO);
    }

    fn arb_kind() -> impl Strategy<Value = TransactionKind> {
        prop_oneof![Just(TransactionKind::Issue), Just(TransactionKind::Return)]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: for every agent, total due = prev debt + issued - returned,
        /// and the daily stats report the sum of those dues as outstanding.
        #[test]
        fn total_due_identity_holds(
            rows in prop::collection::vec((0usize..3, arb_kind(), 0i64..100_000, 1u32..6), 0..60),
            as_of in 1u32..6,
        ) {
            let agents: Vec<Agent> = (0..3)
                .map(|i| Agent::register(format!("agent-{i}"), "", "").unwrap())
                .collect();
            let log: Vec<Transaction> = rows
                .into_iter()
                .map(|(who, kind, minor, d)| {
                    let mut t = tx(&subject(&agents[who]), kind, 0, day(d));
                    t.amount = Money::from_minor(minor);
                    t
                })
                .collect();

            let balances = compute_agent_balances(&agents, &log, day(as_of));
            let mut sum = Money::ZERO;
            for (_, b) in balances.iter() {
                prop_assert_eq!(b.total_due, b.prev_debt + b.issued_today - b.returned_today);
                sum += b.total_due;
            }

            let stats = compute_daily_stats(&balances, &log, day(as_of));
            prop_assert_eq!(stats.total_outstanding, sum);
        }
    }
}
