use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use floatbook_core::{AgentId, DomainError, DomainResult, Entity, Money, TransactionId};

use crate::channel::{Channel, PaymentMethod};

/// Stored `agentId` value marking a channel-level adjustment.
pub const SYSTEM_SUBJECT: &str = "SYSTEM";

/// Who a transaction is booked against.
///
/// Stored as the plain `agentId` string: an agent id, or `"SYSTEM"` for
/// adjustments that belong to no agent. Any other value is an agent id,
/// even one no registered agent carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TransactionSubject {
    Agent(AgentId),
    SystemAdjustment,
}

impl TransactionSubject {
    pub fn agent_id(&self) -> Option<&AgentId> {
        match self {
            TransactionSubject::Agent(id) => Some(id),
            TransactionSubject::SystemAdjustment => None,
        }
    }
}

impl From<TransactionSubject> for String {
    fn from(value: TransactionSubject) -> Self {
        match value {
            TransactionSubject::Agent(id) => id.to_string(),
            TransactionSubject::SystemAdjustment => SYSTEM_SUBJECT.to_string(),
        }
    }
}

impl From<String> for TransactionSubject {
    fn from(value: String) -> Self {
        if value == SYSTEM_SUBJECT {
            return TransactionSubject::SystemAdjustment;
        }
        TransactionSubject::Agent(AgentId::from(value))
    }
}

/// Direction of the float movement.
///
/// `Issue` leaves the business (channel outflow, agent debt grows);
/// `Return` comes back (channel inflow, agent debt shrinks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Issue,
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionCategory {
    /// Float advanced to an agent.
    Issue,
    /// Loan repayment.
    Payment,
    /// Unused float handed back at end of day.
    Checkout,
    /// Synthetic reconciliation entry (system subject only).
    Adjustment,
}

impl TransactionCategory {
    /// Whether an agent-booked transaction may carry this category.
    pub fn accepts(self, kind: TransactionKind) -> bool {
        matches!(
            (self, kind),
            (TransactionCategory::Issue, TransactionKind::Issue)
                | (TransactionCategory::Payment, TransactionKind::Return)
                | (TransactionCategory::Checkout, TransactionKind::Return)
        )
    }
}

/// One row of the append-only ledger.
///
/// Immutable after creation except `amount`, `method` and `note`
/// (see [`TransactionEdit`]) or full deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "agentId")]
    pub subject: TransactionSubject,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: TransactionCategory,
    pub amount: Money,
    pub method: PaymentMethod,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub performed_by: String,
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Transaction {
    /// `+amount` for returns, `-amount` for issues (the ledger's polarity).
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            TransactionKind::Return => self.amount,
            TransactionKind::Issue => -self.amount,
        }
    }

    pub fn is_adjustment_for(&self, date: NaiveDate, channel: Channel) -> bool {
        self.date == date
            && self.subject == TransactionSubject::SystemAdjustment
            && self.method == channel
            && self.category == TransactionCategory::Adjustment
    }

    /// Apply an explicit edit; untouched fields keep their values.
    pub fn apply_edit(&mut self, edit: &TransactionEdit) -> DomainResult<()> {
        if let Some(amount) = edit.amount {
            if amount.is_negative() {
                return Err(DomainError::validation("amount must not be negative"));
            }
            self.amount = amount;
        }
        if let Some(channel) = edit.channel {
            self.method = channel.into();
        }
        if let Some(note) = &edit.note {
            self.note = note.clone();
        }
        Ok(())
    }
}

/// Fields a caller may change on an existing transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(default, rename = "method", skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TransactionEdit {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.channel.is_none() && self.note.is_none()
    }
}

/// Agent transaction as entered at the boundary, before the ledger stamps
/// its id, date and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub agent_id: AgentId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: TransactionCategory,
    pub amount: Money,
    #[serde(rename = "method")]
    pub channel: Channel,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub performed_by: String,
}

impl NewTransaction {
    pub fn issue(agent_id: AgentId, amount: Money, channel: Channel) -> Self {
        Self {
            agent_id,
            kind: TransactionKind::Issue,
            category: TransactionCategory::Issue,
            amount,
            channel,
            note: String::new(),
            performed_by: String::new(),
        }
    }

    pub fn repayment(agent_id: AgentId, amount: Money, channel: Channel) -> Self {
        Self {
            agent_id,
            kind: TransactionKind::Return,
            category: TransactionCategory::Payment,
            amount,
            channel,
            note: String::new(),
            performed_by: String::new(),
        }
    }

    pub fn checkout(agent_id: AgentId, amount: Money, channel: Channel) -> Self {
        Self {
            category: TransactionCategory::Checkout,
            ..Self::repayment(agent_id, amount, channel)
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn performed_by(mut self, who: impl Into<String>) -> Self {
        self.performed_by = who.into();
        self
    }

    /// Validate and stamp into a ledger row dated `date`.
    pub fn into_transaction(
        self,
        id: TransactionId,
        date: NaiveDate,
        timestamp: DateTime<Utc>,
    ) -> DomainResult<Transaction> {
        if self.amount.is_negative() {
            return Err(DomainError::validation("amount must not be negative"));
        }
        if !self.category.accepts(self.kind) {
            return Err(DomainError::validation(format!(
                "category {:?} does not match transaction type {:?}",
                self.category, self.kind
            )));
        }

        Ok(Transaction {
            id,
            subject: TransactionSubject::Agent(self.agent_id),
            kind: self.kind,
            category: self.category,
            amount: self.amount,
            method: self.channel.into(),
            date,
            timestamp,
            note: self.note,
            performed_by: self.performed_by,
        })
    }
}
