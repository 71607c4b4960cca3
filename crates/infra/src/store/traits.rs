use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use floatbook_core::{BusinessId, TransactionId};
use floatbook_ledger::{Agent, LiquiditySnapshot, SnapshotPatch, Transaction};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not serve the request (poisoned lock, lost connection).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("record not found: {0}")]
    NotFound(String),

    /// A document could not be (de)serialized.
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Entity store boundary, scoped per business.
///
/// The ledger engine reads whole lists and writes single records; the store
/// decides how those are persisted. Each method is expected to be atomic on
/// its own; read-modify-write sequences are serialized by the caller.
pub trait LedgerStore: Send + Sync {
    fn list_agents(&self, business_id: BusinessId) -> Result<Vec<Agent>, StoreError>;

    fn put_agent(&self, business_id: BusinessId, agent: Agent) -> Result<(), StoreError>;

    fn list_transactions(&self, business_id: BusinessId) -> Result<Vec<Transaction>, StoreError>;

    /// Insert or replace by id.
    fn put_transaction(
        &self,
        business_id: BusinessId,
        transaction: Transaction,
    ) -> Result<(), StoreError>;

    fn delete_transaction(
        &self,
        business_id: BusinessId,
        id: TransactionId,
    ) -> Result<(), StoreError>;

    /// The snapshot for `date`, zeroed if never written.
    fn get_liquidity_snapshot(
        &self,
        business_id: BusinessId,
        date: NaiveDate,
    ) -> Result<LiquiditySnapshot, StoreError>;

    /// Merge a partial write into `date`, creating the snapshot lazily.
    fn merge_liquidity_snapshot(
        &self,
        business_id: BusinessId,
        date: NaiveDate,
        patch: &SnapshotPatch,
    ) -> Result<LiquiditySnapshot, StoreError>;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn list_agents(&self, business_id: BusinessId) -> Result<Vec<Agent>, StoreError> {
        (**self).list_agents(business_id)
    }

    fn put_agent(&self, business_id: BusinessId, agent: Agent) -> Result<(), StoreError> {
        (**self).put_agent(business_id, agent)
    }

    fn list_transactions(&self, business_id: BusinessId) -> Result<Vec<Transaction>, StoreError> {
        (**self).list_transactions(business_id)
    }

    fn put_transaction(
        &self,
        business_id: BusinessId,
        transaction: Transaction,
    ) -> Result<(), StoreError> {
        (**self).put_transaction(business_id, transaction)
    }

    fn delete_transaction(
        &self,
        business_id: BusinessId,
        id: TransactionId,
    ) -> Result<(), StoreError> {
        (**self).delete_transaction(business_id, id)
    }

    fn get_liquidity_snapshot(
        &self,
        business_id: BusinessId,
        date: NaiveDate,
    ) -> Result<LiquiditySnapshot, StoreError> {
        (**self).get_liquidity_snapshot(business_id, date)
    }

    fn merge_liquidity_snapshot(
        &self,
        business_id: BusinessId,
        date: NaiveDate,
        patch: &SnapshotPatch,
    ) -> Result<LiquiditySnapshot, StoreError> {
        (**self).merge_liquidity_snapshot(business_id, date, patch)
    }
}
