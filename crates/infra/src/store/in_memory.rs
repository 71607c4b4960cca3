use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use floatbook_core::{BusinessId, TransactionId};
use floatbook_ledger::{Agent, LiquiditySnapshot, SnapshotBook, SnapshotPatch, Transaction};

use super::traits::{LedgerStore, StoreError};

/// Everything stored for one business, in the document shape the store
/// exports (`agents`, `transactions`, `liquidity` keyed by date).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerDocument {
    pub agents: Vec<Agent>,
    pub transactions: Vec<Transaction>,
    pub liquidity: SnapshotBook,
}

impl LedgerDocument {
    pub fn from_json(input: &str) -> Result<Self, StoreError> {
        serde_json::from_str(input).map_err(|e| StoreError::Malformed(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(self).map_err(|e| StoreError::Malformed(e.to_string()))
    }
}

type Documents = HashMap<BusinessId, LedgerDocument>;

/// In-memory, business-isolated store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    inner: RwLock<Documents>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a business from an exported document, replacing what was there.
    pub fn load(
        &self,
        business_id: BusinessId,
        document: LedgerDocument,
    ) -> Result<(), StoreError> {
        let mut map = self.write()?;
        map.insert(business_id, document);
        Ok(())
    }

    pub fn export(&self, business_id: BusinessId) -> Result<LedgerDocument, StoreError> {
        let map = self.read()?;
        Ok(map.get(&business_id).cloned().unwrap_or_default())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Documents>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Documents>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn list_agents(&self, business_id: BusinessId) -> Result<Vec<Agent>, StoreError> {
        let map = self.read()?;
        Ok(map.get(&business_id).map(|d| d.agents.clone()).unwrap_or_default())
    }

    fn put_agent(&self, business_id: BusinessId, agent: Agent) -> Result<(), StoreError> {
        let mut map = self.write()?;
        let agents = &mut map.entry(business_id).or_default().agents;
        match agents.iter_mut().find(|a| a.id == agent.id) {
            Some(slot) => *slot = agent,
            None => agents.push(agent),
        }
        Ok(())
    }

    fn list_transactions(&self, business_id: BusinessId) -> Result<Vec<Transaction>, StoreError> {
        let map = self.read()?;
        Ok(map
            .get(&business_id)
            .map(|d| d.transactions.clone())
            .unwrap_or_default())
    }

    fn put_transaction(
        &self,
        business_id: BusinessId,
        transaction: Transaction,
    ) -> Result<(), StoreError> {
        let mut map = self.write()?;
        let log = &mut map.entry(business_id).or_default().transactions;
        match log.iter_mut().find(|t| t.id == transaction.id) {
            Some(slot) => *slot = transaction,
            None => log.push(transaction),
        }
        Ok(())
    }

    fn delete_transaction(
        &self,
        business_id: BusinessId,
        id: TransactionId,
    ) -> Result<(), StoreError> {
        let mut map = self.write()?;
        let log = &mut map.entry(business_id).or_default().transactions;
        let before = log.len();
        log.retain(|t| t.id != id);
        if log.len() == before {
            return Err(StoreError::NotFound(format!("transaction {id}")));
        }
        Ok(())
    }

    fn get_liquidity_snapshot(
        &self,
        business_id: BusinessId,
        date: NaiveDate,
    ) -> Result<LiquiditySnapshot, StoreError> {
        let map = self.read()?;
        Ok(map
            .get(&business_id)
            .map(|d| d.liquidity.get_or_default(date))
            .unwrap_or_default())
    }

    fn merge_liquidity_snapshot(
        &self,
        business_id: BusinessId,
        date: NaiveDate,
        patch: &SnapshotPatch,
    ) -> Result<LiquiditySnapshot, StoreError> {
        let mut map = self.write()?;
        let book = &mut map.entry(business_id).or_default().liquidity;
        Ok(book.merge(date, patch).clone())
    }
}
