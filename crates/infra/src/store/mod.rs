//! Entity store boundary: agents, transactions and liquidity snapshots.

pub mod in_memory;
pub mod traits;

pub use in_memory::{InMemoryLedgerStore, LedgerDocument};
pub use traits::{LedgerStore, StoreError};
