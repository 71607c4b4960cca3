//! Infrastructure layer: stores, clock, config and the float book service.

pub mod clock;
pub mod config;
pub mod service;
pub mod store;


pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, FloatBookConfig};
pub use service::{DayCloseOutcome, FloatBook, FloatBookError, FloatBookResult, LedgerView};
pub use store::{InMemoryLedgerStore, LedgerDocument, LedgerStore, StoreError};
