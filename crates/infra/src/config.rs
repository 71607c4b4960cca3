//! Configuration loading and representation.
//!
//! Read from environment variables with dev-friendly defaults:
//!
//! | variable | default |
//! |---|---|
//! | `FLOATBOOK_UTC_OFFSET_MINUTES` | `0` |
//! | `FLOATBOOK_PASSIVE_LOCK_DAYS` | `30` |
//! | `FLOATBOOK_REPORT_NAME` | `Float Cashbook` |

use chrono::{FixedOffset, Offset, Utc};
use thiserror::Error;

use floatbook_ledger::PassiveLockPolicy;
use floatbook_ledger::passive::DEFAULT_PASSIVE_LOCK_DAYS;

use crate::clock::SystemClock;

pub const ENV_UTC_OFFSET_MINUTES: &str = "FLOATBOOK_UTC_OFFSET_MINUTES";
pub const ENV_PASSIVE_LOCK_DAYS: &str = "FLOATBOOK_PASSIVE_LOCK_DAYS";
pub const ENV_REPORT_NAME: &str = "FLOATBOOK_REPORT_NAME";

pub const DEFAULT_REPORT_NAME: &str = "Float Cashbook";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid integer: {value}")]
    NotAnInteger { var: &'static str, value: String },

    #[error("{var} is out of range: {value}")]
    OutOfRange { var: &'static str, value: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatBookConfig {
    /// Offset used to turn the wall clock into the business-local date.
    pub utc_offset: FixedOffset,
    pub passive_lock: PassiveLockPolicy,
    /// Title printed on reports; carried for the presentation layer.
    pub report_name: String,
}

impl Default for FloatBookConfig {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
            passive_lock: PassiveLockPolicy::default(),
            report_name: DEFAULT_REPORT_NAME.to_string(),
        }
    }
}

impl FloatBookConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (tests pass a map instead of the process env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(minutes) = parse_int(&lookup, ENV_UTC_OFFSET_MINUTES)? {
            config.utc_offset = minutes
                .checked_mul(60)
                .and_then(|secs| i32::try_from(secs).ok())
                .and_then(FixedOffset::east_opt)
                .ok_or(ConfigError::OutOfRange {
                    var: ENV_UTC_OFFSET_MINUTES,
                    value: minutes,
                })?;
        }

        if let Some(days) = parse_int(&lookup, ENV_PASSIVE_LOCK_DAYS)? {
            if !(0..=3_650).contains(&days) {
                return Err(ConfigError::OutOfRange {
                    var: ENV_PASSIVE_LOCK_DAYS,
                    value: days,
                });
            }
            config.passive_lock = PassiveLockPolicy::new(days);
        }

        match lookup(ENV_REPORT_NAME) {
            Some(name) if !name.trim().is_empty() => config.report_name = name.trim().to_string(),
            _ => {}
        }

        if config.passive_lock.lock_days != DEFAULT_PASSIVE_LOCK_DAYS {
            tracing::info!(
                lock_days = config.passive_lock.lock_days,
                "passive balance lock window overridden"
            );
        }

        Ok(config)
    }

    pub fn clock(&self) -> SystemClock {
        SystemClock::new(self.utc_offset)
    }
}

fn parse_int<F>(lookup: &F, var: &'static str) -> Result<Option<i64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ConfigError::NotAnInteger { var, value: raw }),
    }
}
