use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use floatbook_core::{Money, ValueObject};

/// Liquidity channel: physical cash, the bank account, or a named wallet.
///
/// This is the single definition of the channel set; every aggregate that
/// iterates channels goes through `Channel::ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    Cash,
    Bank,
    Wave,
    Aps,
    Orange,
    Nafa,
    #[serde(alias = "wu")]
    WesternUnion,
}

impl Channel {
    pub const ALL: [Channel; 7] = [
        Channel::Cash,
        Channel::Bank,
        Channel::Wave,
        Channel::Aps,
        Channel::Orange,
        Channel::Nafa,
        Channel::WesternUnion,
    ];

    /// Stored id (`"cash"`, `"westernUnion"`, ...).
    pub fn id(self) -> &'static str {
        match self {
            Channel::Cash => "cash",
            Channel::Bank => "bank",
            Channel::Wave => "wave",
            Channel::Aps => "aps",
            Channel::Orange => "orange",
            Channel::Nafa => "nafa",
            Channel::WesternUnion => "westernUnion",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Channel::Cash => "Cash on Hand",
            Channel::Bank => "Bank Account",
            Channel::Wave => "Wave Wallet",
            Channel::Aps => "APS Wallet",
            Channel::Orange => "Orange Money",
            Channel::Nafa => "NAFA Wallet",
            Channel::WesternUnion => "Western Union",
        }
    }

    pub fn from_id(id: &str) -> Option<Channel> {
        match id {
            "wu" => Some(Channel::WesternUnion),
            _ => Channel::ALL.into_iter().find(|c| c.id() == id),
        }
    }
}

impl core::fmt::Display for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.id())
    }
}

/// The `method` a transaction was paid through.
///
/// Rows written by older clients can carry a method outside the channel
/// set; those keep their raw id and still count toward daily totals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    Channel(Channel),
    Other(String),
}

impl PaymentMethod {
    /// The tracked channel, if any.
    pub fn channel(&self) -> Option<Channel> {
        match self {
            PaymentMethod::Channel(channel) => Some(*channel),
            PaymentMethod::Other(_) => None,
        }
    }
}

impl From<Channel> for PaymentMethod {
    fn from(value: Channel) -> Self {
        PaymentMethod::Channel(value)
    }
}

impl From<String> for PaymentMethod {
    fn from(value: String) -> Self {
        match Channel::from_id(&value) {
            Some(channel) => PaymentMethod::Channel(channel),
            None => PaymentMethod::Other(value),
        }
    }
}

impl From<PaymentMethod> for String {
    fn from(value: PaymentMethod) -> Self {
        match value {
            PaymentMethod::Channel(channel) => channel.id().to_string(),
            PaymentMethod::Other(raw) => raw,
        }
    }
}

impl PartialEq<Channel> for PaymentMethod {
    fn eq(&self, other: &Channel) -> bool {
        self.channel() == Some(*other)
    }
}

impl core::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PaymentMethod::Channel(channel) => f.write_str(channel.id()),
            PaymentMethod::Other(raw) => f.write_str(raw),
        }
    }
}

/// Per-channel amounts with total-map reads: a missing channel is zero.
///
/// Stored sparsely so a partial update carries only the channels it touches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelBalances(BTreeMap<Channel, Money>);

impl ValueObject for ChannelBalances {}

impl ChannelBalances {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single-entry partial map.
    pub fn single(channel: Channel, amount: Money) -> Self {
        let mut balances = Self::new();
        balances.set(channel, amount);
        balances
    }

    pub fn get(&self, channel: Channel) -> Money {
        self.0.get(&channel).copied().unwrap_or(Money::ZERO)
    }

    /// Whether the channel has an explicit entry (zero or not).
    pub fn contains(&self, channel: Channel) -> bool {
        self.0.contains_key(&channel)
    }

    pub fn set(&mut self, channel: Channel, amount: Money) {
        self.0.insert(channel, amount);
    }

    /// Overwrite only the channels present in `partial`.
    pub fn merge(&mut self, partial: &ChannelBalances) {
        for (channel, amount) in &partial.0 {
            self.0.insert(*channel, *amount);
        }
    }

    /// Dense copy with an explicit entry for every channel.
    pub fn to_total(&self) -> ChannelBalances {
        ChannelBalances(Channel::ALL.into_iter().map(|c| (c, self.get(c))).collect())
    }

    pub fn total(&self) -> Money {
        Channel::ALL.into_iter().map(|c| self.get(c)).sum()
    }

    /// Every channel in canonical order, defaults included.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, Money)> + '_ {
        Channel::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

impl FromIterator<(Channel, Money)> for ChannelBalances {
    fn from_iter<I: IntoIterator<Item = (Channel, Money)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_channels_read_as_zero() {
        let balances = ChannelBalances::single(Channel::Wave, Money::from_major_units(40));
        assert_eq!(balances.get(Channel::Cash), Money::ZERO);
        assert_eq!(balances.get(Channel::Wave), Money::from_major_units(40));
        assert_eq!(balances.iter().count(), Channel::ALL.len());
    }

    #[test]
    fn merge_touches_only_listed_channels() {
        let mut balances: ChannelBalances = [
            (Channel::Cash, Money::from_major_units(10)),
            (Channel::Bank, Money::from_major_units(20)),
        ]
        .into_iter()
        .collect();

        balances.merge(&ChannelBalances::single(Channel::Bank, Money::from_major_units(5)));

        assert_eq!(balances.get(Channel::Cash), Money::from_major_units(10));
        assert_eq!(balances.get(Channel::Bank), Money::from_major_units(5));
        assert_eq!(balances.total(), Money::from_major_units(15));
    }

    #[test]
    fn serializes_with_store_channel_ids() {
        let balances = ChannelBalances::single(Channel::WesternUnion, Money::from_minor(150));
        let json = serde_json::to_string(&balances).unwrap();
        assert_eq!(json, r#"{"westernUnion":1.5}"#);

        let legacy: ChannelBalances = serde_json::from_str(r#"{"wu": 3}"#).unwrap();
        assert_eq!(legacy.get(Channel::WesternUnion), Money::from_major_units(3));
    }

    #[test]
    fn from_id_accepts_every_stored_id() {
        for channel in Channel::ALL {
            assert_eq!(Channel::from_id(channel.id()), Some(channel));
        }
        assert_eq!(Channel::from_id("wu"), Some(Channel::WesternUnion));
        assert_eq!(Channel::from_id("paypal"), None);
    }

    #[test]
    fn unknown_methods_are_kept_verbatim() {
        let known: PaymentMethod = serde_json::from_str(r#""wu""#).unwrap();
        assert_eq!(known, Channel::WesternUnion);
        assert_eq!(serde_json::to_string(&known).unwrap(), r#""westernUnion""#);

        let other: PaymentMethod = serde_json::from_str(r#""paypal""#).unwrap();
        assert_eq!(other, PaymentMethod::Other("paypal".to_string()));
        assert_eq!(other.channel(), None);
        assert_eq!(serde_json::to_string(&other).unwrap(), r#""paypal""#);
    }
}
