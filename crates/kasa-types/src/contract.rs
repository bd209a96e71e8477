use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KasaError;

/// Default bonus paid for a single completed contract, in whole currency units.
pub const DEFAULT_BONUS: u64 = 15_000;

/// The two categories a completed contract can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractType {
    #[serde(rename = "TZM")]
    Tzm,
    #[serde(rename = "MET")]
    Met,
}

impl ContractType {
    pub const ALL: [ContractType; 2] = [ContractType::Tzm, ContractType::Met];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::Tzm => "TZM",
            ContractType::Met => "MET",
        }
    }

    /// Map a reaction marker to a contract type. 🟢 is TZM, 🔴 is MET,
    /// anything else is not a registration.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "🟢" => Some(ContractType::Tzm),
            "🔴" => Some(ContractType::Met),
            _ => None,
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractType {
    type Err = KasaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TZM" => Ok(ContractType::Tzm),
            "MET" => Ok(ContractType::Met),
            _ => Err(KasaError::UnknownContractType(s.to_string())),
        }
    }
}

/// Bonus amounts per contract type.
///
/// The two amounts happen to be equal by default. Nothing downstream relies on
/// that: every accrual looks up the amount for its own type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusRule {
    #[serde(default = "default_bonus")]
    pub tzm: u64,
    #[serde(default = "default_bonus")]
    pub met: u64,
}

fn default_bonus() -> u64 {
    DEFAULT_BONUS
}

impl Default for BonusRule {
    fn default() -> Self {
        Self {
            tzm: DEFAULT_BONUS,
            met: DEFAULT_BONUS,
        }
    }
}

impl BonusRule {
    pub fn new(tzm: u64, met: u64) -> Self {
        Self { tzm, met }
    }

    pub fn bonus(&self, contract: ContractType) -> u64 {
        match contract {
            ContractType::Tzm => self.tzm,
            ContractType::Met => self.met,
        }
    }

    /// The bonus total a record with these counters must carry.
    /// `None` if the product does not fit in a `u64`.
    pub fn expected_total(&self, tzm_count: u64, met_count: u64) -> Option<u64> {
        let tzm = tzm_count.checked_mul(self.tzm)?;
        let met = met_count.checked_mul(self.met)?;
        tzm.checked_add(met)
    }
}
