use serde::{Deserialize, Serialize};

use crate::contract::{BonusRule, ContractType};
use crate::error::{KasaError, Result};

/// Per-user contract counters and accrued bonus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractorRecord {
    pub user_id: String,
    pub tzm_count: u64,
    pub met_count: u64,
    pub total_bonus: u64,
}

impl ContractorRecord {
    /// A zero-valued record.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            tzm_count: 0,
            met_count: 0,
            total_bonus: 0,
        }
    }

    pub fn count(&self, contract: ContractType) -> u64 {
        match contract {
            ContractType::Tzm => self.tzm_count,
            ContractType::Met => self.met_count,
        }
    }

    /// Record one completed contract worth `bonus`.
    ///
    /// Either both the counter and the total move, or neither does.
    pub fn apply(&mut self, contract: ContractType, bonus: u64) -> Result<()> {
        let overflow = || KasaError::BonusOverflow {
            user_id: self.user_id.clone(),
        };
        let count = self.count(contract).checked_add(1).ok_or_else(overflow)?;
        let total = self.total_bonus.checked_add(bonus).ok_or_else(overflow)?;

        match contract {
            ContractType::Tzm => self.tzm_count = count,
            ContractType::Met => self.met_count = count,
        }
        self.total_bonus = total;
        Ok(())
    }

    /// Whether `total_bonus` matches what the rule says these counters are worth.
    pub fn is_consistent_with(&self, rule: &BonusRule) -> bool {
        rule.expected_total(self.tzm_count, self.met_count) == Some(self.total_bonus)
    }
}
