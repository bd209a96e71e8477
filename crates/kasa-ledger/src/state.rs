use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use kasa_types::{BonusRule, ContractType, ContractorRecord, Result};

/// All contractor records, in the order users first appeared.
///
/// Records live in a `Vec` so iteration follows first insertion; `index`
/// maps a user id to its slot.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    records: Vec<ContractorRecord>,
    index: HashMap<String, usize>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, user_id: &str) -> Option<&ContractorRecord> {
        self.index.get(user_id).map(|idx| &self.records[*idx])
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.index.contains_key(user_id)
    }

    /// Records in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ContractorRecord> {
        self.records.iter()
    }

    /// Return the record for `user_id`, appending a zero-valued one if absent.
    pub fn get_or_create(&mut self, user_id: &str) -> &mut ContractorRecord {
        let idx = match self.index.get(user_id) {
            Some(idx) => *idx,
            None => {
                let idx = self.records.len();
                self.records.push(ContractorRecord::new(user_id));
                self.index.insert(user_id.to_string(), idx);
                idx
            }
        };
        &mut self.records[idx]
    }

    /// Credit one contract of type `contract` to `user_id`.
    ///
    /// A fresh record cannot overflow, so a failed accrual never leaves a new
    /// empty record behind.
    pub fn accrue(
        &mut self,
        user_id: &str,
        contract: ContractType,
        rule: &BonusRule,
    ) -> Result<&ContractorRecord> {
        let bonus = rule.bonus(contract);
        let record = self.get_or_create(user_id);
        record.apply(contract, bonus)?;
        Ok(&*record)
    }

    /// Records whose bonus total disagrees with `rule`.
    pub fn inconsistent_with<'a>(
        &'a self,
        rule: &'a BonusRule,
    ) -> impl Iterator<Item = &'a ContractorRecord> + 'a {
        self.records.iter().filter(move |r| !r.is_consistent_with(rule))
    }

    fn insert_loaded(&mut self, record: ContractorRecord) -> bool {
        if self.index.contains_key(&record.user_id) {
            return false;
        }
        self.index.insert(record.user_id.clone(), self.records.len());
        self.records.push(record);
        true
    }
}

impl PartialEq for LedgerState {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl Eq for LedgerState {}

/// On-disk body of a record. The user id is the surrounding map key.
#[derive(Serialize, Deserialize)]
struct RecordBody {
    #[serde(rename = "TZM", default)]
    tzm: u64,
    #[serde(rename = "MET", default)]
    met: u64,
    #[serde(rename = "kasa", default)]
    kasa: u64,
}

impl Serialize for LedgerState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for r in &self.records {
            map.serialize_entry(
                &r.user_id,
                &RecordBody {
                    tzm: r.tzm_count,
                    met: r.met_count,
                    kasa: r.total_bonus,
                },
            )?;
        }
        map.end()
    }
}

struct LedgerStateVisitor;

impl<'de> Visitor<'de> for LedgerStateVisitor {
    type Value = LedgerState;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of user id to contract counters")
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut access: A,
    ) -> std::result::Result<Self::Value, A::Error> {
        let mut state = LedgerState::new();
        while let Some((user_id, body)) = access.next_entry::<String, RecordBody>()? {
            let record = ContractorRecord {
                user_id,
                tzm_count: body.tzm,
                met_count: body.met,
                total_bonus: body.kasa,
            };
            let user_id = record.user_id.clone();
            if !state.insert_loaded(record) {
                return Err(serde::de::Error::custom(format!(
                    "duplicate user id {user_id}"
                )));
            }
        }
        Ok(state)
    }
}

impl<'de> Deserialize<'de> for LedgerState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(LedgerStateVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kasa_types::KasaError;
    use proptest::prelude::*;

    #[test]
    fn test_scenario_three_tzm_one_met() {
        let rule = BonusRule::default();
        let mut state = LedgerState::new();
        for _ in 0..3 {
            state.accrue("A", ContractType::Tzm, &rule).unwrap();
        }
        let record = state.accrue("A", ContractType::Met, &rule).unwrap().clone();
        assert_eq!(record.tzm_count, 3);
        assert_eq!(record.met_count, 1);
        assert_eq!(record.total_bonus, 60_000);
    }

    #[test]
    fn test_iteration_follows_first_insertion() {
        let rule = BonusRule::default();
        let mut state = LedgerState::new();
        for id in ["zeta", "alpha", "mid", "alpha", "zeta"] {
            state.accrue(id, ContractType::Tzm, &rule).unwrap();
        }
        let ids: Vec<&str> = state.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_snapshot_format() {
        let rule = BonusRule::default();
        let mut state = LedgerState::new();
        state.accrue("111", ContractType::Tzm, &rule).unwrap();
        state.accrue("222", ContractType::Met, &rule).unwrap();

        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(
            json,
            r#"{"111":{"TZM":1,"MET":0,"kasa":15000},"222":{"TZM":0,"MET":1,"kasa":15000}}"#
        );
    }

    #[test]
    fn test_load_preserves_document_order() {
        let json = r#"{"9":{"TZM":1,"MET":0,"kasa":15000},"1":{"TZM":0,"MET":2,"kasa":30000}}"#;
        let state: LedgerState = serde_json::from_str(json).unwrap();
        let ids: Vec<&str> = state.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(ids, vec!["9", "1"]);
        assert_eq!(state.get("1").unwrap().met_count, 2);
    }

    #[test]
    fn test_missing_fields_read_as_zero() {
        let json = r#"{"5":{"TZM":2}}"#;
        let state: LedgerState = serde_json::from_str(json).unwrap();
        let record = state.get("5").unwrap();
        assert_eq!(record.tzm_count, 2);
        assert_eq!(record.met_count, 0);
        assert_eq!(record.total_bonus, 0);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let json = r#"{"5":{"TZM":1},"5":{"TZM":2}}"#;
        assert!(serde_json::from_str::<LedgerState>(json).is_err());
    }

    #[test]
    fn test_overflow_leaves_state_unchanged() {
        let rule = BonusRule::new(u64::MAX, 1);
        let mut state = LedgerState::new();
        state.accrue("a", ContractType::Tzm, &rule).unwrap();
        state.accrue("b", ContractType::Met, &rule).unwrap();
        let before = state.clone();

        let err = state.accrue("a", ContractType::Met, &rule).unwrap_err();
        assert!(matches!(err, KasaError::BonusOverflow { .. }));
        assert_eq!(state, before);
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_inconsistent_records_detected() {
        let rule = BonusRule::default();
        let json = r#"{"1":{"TZM":1,"MET":0,"kasa":15000},"2":{"TZM":1,"MET":0,"kasa":10}}"#;
        let state: LedgerState = serde_json::from_str(json).unwrap();
        let bad: Vec<&str> = state
            .inconsistent_with(&rule)
            .map(|r| r.user_id.as_str())
            .collect();
        assert_eq!(bad, vec!["2"]);
    }

    fn op_strategy() -> impl Strategy<Value = (u8, ContractType)> {
        (
            0u8..6,
            prop_oneof![Just(ContractType::Tzm), Just(ContractType::Met)],
        )
    }

    proptest! {
        #[test]
        fn prop_roundtrip_and_invariant(ops in proptest::collection::vec(op_strategy(), 0..80)) {
            let rule = BonusRule::new(15_000, 9_000);
            let mut state = LedgerState::new();
            for (user, contract) in ops {
                state.accrue(&format!("user-{user}"), contract, &rule).unwrap();
            }
            prop_assert_eq!(state.inconsistent_with(&rule).count(), 0);

            let json = serde_json::to_string_pretty(&state).unwrap();
            let loaded: LedgerState = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(loaded, state);
        }
    }
}
