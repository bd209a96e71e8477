use serde::{Deserialize, Serialize};

use kasa_types::ContractType;

/// An inbound event from the chat layer. Argument parsing and permission
/// checks have already happened by the time a trigger is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    /// The caller registers one completed contract.
    RegisterContract {
        caller_id: String,
        contract: ContractType,
    },
    /// Someone reacted to a message with `marker`.
    Reaction { reactor_id: String, marker: String },
    /// Everyone's counters.
    ShowAll,
    /// The bonus ranking.
    ShowTop,
    /// CSV export of the whole ledger.
    Export,
    /// The caller's own counters.
    ShowMine { caller_id: String },
    /// Wipe the ledger. Admin-only; enforced upstream.
    Reset,
}

impl Trigger {
    pub fn register(caller_id: impl Into<String>, contract: ContractType) -> Self {
        Trigger::RegisterContract {
            caller_id: caller_id.into(),
            contract,
        }
    }

    pub fn reaction(reactor_id: impl Into<String>, marker: impl Into<String>) -> Self {
        Trigger::Reaction {
            reactor_id: reactor_id.into(),
            marker: marker.into(),
        }
    }

    /// Whether handling this trigger changes the ledger.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Trigger::RegisterContract { .. } | Trigger::Reaction { .. } | Trigger::Reset
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_wire_format() {
        let trigger: Trigger = serde_json::from_str(
            r#"{"kind": "register_contract", "caller_id": "42", "contract": "MET"}"#,
        )
        .unwrap();
        assert_eq!(trigger, Trigger::register("42", ContractType::Met));

        let json = serde_json::to_value(Trigger::ShowTop).unwrap();
        assert_eq!(json["kind"], "show_top");
    }

    #[test]
    fn test_mutation_classification() {
        assert!(Trigger::register("1", ContractType::Tzm).is_mutation());
        assert!(Trigger::reaction("1", "🟢").is_mutation());
        assert!(Trigger::Reset.is_mutation());
        assert!(!Trigger::Export.is_mutation());
        assert!(!Trigger::ShowMine { caller_id: "1".into() }.is_mutation());
    }
}
