use serde::{Deserialize, Serialize};

use kasa_reporting::{RankingRow, SummaryRow};
use kasa_types::{ContractType, ContractorRecord};

/// Why a trigger was accepted but deliberately not acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// The reaction marker is not a contract marker.
    UnknownMarker,
    /// The reaction came from the bot itself.
    SelfReaction,
}

/// The outcome of a trigger, for the chat layer to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Response {
    /// A contract was credited. `bonus` is what this one contract paid.
    Accrued {
        record: ContractorRecord,
        contract: ContractType,
        bonus: u64,
    },
    /// No contracts recorded at all.
    EmptyLedger,
    Summary { rows: Vec<SummaryRow> },
    Ranking { rows: Vec<RankingRow> },
    Export { csv: String },
    Personal { record: ContractorRecord },
    /// The caller has no contracts yet.
    NoRecord { user_id: String },
    ResetDone,
    Ignored { reason: IgnoreReason },
}
