use serde::{Deserialize, Serialize};

use kasa_ledger::LedgerState;
use kasa_types::ContractorRecord;

use crate::resolver::DisplayNameResolver;

/// Number of entries shown by the ranking unless configured otherwise.
pub const DEFAULT_RANKING_SIZE: usize = 5;

/// One line of the global summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub display_name: String,
    pub tzm: u64,
    pub met: u64,
    pub total_bonus: u64,
}

/// One line of the bonus ranking. Ranks start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingRow {
    pub rank: usize,
    pub display_name: String,
    pub total_bonus: u64,
}

/// The caller's own record, if they have one.
pub fn personal(state: &LedgerState, user_id: &str) -> Option<ContractorRecord> {
    state.get(user_id).cloned()
}

/// Every resolvable user in ledger order. Users the resolver does not know
/// are left out.
pub fn summary<R>(state: &LedgerState, resolver: &R) -> Vec<SummaryRow>
where
    R: DisplayNameResolver + ?Sized,
{
    state
        .iter()
        .filter_map(|r| {
            resolver.display_name(&r.user_id).map(|display_name| SummaryRow {
                display_name,
                tzm: r.tzm_count,
                met: r.met_count,
                total_bonus: r.total_bonus,
            })
        })
        .collect()
}

/// Top `top_n` resolvable users by total bonus, highest first.
///
/// Equal totals keep ledger order. Unresolvable users are dropped before the
/// cut, so they never take a slot.
pub fn ranking<R>(state: &LedgerState, resolver: &R, top_n: usize) -> Vec<RankingRow>
where
    R: DisplayNameResolver + ?Sized,
{
    let mut ranked: Vec<(String, u64)> = state
        .iter()
        .filter_map(|r| {
            resolver
                .display_name(&r.user_id)
                .map(|name| (name, r.total_bonus))
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, (display_name, total_bonus))| RankingRow {
            rank: i + 1,
            display_name,
            total_bonus,
        })
        .collect()
}
