use csv_async::{AsyncWriterBuilder, Terminator};

use kasa_ledger::LedgerState;
use kasa_types::{KasaError, Result};

use crate::resolver::DisplayNameResolver;

pub const CSV_HEADER: [&str; 5] = ["UserID", "Name", "TZM", "MET", "Total"];

/// Default file name for exports written to disk.
pub const DEFAULT_EXPORT_FILE: &str = "kontrakty.csv";

/// Encode the whole ledger as CSV, one row per record in ledger order.
///
/// Unlike the summary, no record is ever dropped: a user the resolver does not
/// know is exported under their raw id.
pub async fn encode_csv<R>(state: &LedgerState, resolver: &R) -> Result<String>
where
    R: DisplayNameResolver + ?Sized,
{
    let mut writer = AsyncWriterBuilder::new()
        .terminator(Terminator::CRLF)
        .create_writer(Vec::new());

    writer.write_record(CSV_HEADER).await.map_err(csv_error)?;
    for r in state.iter() {
        let name = resolver
            .account_name(&r.user_id)
            .unwrap_or_else(|| r.user_id.clone());
        writer
            .write_record([
                r.user_id.clone(),
                name,
                r.tzm_count.to_string(),
                r.met_count.to_string(),
                r.total_bonus.to_string(),
            ])
            .await
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .await
        .map_err(|_| KasaError::Serialization("Failed to flush CSV export".into()))?;
    String::from_utf8(bytes).map_err(|e| KasaError::Serialization(e.to_string()))
}

fn csv_error(e: csv_async::Error) -> KasaError {
    KasaError::Serialization(format!("CSV export failed: {e}"))
}
