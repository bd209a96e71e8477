use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use kasa_reporting::SummaryRow;
use kasa_types::{KasaError, Result};

/// The daily summary as handed to the delivery channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReport {
    /// The scheduled instant this report belongs to, local wall-clock time.
    pub scheduled_for: NaiveDateTime,
    pub rows: Vec<SummaryRow>,
}

/// Where daily reports go.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, report: DailyReport) -> Result<()>;
}

/// Forwards reports into an mpsc channel.
pub struct ChannelNotifier {
    tx: mpsc::Sender<DailyReport>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::Sender<DailyReport>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn deliver(&self, report: DailyReport) -> Result<()> {
        self.tx
            .send(report)
            .await
            .map_err(|e| KasaError::Notification(format!("Report channel closed: {e}")))
    }
}

/// Writes reports to the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, report: DailyReport) -> Result<()> {
        tracing::info!(
            scheduled_for = %report.scheduled_for,
            contractors = report.rows.len(),
            "Daily summary"
        );
        for row in &report.rows {
            tracing::info!(
                name = %row.display_name,
                tzm = row.tzm,
                met = row.met,
                total_bonus = row.total_bonus,
                "Daily summary row"
            );
        }
        Ok(())
    }
}
