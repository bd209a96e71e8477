use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDateTime, NaiveTime, TimeZone};
use tokio::sync::watch;

use kasa_ledger::LedgerStore;
use kasa_reporting::{DisplayNameResolver, summary};
use kasa_types::Result;

use crate::notifier::{DailyReport, Notifier};

/// Longest single sleep. Wall-clock jumps (DST, NTP) are noticed within
/// this bound.
const MAX_SLEEP: Duration = Duration::from_secs(60);

/// Source of local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    /// Real time left until the wall clock reads `target`. Zero once passed.
    fn until(&self, target: NaiveDateTime) -> Duration {
        (target - self.now()).to_std().unwrap_or(Duration::ZERO)
    }
}

/// The system's local time zone.
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }

    fn until(&self, target: NaiveDateTime) -> Duration {
        let now = chrono::Local::now();
        let remaining = match chrono::Local.from_local_datetime(&target).earliest() {
            Some(target) => target - now,
            // Skipped by a spring-forward gap; fire once the wall clock passes it.
            None => target - now.naive_local(),
        };
        remaining.to_std().unwrap_or(Duration::ZERO)
    }
}

/// Configuration for the daily report.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Local time of day at which the report fires.
    pub fire_at: NaiveTime,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fire_at: NaiveTime::MIN,
        }
    }
}

/// The first occurrence of `at` strictly after `now`.
pub fn next_fire_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        return today;
    }
    now.date()
        .checked_add_days(Days::new(1))
        .map(|d| d.and_time(at))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Fires the ledger summary once a day at a fixed local time.
///
/// Missed fires are not replayed: after a restart the next fire is simply the
/// next occurrence of the configured time.
pub struct DailyScheduler {
    ledger: Arc<LedgerStore>,
    resolver: Arc<dyn DisplayNameResolver>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    shutdown_rx: watch::Receiver<bool>,
}

impl DailyScheduler {
    pub fn new(
        ledger: Arc<LedgerStore>,
        resolver: Arc<dyn DisplayNameResolver>,
        notifier: Arc<dyn Notifier>,
        config: SchedulerConfig,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            ledger,
            resolver,
            notifier,
            clock: Arc::new(LocalClock),
            config,
            shutdown_rx,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run until shutdown is signalled.
    pub async fn run(mut self) {
        let mut next_fire = next_fire_after(self.clock.now(), self.config.fire_at);

        loop {
            if *self.shutdown_rx.borrow() {
                break;
            }

            tracing::info!(next_fire = %next_fire, "Daily report scheduled");
            if !self.wait_until(next_fire).await {
                break;
            }

            if let Err(e) = self.fire(next_fire).await {
                tracing::error!(
                    scheduled_for = %next_fire,
                    "Failed to deliver daily report: {}",
                    e
                );
            }
            // Never earlier than the slot just served, so an early
            // wake-up cannot fire the same day twice.
            let now = self.clock.now().max(next_fire);
            next_fire = next_fire_after(now, self.config.fire_at);
        }

        tracing::info!("Daily scheduler shutting down");
    }

    /// Sleep until the wall clock reaches `target`, re-reading the clock after
    /// every slice. Returns `false` if shutdown was signalled first.
    async fn wait_until(&mut self, target: NaiveDateTime) -> bool {
        loop {
            let remaining = self.clock.until(target);
            if remaining.is_zero() {
                return true;
            }

            tokio::select! {
                _ = tokio::time::sleep(remaining.min(MAX_SLEEP)) => {}
                Ok(()) = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        return false;
                    }
                }
            }
        }
    }

    /// Build the summary from the current ledger and hand it to the notifier.
    pub async fn fire(&self, scheduled_for: NaiveDateTime) -> Result<()> {
        let snapshot = self.ledger.snapshot().await;
        let rows = summary(&snapshot, self.resolver.as_ref());
        tracing::info!(%scheduled_for, rows = rows.len(), "Firing daily report");
        self.notifier
            .deliver(DailyReport {
                scheduled_for,
                rows,
            })
            .await
    }
}
