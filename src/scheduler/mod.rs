//! Periodic driver
//!
//! Minute-resolution loop over local wall-clock time: one collection pass
//! per day at the configured time, and a month rollover check on day one.
//! The pass is awaited inline, so a tick arriving while a run is still in
//! flight is absorbed instead of overlapping it; the dataset store never
//! sees two writers.

use crate::collector::Collector;
use crate::config::ScheduleConfig;
use crate::store::DatasetStore;
use anyhow::Context;
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime};
use std::time::Duration;

/// Parsed schedule times
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    pub daily_at: NaiveTime,
    pub rotate_check_at: NaiveTime,
}

impl Schedule {
    pub fn from_config(config: &ScheduleConfig) -> anyhow::Result<Self> {
        Ok(Self {
            daily_at: parse_hhmm(&config.daily_at)
                .with_context(|| format!("invalid daily_at: {}", config.daily_at))?,
            rotate_check_at: parse_hhmm(&config.rotate_check_at)
                .with_context(|| format!("invalid rotate_check_at: {}", config.rotate_check_at))?,
        })
    }
}

fn parse_hhmm(text: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M").map_err(Into::into)
}

/// The (year, month) of the calendar month before `date`'s.
pub fn previous_month(date: NaiveDate) -> (i32, u32) {
    if date.month() == 1 {
        (date.year() - 1, 12)
    } else {
        (date.year(), date.month() - 1)
    }
}

/// Whether the daily pass is due: at or past the fire time, once per day.
pub fn daily_due(now: DateTime<Local>, fire_at: NaiveTime, last_run: Option<NaiveDate>) -> bool {
    now.time() >= fire_at && last_run != Some(now.date_naive())
}

/// Whether the month rollover is due: day one, at or past the check time,
/// once per month.
pub fn rotation_due(
    now: DateTime<Local>,
    check_at: NaiveTime,
    last_rotated: Option<(i32, u32)>,
) -> bool {
    now.day() == 1
        && now.time() >= check_at
        && last_rotated != Some((now.year(), now.month()))
}

/// Drives daily collection and monthly rotation until cancelled.
pub struct PeriodicDriver {
    collector: Collector,
    store: DatasetStore,
    schedule: Schedule,
    last_run: Option<NaiveDate>,
    last_rotated: Option<(i32, u32)>,
}

impl PeriodicDriver {
    pub fn new(collector: Collector, store: DatasetStore, schedule: Schedule) -> Self {
        Self {
            collector,
            store,
            schedule,
            last_run: None,
            last_rotated: None,
        }
    }

    /// Run the driver loop forever.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        tracing::info!(
            daily_at = %self.schedule.daily_at,
            rotate_check_at = %self.schedule.rotate_check_at,
            "Periodic driver started"
        );

        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            self.on_tick(Local::now()).await;
        }
    }

    /// One wall-clock check. Rotation runs before collection so the closed
    /// month is archived before the new month's first write.
    async fn on_tick(&mut self, now: DateTime<Local>) {
        if rotation_due(now, self.schedule.rotate_check_at, self.last_rotated) {
            let (year, month) = previous_month(now.date_naive());
            match self.store.rotate_month(year, month) {
                Ok(_) => {
                    self.last_rotated = Some((now.year(), now.month()));
                }
                Err(e) => {
                    tracing::error!(error = %e, year, month, "Month rotation failed");
                }
            }
        }

        if daily_due(now, self.schedule.daily_at, self.last_run) {
            let as_of = now.date_naive();
            match self.collector.collect_and_store(&mut self.store, as_of).await {
                Ok(summary) => {
                    self.last_run = Some(as_of);
                    tracing::info!(?summary, "Daily pass complete");
                }
                Err(e) => {
                    // Try again on the next tick rather than skipping the day
                    tracing::error!(error = %e, "Daily pass failed");
                }
            }
        }
    }
}
