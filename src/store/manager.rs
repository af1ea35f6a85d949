//! Partition files: rotation, backup, retention, repair

use super::dataset::{self, ScreenRecord};
use chrono::{DateTime, Duration, Local, NaiveDate};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::StoreConfig;

/// Store operation failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backup/rotate/repair target does not exist
    #[error("source file missing: {}", .0.display())]
    SourceMissing(PathBuf),
    /// Restore source does not exist
    #[error("backup file missing: {}", .0.display())]
    BackupMissing(PathBuf),
    /// Disk write failed; the canonical file is left untouched
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Row encoding failed
    #[error("csv encode failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Outcome of reading one partition file
#[derive(Debug)]
pub enum PartitionData {
    Present(Vec<ScreenRecord>),
    Absent,
    Corrupt(String),
}

/// Metadata for one partition file
#[derive(Debug, Clone)]
pub struct PartitionInfo {
    pub path: PathBuf,
    pub size: u64,
    pub modified: DateTime<Local>,
    pub rows: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

/// Aggregate view across all partitions
#[derive(Debug, Clone, Default)]
pub struct StoreStatistics {
    pub files: usize,
    pub rows: usize,
    pub bytes: u64,
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
}

/// Owns the on-disk dataset: one display file, monthly archives, backups.
///
/// Every mutating operation takes `&mut self`; exclusive access to the
/// target paths is enforced by ownership for the whole read-modify-write
/// sequence and released on every exit path. The driver keeps at most one
/// run in flight, so no further locking is needed.
pub struct DatasetStore {
    config: StoreConfig,
}

impl DatasetStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Canonical display file, `results_<basename>.csv`
    pub fn display_path(&self) -> PathBuf {
        self.config
            .data_dir
            .join(format!("results_{}.csv", self.config.base_name))
    }

    /// Monthly partition, `results_<basename>_<YYYY>_<MM>.csv`
    pub fn monthly_path(&self, year: i32, month: u32) -> PathBuf {
        self.config
            .data_dir
            .join(format!("results_{}_{year}_{month:02}.csv", self.config.base_name))
    }

    pub fn backup_dir(&self) -> &Path {
        &self.config.backup_dir
    }

    /// Read one partition, distinguishing absent, corrupt, and present.
    pub fn read_partition(&self, path: &Path) -> PartitionData {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return PartitionData::Absent,
            Err(e) => return PartitionData::Corrupt(e.to_string()),
        };

        let (rows, skipped) = dataset::from_csv(&text);
        if rows.is_empty() && skipped > 0 {
            return PartitionData::Corrupt(format!("{skipped} unreadable rows"));
        }
        if skipped > 0 {
            tracing::warn!(path = %path.display(), skipped, "Partition contains unreadable rows");
        }
        PartitionData::Present(rows)
    }

    /// Read a partition for merging; absent and corrupt both become empty.
    fn load_or_empty(&self, path: &Path) -> Vec<ScreenRecord> {
        match self.read_partition(path) {
            PartitionData::Present(rows) => rows,
            PartitionData::Absent => Vec::new(),
            PartitionData::Corrupt(reason) => {
                tracing::warn!(path = %path.display(), reason, "Treating corrupt partition as empty");
                Vec::new()
            }
        }
    }

    /// Write rows to a partition through a temp file and rename, so an
    /// interrupted run leaves the prior canonical file intact.
    pub fn write_partition(
        &mut self,
        path: &Path,
        rows: &[ScreenRecord],
    ) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let text = dataset::to_csv(rows)?;
        let tmp = path.with_extension("csv.tmp");

        fs::write(&tmp, &text).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::Write {
                path: path.to_path_buf(),
                source,
            });
        }

        tracing::debug!(path = %path.display(), rows = rows.len(), "Wrote partition");
        Ok(())
    }

    /// Merge one run's records into the display file and the month's
    /// partition, applying the row cap to both.
    pub fn append_run(
        &mut self,
        records: &[ScreenRecord],
        as_of: NaiveDate,
    ) -> Result<(), StoreError> {
        use chrono::Datelike;

        let max_rows = self.config.max_rows;
        let display = self.display_path();
        let monthly = self.monthly_path(as_of.year(), as_of.month());

        for path in [display, monthly] {
            let existing = self.load_or_empty(&path);
            let merged = dataset::cap(dataset::merge(existing, records), max_rows);
            self.write_partition(&path, &merged)?;
        }
        Ok(())
    }

    /// Archive the display file under the closed month's name.
    ///
    /// Idempotent: an existing archive is never overwritten, and a missing
    /// display file is a no-op. Returns the archive path when a copy was
    /// actually made.
    pub fn rotate_month(&mut self, year: i32, month: u32) -> Result<Option<PathBuf>, StoreError> {
        let archive = self.monthly_path(year, month);
        if archive.exists() {
            tracing::info!(archive = %archive.display(), "Archive already exists, skipping rotation");
            return Ok(None);
        }

        let display_file = self.display_path();
        if !display_file.exists() {
            tracing::warn!(display = %display_file.display(), "No display file to archive");
            return Ok(None);
        }

        fs::copy(&display_file, &archive).map_err(|source| StoreError::Write {
            path: archive.clone(),
            source,
        })?;
        tracing::info!(archive = %archive.display(), "Archived closed month");
        Ok(Some(archive))
    }

    /// Copy a file into the backup directory with a capture timestamp.
    pub fn backup(&mut self, source: &Path) -> Result<PathBuf, StoreError> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        self.backup_at(source, &stamp)
    }

    fn backup_at(&mut self, source: &Path, stamp: &str) -> Result<PathBuf, StoreError> {
        if !source.exists() {
            return Err(StoreError::SourceMissing(source.to_path_buf()));
        }

        fs::create_dir_all(&self.config.backup_dir).map_err(|source_err| StoreError::Write {
            path: self.config.backup_dir.clone(),
            source: source_err,
        })?;

        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "backup".to_string());
        let dest = self.config.backup_dir.join(format!("{stem}_{stamp}.csv"));

        // Backups are immutable once captured
        if dest.exists() {
            return Err(StoreError::Write {
                path: dest,
                source: io::Error::new(io::ErrorKind::AlreadyExists, "backup already exists"),
            });
        }

        fs::copy(source, &dest).map_err(|source_err| StoreError::Write {
            path: dest.clone(),
            source: source_err,
        })?;
        tracing::info!(backup = %dest.display(), "Backup created");
        Ok(dest)
    }

    /// Restore a backup over a target path (temp-then-rename).
    pub fn restore(&mut self, backup: &Path, target: &Path) -> Result<(), StoreError> {
        if !backup.exists() {
            return Err(StoreError::BackupMissing(backup.to_path_buf()));
        }

        let tmp = target.with_extension("csv.tmp");
        fs::copy(backup, &tmp).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&tmp, target) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::Write {
                path: target.to_path_buf(),
                source,
            });
        }

        tracing::info!(backup = %backup.display(), target = %target.display(), "Restored from backup");
        Ok(())
    }

    /// Merge every listed source, last-seen wins per (ticker, date).
    ///
    /// Missing and corrupt files are skipped with a log line; one bad file
    /// never fails the whole merge.
    pub fn merge_many(&self, paths: &[PathBuf]) -> Vec<ScreenRecord> {
        let mut all = Vec::new();
        for path in paths {
            match self.read_partition(path) {
                PartitionData::Present(rows) => {
                    tracing::info!(path = %path.display(), rows = rows.len(), "Merging partition");
                    all.extend(rows);
                }
                PartitionData::Absent => {
                    tracing::warn!(path = %path.display(), "Merge source missing, skipping");
                }
                PartitionData::Corrupt(reason) => {
                    tracing::warn!(path = %path.display(), reason, "Merge source corrupt, skipping");
                }
            }
        }
        dataset::dedup_keep_last(all)
    }

    /// Normalize a stray duplicate-suffix name like `results_x(2).csv`
    /// back to the canonical `results_x.csv`. No-op when the marker is
    /// absent; refuses to rename over an existing canonical file.
    pub fn repair_name(&mut self, path: &Path) -> Result<PathBuf, StoreError> {
        let name = match path.file_name().map(|n| n.to_string_lossy().into_owned()) {
            Some(name) if name.contains("(2)") => name,
            _ => return Ok(path.to_path_buf()),
        };

        if !path.exists() {
            return Err(StoreError::SourceMissing(path.to_path_buf()));
        }

        let target = path.with_file_name(name.replace("(2)", ""));
        if target.exists() {
            return Err(StoreError::Write {
                path: target,
                source: io::Error::new(io::ErrorKind::AlreadyExists, "canonical file exists"),
            });
        }

        fs::rename(path, &target).map_err(|source| StoreError::Write {
            path: target.clone(),
            source,
        })?;
        tracing::info!(from = %path.display(), to = %target.display(), "Repaired filename");
        Ok(target)
    }

    /// Enumerate all partitions, newest-modified first.
    ///
    /// Unreadable files are skipped with a warning.
    pub fn list_partitions(&self) -> Vec<PartitionInfo> {
        let prefix = format!("results_{}", self.config.base_name);

        let entries = match fs::read_dir(&self.config.data_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %self.config.data_dir.display(), error = %e, "Cannot list data directory");
                return Vec::new();
            }
        };

        let mut infos = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(&prefix) || !name.ends_with(".csv") {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Cannot stat partition, skipping");
                    continue;
                }
            };
            let modified = match metadata.modified() {
                Ok(modified) => DateTime::<Local>::from(modified),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Cannot read mtime, skipping");
                    continue;
                }
            };

            let rows = match self.read_partition(&path) {
                PartitionData::Present(rows) => rows,
                PartitionData::Absent => continue,
                PartitionData::Corrupt(reason) => {
                    tracing::warn!(path = %path.display(), reason, "Unreadable partition, skipping");
                    continue;
                }
            };

            infos.push(PartitionInfo {
                path,
                size: metadata.len(),
                modified,
                date_range: dataset::date_range(&rows),
                rows: rows.len(),
            });
        }

        infos.sort_by(|a, b| b.modified.cmp(&a.modified));
        infos
    }

    /// Remove partitions last modified more than `keep_months` months ago,
    /// backing each one up first. The display file is exempt. Returns the
    /// count actually removed; per-file failures are logged and skipped.
    pub fn retention_sweep(&mut self, keep_months: u32) -> usize {
        let cutoff = Local::now() - Duration::days(30 * i64::from(keep_months));
        let display = self.display_path();

        let mut removed = 0usize;
        for info in self.list_partitions() {
            if info.path == display || info.modified >= cutoff {
                continue;
            }

            // Remove only after a successful backup
            match self.backup(&info.path) {
                Ok(backup) => {
                    if let Err(e) = fs::remove_file(&info.path) {
                        tracing::warn!(path = %info.path.display(), error = %e, "Backed up but could not remove");
                        continue;
                    }
                    removed += 1;
                    tracing::info!(path = %info.path.display(), backup = %backup.display(), "Swept expired partition");
                }
                Err(e) => {
                    tracing::warn!(path = %info.path.display(), error = %e, "Backup failed, keeping partition");
                }
            }
        }

        tracing::info!(removed, keep_months, "Retention sweep finished");
        removed
    }

    /// Resynchronize the display file from the active month's partition.
    ///
    /// Returns false when the monthly partition does not exist yet.
    pub fn sync_display(&mut self, today: NaiveDate) -> Result<bool, StoreError> {
        use chrono::Datelike;

        let monthly = self.monthly_path(today.year(), today.month());
        if !monthly.exists() {
            tracing::warn!(monthly = %monthly.display(), "No monthly partition to sync from");
            return Ok(false);
        }

        let display_file = self.display_path();
        let tmp = display_file.with_extension("csv.tmp");
        fs::copy(&monthly, &tmp).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&tmp, &display_file) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::Write {
                path: display_file,
                source,
            });
        }

        tracing::info!(from = %monthly.display(), to = %display_file.display(), "Display file synced");
        Ok(true)
    }

    /// Aggregate statistics across all partitions.
    pub fn statistics(&self) -> StoreStatistics {
        let infos = self.list_partitions();
        let mut stats = StoreStatistics {
            files: infos.len(),
            ..Default::default()
        };

        for info in &infos {
            stats.rows += info.rows;
            stats.bytes += info.size;
            if let Some((earliest, latest)) = info.date_range {
                stats.earliest = Some(stats.earliest.map_or(earliest, |e| e.min(earliest)));
                stats.latest = Some(stats.latest.map_or(latest, |l| l.max(latest)));
            }
        }

        stats
    }
}
