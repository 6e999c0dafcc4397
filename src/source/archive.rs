//! Periodic on-disk archive of snapshots.
//!
//! Full snapshots are written as `cluster_<unix-secs>.json` at most once per
//! interval; files older than the retention window are removed. The archive
//! can be replayed later with [`FileSource`](super::FileSource).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{debug, info, warn};

use super::ClusterSnapshot;
use crate::config::SnapshotSettings;
use crate::error::EsError;

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"_(\d+)\.json$").expect("static regex"))
}

/// Unix timestamp encoded in an archive file name.
pub fn archived_at(path: &Path) -> Option<i64> {
    let name = path.file_name()?.to_str()?;
    timestamp_pattern()
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Archive files in `dir`, oldest first.
pub fn archived_files(dir: &Path) -> Result<Vec<PathBuf>, EsError> {
    let mut files: Vec<(i64, PathBuf)> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter_map(|path| archived_at(&path).map(|ts| (ts, path)))
        .collect();
    files.sort();
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Writes snapshots to disk on a fixed cadence.
#[derive(Debug)]
pub struct SnapshotArchive {
    dir: PathBuf,
    interval: Duration,
    retention: Duration,
    last_saved: Option<DateTime<Utc>>,
}

impl SnapshotArchive {
    pub fn new(dir: impl Into<PathBuf>, interval: Duration, retention: Duration) -> Self {
        Self {
            dir: dir.into(),
            interval,
            retention,
            last_saved: None,
        }
    }

    pub fn from_settings(settings: &SnapshotSettings) -> Option<Self> {
        settings.enabled.then(|| {
            Self::new(
                &settings.dir,
                Duration::from_secs(settings.interval_secs),
                Duration::from_secs(settings.retention_days * 24 * 60 * 60),
            )
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_saved {
            None => true,
            Some(last) => (now - last).to_std().map(|d| d >= self.interval).unwrap_or(false),
        }
    }

    /// Write the snapshot if the interval has elapsed. Returns the written path.
    pub fn save_if_due(&mut self, snapshot: &ClusterSnapshot) -> Result<Option<PathBuf>, EsError> {
        if !self.is_due(snapshot.fetched_at) {
            return Ok(None);
        }

        fs::create_dir_all(&self.dir)?;
        let path = self
            .dir
            .join(format!("cluster_{}.json", snapshot.fetched_at.timestamp()));
        let json = serde_json::to_vec(snapshot).map_err(|e| EsError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::write(&path, json)?;
        self.last_saved = Some(snapshot.fetched_at);
        info!(path = %path.display(), "snapshot archived");

        let removed = self.prune(snapshot.fetched_at)?;
        if removed > 0 {
            debug!(removed, "pruned old snapshots");
        }
        Ok(Some(path))
    }

    /// Delete archive files older than the retention window.
    pub fn prune(&self, now: DateTime<Utc>) -> Result<usize, EsError> {
        let cutoff = now.timestamp() - self.retention.as_secs() as i64;
        let mut removed = 0;
        for path in archived_files(&self.dir)? {
            match archived_at(&path) {
                Some(ts) if ts < cutoff => {
                    if let Err(e) = fs::remove_file(&path) {
                        warn!(path = %path.display(), error = %e, "failed to remove snapshot");
                    } else {
                        removed += 1;
                    }
                }
                _ => {}
            }
        }
        Ok(removed)
    }
}
