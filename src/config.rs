//! Runtime configuration.
//!
//! Settings are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`--config`)
//! 3. `ES_DOCTOR__<SECTION>__<KEY>` environment variables
//! 4. the conventional `ES_HOST`, `ES_USER`, `ES_PASS` and `ES_VERIFY_SSL`
//!    variables (a `.env` file is loaded into the environment by `main`)
//!
//! ```toml
//! refresh_secs = 5
//!
//! [elasticsearch]
//! host = "https://localhost:9200"
//! username = "elastic"
//!
//! [thresholds]
//! cpu_percent = 85.0
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::EsError;

/// Top-level settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub elasticsearch: EsSettings,
    /// Seconds between refresh ticks in live views.
    pub refresh_secs: u64,
    pub thresholds: Thresholds,
    pub spikes: SpikeThresholds,
    pub snapshots: SnapshotSettings,
    pub report: ReportSettings,
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            elasticsearch: EsSettings::default(),
            refresh_secs: 5,
            thresholds: Thresholds::default(),
            spikes: SpikeThresholds::default(),
            snapshots: SnapshotSettings::default(),
            report: ReportSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Connection settings for the cluster.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct EsSettings {
    pub host: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Verify the server certificate. Self-signed lab clusters usually need `false`.
    pub verify_tls: bool,
    pub timeout_secs: u64,
}

impl Default for EsSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: None,
            password: None,
            verify_tls: true,
            timeout_secs: 10,
        }
    }
}

impl fmt::Debug for EsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EsSettings")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("verify_tls", &self.verify_tls)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Thresholds for the diagnostics.
///
/// These determine when a node, index or shard is reported as a problem.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Overall heap usage (%) highlighted in the node table.
    pub heap_percent: f64,
    /// Old generation heap usage (%) that signals memory pressure.
    pub heap_old_gen_percent: f64,
    /// CPU usage (%) that marks a node as hot.
    pub cpu_percent: f64,
    /// Old GC time (ms) accumulated between two snapshots.
    pub gc_time_ms: u64,
    /// Thread pool rejections tolerated before a suggestion is raised.
    pub rejections: u64,
    /// Shards below this store size (MB) with documents are "dust".
    pub dusty_shard_mb: f64,
    /// Search tasks running longer than this are slow.
    pub long_running_task_minutes: f64,
    /// Templates with more primary shards than this are flagged.
    pub template_shard_count: u64,
    /// Field count / limit ratio that raises a mapping warning.
    pub mapping_warn_ratio: f64,
    /// Field count / limit ratio that marks an index at risk.
    pub mapping_risk_ratio: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            heap_percent: 85.0,
            heap_old_gen_percent: 75.0,
            cpu_percent: 90.0,
            gc_time_ms: 200,
            rejections: 0,
            dusty_shard_mb: 50.0,
            long_running_task_minutes: 5.0,
            template_shard_count: 5,
            mapping_warn_ratio: 0.75,
            mapping_risk_ratio: 0.9,
        }
    }
}

/// Change between two refreshes that is marked as a spike in the node table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpikeThresholds {
    pub cpu: f64,
    pub heap: f64,
    pub old_gen: f64,
    pub gc_count: f64,
    pub gc_time_ms: f64,
    pub rejections: f64,
}

impl Default for SpikeThresholds {
    fn default() -> Self {
        Self {
            cpu: 20.0,
            heap: 10.0,
            old_gen: 15.0,
            gc_count: 2.0,
            gc_time_ms: 500.0,
            rejections: 0.0,
        }
    }
}

/// Periodic snapshot archive.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnapshotSettings {
    pub enabled: bool,
    pub dir: PathBuf,
    pub interval_secs: u64,
    pub retention_days: u64,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("snapshots"),
            interval_secs: 300,
            retention_days: 7,
        }
    }
}

/// `--report` mode settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Gap between the two samples used to compute rates.
    pub sample_secs: u64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self { sample_secs: 2 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub file: PathBuf,
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from("es-doctor.log"),
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, EsError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Load settings, resolving the conventional `ES_*` variables through `lookup`.
    pub fn load_with(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, EsError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder
            .add_source(
                Environment::with_prefix("ES_DOCTOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("elasticsearch.host", lookup("ES_HOST"))
            .and_then(|b| b.set_override_option("elasticsearch.username", lookup("ES_USER")))
            .and_then(|b| b.set_override_option("elasticsearch.password", lookup("ES_PASS")))
            .and_then(|b| {
                b.set_override_option("elasticsearch.verify_tls", lookup("ES_VERIFY_SSL"))
            })
            .map_err(|e| EsError::Config(e.to_string()))?;

        let mut settings: Settings = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| EsError::Config(e.to_string()))?;

        settings.elasticsearch.host = settings.elasticsearch.host.trim_end_matches('/').to_string();
        if settings.elasticsearch.username.as_deref() == Some("") {
            settings.elasticsearch.username = None;
        }
        Ok(settings)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_with(None, lookup_from(&[])).unwrap();
        assert_eq!(settings.refresh_secs, 5);
        assert_eq!(settings.thresholds.heap_old_gen_percent, 75.0);
        assert_eq!(settings.thresholds.template_shard_count, 5);
        assert_eq!(settings.thresholds.dusty_shard_mb, 50.0);
        assert_eq!(settings.snapshots.retention_days, 7);
        assert!(settings.elasticsearch.host.is_empty());
        assert!(settings.elasticsearch.verify_tls);
    }

    #[test]
    fn test_env_credentials_override() {
        let settings = Settings::load_with(
            None,
            lookup_from(&[
                ("ES_HOST", "https://es.local:9200/"),
                ("ES_USER", "elastic"),
                ("ES_PASS", "changeme"),
                ("ES_VERIFY_SSL", "false"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.elasticsearch.host, "https://es.local:9200");
        assert_eq!(settings.elasticsearch.username.as_deref(), Some("elastic"));
        assert_eq!(settings.elasticsearch.password.as_deref(), Some("changeme"));
        assert!(!settings.elasticsearch.verify_tls);
    }

    #[test]
    fn test_file_partial_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
refresh_secs = 10

[thresholds]
cpu_percent = 70.0

[elasticsearch]
host = "http://from-file:9200"
"#
        )
        .unwrap();

        let settings =
            Settings::load_with(Some(file.path()), lookup_from(&[("ES_HOST", "http://env:9200")]))
                .unwrap();

        assert_eq!(settings.refresh_secs, 10);
        assert_eq!(settings.thresholds.cpu_percent, 70.0);
        // Untouched keys keep their defaults
        assert_eq!(settings.thresholds.gc_time_ms, 200);
        // ES_HOST wins over the file
        assert_eq!(settings.elasticsearch.host, "http://env:9200");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().with_extension("missing.toml");
        assert!(Settings::load_with(Some(&path), lookup_from(&[])).is_err());
    }

    #[test]
    fn test_password_redacted_in_debug() {
        let es = EsSettings {
            password: Some("hunter2".to_string()),
            ..EsSettings::default()
        };
        let debug = format!("{:?}", es);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }
}
