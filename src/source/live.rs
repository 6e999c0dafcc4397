//! Live cluster data source.

use tokio::runtime::{Builder, Runtime};
use tracing::{error, info};

use super::collector::collect;
use super::{ClusterSnapshot, ClusterSource, FetchPlan};
use crate::client::EsClient;
use crate::config::EsSettings;
use crate::error::EsError;
use crate::source::api::RootInfo;

/// Polls a running cluster over HTTP.
///
/// The source owns a current-thread runtime and blocks on it for each tick,
/// so the TUI loop stays synchronous like every other source.
#[derive(Debug)]
pub struct LiveSource {
    runtime: Runtime,
    client: EsClient,
    info: RootInfo,
    description: String,
    last_error: Option<String>,
}

impl LiveSource {
    /// Connect to the cluster and read its root info.
    ///
    /// Fails when the host is unset or the cluster is unreachable, so the
    /// caller can report the problem before entering the TUI.
    pub fn connect(settings: &EsSettings) -> Result<Self, EsError> {
        let client = EsClient::from_settings(settings)?;
        let runtime = Builder::new_current_thread().enable_all().build()?;

        let info = runtime.block_on(client.info())?;
        info!(
            endpoint = client.endpoint(),
            cluster = %info.cluster_name,
            version = %info.version.number,
            "connected"
        );

        let description = format!("{} ({})", client.endpoint(), info.version.number);
        Ok(Self {
            runtime,
            client,
            info,
            description,
            last_error: None,
        })
    }

    /// Root info read at connect time.
    pub fn info(&self) -> &RootInfo {
        &self.info
    }

    /// Fetch a snapshot, propagating the error instead of recording it.
    pub fn fetch(&self, plan: FetchPlan) -> Result<ClusterSnapshot, EsError> {
        let mut snapshot = self.runtime.block_on(collect(&self.client, plan))?;
        snapshot.info = Some(self.info.clone());
        Ok(snapshot)
    }
}

impl ClusterSource for LiveSource {
    fn poll(&mut self, plan: FetchPlan) -> Option<ClusterSnapshot> {
        match self.fetch(plan) {
            Ok(snapshot) => {
                self.last_error = None;
                Some(snapshot)
            }
            Err(e) => {
                error!(error = %e, "refresh failed");
                self.last_error = Some(e.to_string());
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_without_host() {
        let err = LiveSource::connect(&EsSettings::default()).unwrap_err();
        assert!(err.to_string().contains("ES_HOST"));
    }

    #[test]
    fn test_connect_unreachable() {
        // Port 9 (discard) is closed on test machines.
        let settings = EsSettings {
            host: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..EsSettings::default()
        };
        let err = LiveSource::connect(&settings).unwrap_err();
        assert!(matches!(
            err,
            EsError::Connection(_) | EsError::Timeout | EsError::Request(_)
        ));
    }
}
