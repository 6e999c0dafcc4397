//! Elasticsearch HTTP client.
//!
//! A thin async wrapper over `reqwest` that knows the handful of endpoints the
//! diagnostics read. Every call is a `GET`; a dropped connection, a timeout or
//! a 502/503/504 answer is retried once before the error is surfaced.
//!
//! ## Example
//!
//! ```rust,no_run
//! use es_doctor::client::EsClient;
//!
//! # async fn run() -> Result<(), es_doctor::EsError> {
//! let client = EsClient::builder()
//!     .endpoint("https://localhost:9200")
//!     .credentials("elastic", "changeme")
//!     .build()?;
//!
//! let health = client.cluster_health().await?;
//! println!("{} is {}", health.cluster_name, health.status);
//! # Ok(())
//! # }
//! ```

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::EsSettings;
use crate::error::EsError;
use crate::source::api::{
    CatIndex, CatShard, ClusterHealth, ClusterSettings, ClusterStats, IndexMappings,
    IndexSettingsMap, IndexTemplates, IndicesStats, NodesInfo, NodesStats, PendingTasks, RootInfo,
    TaskList,
};

const NODES_STATS_PATH: &str = "_nodes/stats/jvm,os,thread_pool,breaker";
const NODES_INFO_PATH: &str = "_nodes/_all/info/name,roles,attributes";
const INDICES_STATS_PATH: &str = "_stats/indexing,search,segments,query_cache,fielddata";
const CAT_INDICES_PATH: &str =
    "_cat/indices?format=json&bytes=mb&h=health,status,index,uuid,pri,rep,docs.count,store.size";
const CAT_SHARDS_PATH: &str =
    "_cat/shards?format=json&bytes=mb&h=index,shard,prirep,state,docs,store,ip,node";
const SEARCH_TASKS_PATH: &str = "_tasks?actions=*search*&detailed=true";
const FIELD_LIMIT_PATH: &str =
    "_all/_settings/index.mapping.total_fields.limit?include_defaults=true&flat_settings=true&expand_wildcards=open";
const CLUSTER_SETTINGS_PATH: &str = "_cluster/settings?include_defaults=true&flat_settings=true";

const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Client for the Elasticsearch REST API.
#[derive(Debug, Clone)]
pub struct EsClient {
    client: Client,
    endpoint: String,
    username: Option<String>,
    password: Option<String>,
}

impl EsClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> EsClientBuilder {
        EsClientBuilder::default()
    }

    /// Build a client from loaded settings.
    pub fn from_settings(settings: &EsSettings) -> Result<Self, EsError> {
        if settings.host.is_empty() {
            return Err(EsError::Config(
                "ES_HOST is not set (environment, .env or [elasticsearch].host)".to_string(),
            ));
        }

        let mut builder = Self::builder()
            .endpoint(&settings.host)
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .verify_tls(settings.verify_tls);
        if let Some(ref user) = settings.username {
            builder = builder.credentials(user, settings.password.clone().unwrap_or_default());
        }
        builder.build()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `GET /{path}` decoded as `T`, retried once on transient failures.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, EsError> {
        match self.get_once(path).await {
            Err(e) if e.is_transient() => {
                warn!(path, error = %e, "request failed, retrying once");
                tokio::time::sleep(RETRY_DELAY).await;
                self.get_once(path).await
            }
            other => other,
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, path: &str) -> Result<T, EsError> {
        let url = self.url(path);
        let started = Instant::now();

        let mut request = self.client.get(&url);
        if let Some(ref user) = self.username {
            request = request.basic_auth(user, self.password.as_ref());
        }
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(EsError::Auth(
                self.username.clone().unwrap_or_else(|| "anonymous".to_string()),
            ));
        }
        if !status.is_success() {
            return Err(EsError::Http {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let body = response.bytes().await?;
        debug!(
            path,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "GET completed"
        );

        serde_json::from_slice(&body).map_err(|e| EsError::Parse {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    pub async fn info(&self) -> Result<RootInfo, EsError> {
        self.get("").await
    }

    pub async fn cluster_health(&self) -> Result<ClusterHealth, EsError> {
        self.get("_cluster/health").await
    }

    pub async fn cluster_stats(&self) -> Result<ClusterStats, EsError> {
        self.get("_cluster/stats").await
    }

    pub async fn pending_tasks(&self) -> Result<PendingTasks, EsError> {
        self.get("_cluster/pending_tasks").await
    }

    pub async fn nodes_stats(&self) -> Result<NodesStats, EsError> {
        self.get(NODES_STATS_PATH).await
    }

    pub async fn nodes_info(&self) -> Result<NodesInfo, EsError> {
        self.get(NODES_INFO_PATH).await
    }

    pub async fn indices_stats(&self) -> Result<IndicesStats, EsError> {
        self.get(INDICES_STATS_PATH).await
    }

    pub async fn cat_indices(&self) -> Result<Vec<CatIndex>, EsError> {
        self.get(CAT_INDICES_PATH).await
    }

    pub async fn cat_shards(&self) -> Result<Vec<CatShard>, EsError> {
        self.get(CAT_SHARDS_PATH).await
    }

    pub async fn search_tasks(&self) -> Result<TaskList, EsError> {
        self.get(SEARCH_TASKS_PATH).await
    }

    pub async fn index_templates(&self) -> Result<IndexTemplates, EsError> {
        self.get("_index_template").await
    }

    pub async fn mappings(&self) -> Result<IndexMappings, EsError> {
        self.get("_mapping").await
    }

    pub async fn field_limits(&self) -> Result<IndexSettingsMap, EsError> {
        self.get(FIELD_LIMIT_PATH).await
    }

    pub async fn cluster_settings(&self) -> Result<ClusterSettings, EsError> {
        self.get(CLUSTER_SETTINGS_PATH).await
    }
}

/// Builder for [`EsClient`].
#[derive(Debug, Default)]
pub struct EsClientBuilder {
    endpoint: Option<String>,
    username: Option<String>,
    password: Option<String>,
    timeout: Option<Duration>,
    verify_tls: Option<bool>,
}

impl EsClientBuilder {
    /// Set the cluster endpoint (e.g., "https://localhost:9200").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the username and password for basic authentication.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Verify the server certificate (default: true).
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = Some(verify);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<EsClient, EsError> {
        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(Duration::from_secs(10)))
            .danger_accept_invalid_certs(!self.verify_tls.unwrap_or(true))
            .build()
            .map_err(|e| EsError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(EsClient {
            client,
            endpoint: self
                .endpoint
                .unwrap_or_else(|| "http://localhost:9200".to_string())
                .trim_end_matches('/')
                .to_string(),
            username: self.username,
            password: self.password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockServer, Reply};
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = EsClient::builder().build().unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9200");
        assert!(client.username.is_none());
    }

    #[test]
    fn test_builder_custom() {
        let client = EsClient::builder()
            .endpoint("https://es.internal:9200/")
            .credentials("elastic", "secret")
            .verify_tls(false)
            .build()
            .unwrap();

        assert_eq!(client.endpoint(), "https://es.internal:9200");
        assert_eq!(client.username.as_deref(), Some("elastic"));
        assert_eq!(client.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_url_join() {
        let client = EsClient::builder().endpoint("http://es:9200").build().unwrap();
        assert_eq!(client.url(""), "http://es:9200/");
        assert_eq!(client.url("/_cluster/health"), "http://es:9200/_cluster/health");
        assert_eq!(client.url(CAT_SHARDS_PATH), format!("http://es:9200/{}", CAT_SHARDS_PATH));
    }

    #[test]
    fn test_from_settings_requires_host() {
        let err = EsClient::from_settings(&EsSettings::default()).unwrap_err();
        assert!(matches!(err, EsError::Config(_)));
    }

    fn client_for(server: &MockServer) -> EsClient {
        EsClient::builder().endpoint(server.url()).build().unwrap()
    }

    #[tokio::test]
    async fn test_retries_after_dropped_connection() {
        let server = MockServer::start(|_, hit| {
            if hit == 0 {
                Reply::Drop
            } else {
                Reply::json(200, r#"{"ok":1}"#)
            }
        })
        .await;

        let value: serde_json::Value = client_for(&server).get("x").await.unwrap();
        assert_eq!(value["ok"], 1);
        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn test_retries_unavailable_once() {
        let server = MockServer::start(|_, _| Reply::json(503, "{}")).await;

        let err = client_for(&server)
            .get::<serde_json::Value>("_nodes/stats")
            .await
            .unwrap_err();
        assert!(matches!(err, EsError::Http { status: 503, .. }));
        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn test_no_retry_on_http_error() {
        let server = MockServer::start(|_, _| Reply::json(404, "{}")).await;

        let err = client_for(&server)
            .get::<serde_json::Value>("_index_template")
            .await
            .unwrap_err();
        match err {
            EsError::Http { status, path } => {
                assert_eq!(status, 404);
                assert_eq!(path, "_index_template");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_auth_failure() {
        let server = MockServer::start(|_, _| Reply::json(401, "{}")).await;
        let client = EsClient::builder()
            .endpoint(server.url())
            .credentials("ops", "wrong")
            .build()
            .unwrap();

        let err = client.get::<serde_json::Value>("").await.unwrap_err();
        assert!(matches!(err, EsError::Auth(ref user) if user == "ops"));
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_bad_body_is_parse_error() {
        let server = MockServer::start(|_, _| Reply::json(200, "not json")).await;

        let err = client_for(&server).cluster_health().await.unwrap_err();
        assert!(matches!(err, EsError::Parse { ref path, .. } if path == "_cluster/health"));
        assert_eq!(server.hits(), 1);
    }

    #[test]
    fn test_from_settings() {
        let settings = EsSettings {
            host: "http://es:9200".to_string(),
            username: Some("ops".to_string()),
            password: None,
            ..EsSettings::default()
        };
        let client = EsClient::from_settings(&settings).unwrap();
        assert_eq!(client.username.as_deref(), Some("ops"));
        assert_eq!(client.password.as_deref(), Some(""));
    }
}

/// Minimal HTTP/1.1 server answering each connection from a closure.
#[cfg(test)]
pub(crate) mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    pub(crate) enum Reply {
        /// Read the request, then close without answering.
        Drop,
        Json(u16, String),
    }

    impl Reply {
        pub(crate) fn json(status: u16, body: &str) -> Self {
            Reply::Json(status, body.to_string())
        }
    }

    pub(crate) struct MockServer {
        url: String,
        hits: Arc<AtomicUsize>,
    }

    impl MockServer {
        /// Serve on an ephemeral port. The handler gets the request path
        /// (without the leading `/`) and the zero-based request number.
        pub(crate) async fn start<F>(handler: F) -> Self
        where
            F: Fn(&str, usize) -> Reply + Send + Sync + 'static,
        {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let url = format!("http://{}", listener.local_addr().unwrap());
            let hits = Arc::new(AtomicUsize::new(0));
            let handler = Arc::new(handler);

            let counter = hits.clone();
            tokio::spawn(async move {
                while let Ok((mut stream, _)) = listener.accept().await {
                    let handler = handler.clone();
                    let counter = counter.clone();
                    tokio::spawn(async move {
                        let path = read_path(&mut stream).await;
                        let hit = counter.fetch_add(1, Ordering::SeqCst);
                        match handler(&path, hit) {
                            Reply::Drop => drop(stream),
                            Reply::Json(status, body) => {
                                let response = format!(
                                    "HTTP/1.1 {} Mock\r\ncontent-type: application/json\r\n\
                                     content-length: {}\r\nconnection: close\r\n\r\n{}",
                                    status,
                                    body.len(),
                                    body
                                );
                                let _ = stream.write_all(response.as_bytes()).await;
                                let _ = stream.shutdown().await;
                            }
                        }
                    });
                }
            });

            Self { url, hits }
        }

        pub(crate) fn url(&self) -> &str {
            &self.url
        }

        pub(crate) fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }
    }

    async fn read_path(stream: &mut TcpStream) -> String {
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&chunk[..n]),
            }
        }
        String::from_utf8_lossy(&request)
            .split_whitespace()
            .nth(1)
            .unwrap_or("/")
            .trim_start_matches('/')
            .to_string()
    }
}
