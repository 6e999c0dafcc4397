//! One refresh tick against a live cluster.

use std::fmt::Display;

use chrono::Utc;
use tracing::{info, warn};

use super::snapshot::{ClusterSnapshot, FetchPlan};
use crate::client::EsClient;
use crate::error::EsError;

/// Fetch every section the plan asks for.
///
/// Node stats and node info are required: if either fails the whole refresh
/// fails. Every other section is optional and is left `None` on error.
pub async fn collect(client: &EsClient, plan: FetchPlan) -> Result<ClusterSnapshot, EsError> {
    let (nodes_stats, nodes_info) = tokio::try_join!(client.nodes_stats(), client.nodes_info())?;
    let mut snapshot = ClusterSnapshot::new(Utc::now(), nodes_stats, nodes_info);

    if plan.cluster {
        let (health, stats, pending) = tokio::join!(
            client.cluster_health(),
            client.cluster_stats(),
            client.pending_tasks()
        );
        snapshot.health = optional("cluster health", health);
        snapshot.stats = optional("cluster stats", stats);
        snapshot.pending_tasks = optional("pending tasks", pending);
    }

    if plan.indices {
        let (stats, cat) = tokio::join!(client.indices_stats(), client.cat_indices());
        snapshot.indices_stats = optional("index stats", stats);
        snapshot.cat_indices = optional("_cat/indices", cat);
    }

    if plan.shards {
        snapshot.cat_shards = optional("_cat/shards", client.cat_shards().await);
    }

    if plan.tasks {
        snapshot.tasks = optional("search tasks", client.search_tasks().await);
    }

    if plan.templates {
        snapshot.templates = optional("index templates", client.index_templates().await);
    }

    if plan.mappings {
        let (mappings, limits) = tokio::join!(client.mappings(), client.field_limits());
        snapshot.mappings = optional("mappings", mappings);
        snapshot.index_settings = optional("field limits", limits);
    }

    if plan.cluster_settings {
        snapshot.cluster_settings = optional("cluster settings", client.cluster_settings().await);
    }

    info!(
        nodes = snapshot.nodes_stats.nodes.len(),
        overview = plan.is_overview(),
        "refresh complete"
    );
    Ok(snapshot)
}

/// Keep an optional section, or log why it is missing.
fn optional<T, E: Display>(what: &str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(section = what, error = %e, "skipping section");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{MockServer, Reply};

    const NODES: &str = r#"{"nodes":{"n1":{"name":"es-hot-1"}}}"#;

    fn client_for(server: &MockServer) -> EsClient {
        EsClient::builder().endpoint(server.url()).build().unwrap()
    }

    #[tokio::test]
    async fn test_collect_skips_failed_optional_section() {
        let server = MockServer::start(|path, _| {
            if path.starts_with("_nodes/") {
                Reply::json(200, NODES)
            } else if path.starts_with("_cluster/health") {
                Reply::json(200, r#"{"cluster_name":"prod","status":"green"}"#)
            } else if path.starts_with("_cluster/stats") {
                Reply::json(500, r#"{"error":"boom"}"#)
            } else if path.starts_with("_cluster/pending_tasks") {
                Reply::json(200, r#"{"tasks":[]}"#)
            } else {
                Reply::json(404, "{}")
            }
        })
        .await;

        let plan = FetchPlan {
            cluster: true,
            ..FetchPlan::default()
        };
        let snapshot = collect(&client_for(&server), plan).await.unwrap();

        assert_eq!(snapshot.nodes_stats.nodes["n1"].name, "es-hot-1");
        assert_eq!(snapshot.health.as_ref().map(|h| h.status.as_str()), Some("green"));
        assert!(snapshot.stats.is_none());
        assert!(snapshot.pending_tasks.is_some());
        assert!(snapshot.cat_shards.is_none());
    }

    #[tokio::test]
    async fn test_collect_fails_without_node_stats() {
        let server = MockServer::start(|path, _| {
            if path.starts_with("_nodes/stats") {
                Reply::json(500, "{}")
            } else {
                Reply::json(200, NODES)
            }
        })
        .await;

        let err = collect(&client_for(&server), FetchPlan::overview())
            .await
            .unwrap_err();
        assert!(matches!(err, EsError::Http { status: 500, .. }));
    }

    #[test]
    fn test_optional_keeps_ok() {
        let result: Result<u32, EsError> = Ok(3);
        assert_eq!(optional("x", result), Some(3));
    }

    #[test]
    fn test_optional_drops_err() {
        let result: Result<u32, EsError> = Err(EsError::Timeout);
        assert_eq!(optional("x", result), None);
    }
}
