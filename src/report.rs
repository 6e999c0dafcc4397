//! One-shot Markdown report for chat-ops channels.

use chrono::{DateTime, Utc};

use crate::analysis::dashboard::{dashboard, Dashboard, RankedIndex};
use crate::config::Settings;
use crate::data::format::{format_mb, format_rate};
use crate::data::ClusterData;

fn ranking_table(title: &str, unit: &str, rows: &[RankedIndex], lines: &mut Vec<String>) {
    lines.push(format!("\n### {}\n", title));
    if rows.is_empty() {
        lines.push("_No data._".to_string());
        return;
    }
    lines.push(format!("| Index | {} |", unit));
    lines.push("|---|---:|".to_string());
    for row in rows {
        lines.push(format!("| {} | {} |", row.index, format_rate(row.value)));
    }
}

fn header(dash: &Dashboard, now: DateTime<Utc>, lines: &mut Vec<String>) {
    let h = &dash.header;
    lines.push(format!("# Cluster Health Report: {}", h.cluster_name));
    lines.push(format!("**Date:** {}", now.format("%Y-%m-%d %H:%M:%S UTC")));
    lines.push(format!("**Status:** {}", h.status.to_uppercase()));
    lines.push(format!(
        "**Heap:** {:.1}% | **Pending tasks:** {} | **Shards:** {} initializing, {} relocating, {} unassigned",
        h.heap_total_percent,
        h.pending_tasks,
        h.initializing_shards,
        h.relocating_shards,
        h.unassigned_shards
    ));
}

/// Render the report for `data`, stamped with `now`.
pub fn render_markdown(data: &ClusterData, settings: &Settings, now: DateTime<Utc>) -> String {
    let dash = dashboard(data, settings);
    let mut lines = Vec::new();

    header(&dash, now, &mut lines);

    lines.push("\n## 💡 Suggestions and Alerts\n".to_string());
    if dash.suggestions.is_empty() {
        lines.push("* ✅ All clear! No critical issues detected.".to_string());
    } else {
        lines.extend(dash.suggestions.iter().map(|s| format!("* {}", s)));
    }

    lines.push("\n## 🖥️ Nodes\n".to_string());
    if dash.nodes.is_empty() {
        lines.push("_No node data._".to_string());
    } else {
        lines.push("| Tier | Node | CPU % | Heap % | Old Gen % | GC time (ms) | Rejections | Status |".to_string());
        lines.push("|---|---|---:|---:|---:|---:|---:|---|".to_string());
        for n in &dash.nodes {
            lines.push(format!(
                "| {} | {} | {:.0} | {:.0} | {:.1} | {:.0} | {:.0} | {} |",
                n.tier,
                n.name,
                n.cpu.current,
                n.heap.current,
                n.old_gen.current,
                n.gc_time_ms.current,
                n.rejections.current,
                n.status.symbol()
            ));
        }
    }

    lines.push("\n## 📊 Top Indices".to_string());
    if dash.has_rates {
        ranking_table("Writers", "Docs/s", &dash.top_writers, &mut lines);
        ranking_table("Searchers", "Queries/s", &dash.top_searchers, &mut lines);
    } else {
        lines.push("\n_Rates need two samples with index stats._".to_string());
    }

    lines.push("\n### Heap consumers\n".to_string());
    if dash.top_heap.is_empty() {
        lines.push("_No data._".to_string());
    } else {
        lines.push("| Index | Total | Segments | Query cache | Fielddata |".to_string());
        lines.push("|---|---:|---:|---:|---:|".to_string());
        for h in &dash.top_heap {
            lines.push(format!(
                "| {} | {} | {} | {} | {} |",
                h.index,
                format_mb(h.total_mb),
                format_mb(h.segments_mb),
                format_mb(h.query_cache_mb),
                format_mb(h.fielddata_mb)
            ));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cluster::fixtures::*;

    fn report() -> String {
        render_markdown(&cluster_data(), &Settings::default(), at(5))
    }

    #[test]
    fn test_header() {
        let md = report();
        assert!(md.starts_with("# Cluster Health Report: prod\n"));
        assert!(md.contains("**Date:** 2024-05-01 12:00:05 UTC"));
        assert!(md.contains("**Status:** YELLOW"));
        assert!(md.contains("1 unassigned"));
    }

    #[test]
    fn test_suggestions_section() {
        let md = report();
        assert!(md.contains("## 💡 Suggestions and Alerts"));
        assert!(md.contains("* 🚨 High old-gen heap on 'es-hot-1'"));
        assert!(md.contains("* 🔥 High CPU on 'es-hot-1'"));
        assert!(md.contains("* 💔 1 unassigned shards"));
        assert!(!md.contains("All clear"));
    }

    #[test]
    fn test_tables() {
        let md = report();
        assert!(md.contains("| hot | es-hot-1 | 95 | 80 | 80.0 |"));
        assert!(md.contains("| logs-2024.05.01 | 200.0/s |"));
        assert!(md.contains("| orders | 10.0/s |"));
        assert!(md.contains("| logs-2024.05.01 | 50.0 MB | 50.0 MB |"));
    }

    #[test]
    fn test_all_clear_without_rates() {
        let mut current = snapshot(0, 0, 0);
        for stats in current.nodes_stats.nodes.values_mut() {
            stats.os.cpu.percent = 10.0;
            stats.jvm.mem.pools.old.used_in_bytes = 0;
        }
        if let Some(health) = current.health.as_mut() {
            health.status = "green".to_string();
            health.unassigned_shards = 0;
        }
        let data = ClusterData::from_snapshots(current, None);
        let md = render_markdown(&data, &Settings::default(), at(0));

        assert!(md.contains("**Status:** GREEN"));
        assert!(md.contains("* ✅ All clear!"));
        assert!(md.contains("_Rates need two samples with index stats._"));
    }
}
