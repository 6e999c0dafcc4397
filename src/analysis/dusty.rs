//! Empty and tiny ("dusty") shards.

use crate::data::ShardRow;

/// Rows of each list shown in the view.
pub const DUSTY_DISPLAY_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DustyReport {
    /// Started shards without documents.
    pub empty: Vec<ShardRow>,
    /// Started shards with documents below the size threshold, smallest first.
    pub dusty: Vec<ShardRow>,
    pub threshold_mb: f64,
}

impl DustyReport {
    pub fn is_clean(&self) -> bool {
        self.empty.is_empty() && self.dusty.is_empty()
    }

    /// Store held by dusty shards (MB).
    pub fn dusty_store_mb(&self) -> f64 {
        self.dusty.iter().map(|s| s.store_mb).sum()
    }
}

pub fn dusty_shards(shards: &[ShardRow], threshold_mb: f64) -> DustyReport {
    let started = shards.iter().filter(|s| s.is_started());

    let empty: Vec<ShardRow> = started.clone().filter(|s| s.docs == 0).cloned().collect();
    let mut dusty: Vec<ShardRow> = started
        .filter(|s| s.docs > 0 && s.store_mb < threshold_mb)
        .cloned()
        .collect();
    dusty.sort_by(|a, b| a.store_mb.total_cmp(&b.store_mb));

    DustyReport {
        empty,
        dusty,
        threshold_mb,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cluster::fixtures::*;
    use crate::data::ClusterData;

    #[test]
    fn test_classification() {
        let mut current = snapshot(0, 0, 0);
        if let Some(shards) = current.cat_shards.as_mut() {
            shards.push(shard("empty-idx", 0, true, Some("es-warm-1"), 0, 0.01));
            shards.push(shard("tiny", 0, true, Some("es-warm-1"), 12, 0.5));
        }
        let data = ClusterData::from_snapshots(current, None);
        let report = dusty_shards(&data.shards, 50.0);

        // The unassigned orders replica is not started
        assert_eq!(report.empty.len(), 1);
        assert_eq!(report.empty[0].index, "empty-idx");

        let dusty: Vec<(&str, f64)> = report
            .dusty
            .iter()
            .map(|s| (s.index.as_str(), s.store_mb))
            .collect();
        assert_eq!(dusty, vec![("tiny", 0.5), ("orders", 20.0)]);
        assert_eq!(report.dusty_store_mb(), 20.5);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_clean() {
        let data = cluster_data();
        let report = dusty_shards(&data.shards, 10.0);
        assert!(report.is_clean());
    }
}
