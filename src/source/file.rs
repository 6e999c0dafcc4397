//! File-based data source.
//!
//! Replays archived snapshots instead of talking to a cluster. A single file
//! is re-read whenever its modification time changes; a directory is walked
//! one archive file per poll, oldest first, so two consecutive polls yield a
//! rate-capable pair.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::archive::archived_files;
use super::{ClusterSnapshot, ClusterSource, FetchPlan};

#[derive(Debug)]
enum Target {
    File { last_modified: Option<SystemTime> },
    Dir { queue: Vec<PathBuf>, next: usize },
}

/// A data source that reads cluster snapshots from JSON files.
///
/// The fetch plan is ignored: archived snapshots carry whatever sections were
/// captured at the time.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    target: Target,
}

impl FileSource {
    /// Create a new file source for a snapshot file or an archive directory.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let (description, target) = if path.is_dir() {
            (
                format!("replay: {}/", path.display()),
                Target::Dir {
                    queue: Vec::new(),
                    next: 0,
                },
            )
        } else {
            (
                format!("file: {}", path.display()),
                Target::File {
                    last_modified: None,
                },
            )
        };
        Self {
            path,
            description,
            last_error: None,
            target,
        }
    }

    /// Returns the path being replayed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a directory replay has handed out every file.
    pub fn is_exhausted(&self) -> bool {
        match &self.target {
            Target::Dir { queue, next } => !queue.is_empty() && *next >= queue.len(),
            Target::File { .. } => false,
        }
    }

    fn read_file(&mut self, path: &Path) -> Option<ClusterSnapshot> {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(snapshot) => {
                    self.last_error = None;
                    Some(snapshot)
                }
                Err(e) => {
                    self.last_error = Some(format!("Parse error in {}: {}", path.display(), e));
                    None
                }
            },
            Err(e) => {
                self.last_error = Some(format!("Read error: {}", e));
                None
            }
        }
    }

    fn poll_file(&mut self) -> Option<ClusterSnapshot> {
        let current_modified = fs::metadata(&self.path).ok().and_then(|m| m.modified().ok());
        let Target::File { last_modified } = &self.target else {
            return None;
        };

        let file_changed = match (last_modified, &current_modified) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(last), Some(current)) => current > last,
        };
        if !file_changed {
            return None;
        }

        let path = self.path.clone();
        let snapshot = self.read_file(&path)?;
        self.target = Target::File {
            last_modified: current_modified,
        };
        Some(snapshot)
    }

    fn poll_dir(&mut self) -> Option<ClusterSnapshot> {
        if let Target::Dir { queue, .. } = &mut self.target {
            if queue.is_empty() {
                match archived_files(&self.path) {
                    Ok(files) if files.is_empty() => {
                        self.last_error = Some(format!("No snapshots in {}", self.path.display()));
                        return None;
                    }
                    Ok(files) => *queue = files,
                    Err(e) => {
                        self.last_error = Some(format!("Read error: {}", e));
                        return None;
                    }
                }
            }
        }

        let path = match &mut self.target {
            Target::Dir { queue, next } if *next < queue.len() => {
                *next += 1;
                queue[*next - 1].clone()
            }
            _ => return None,
        };
        self.read_file(&path)
    }
}

impl ClusterSource for FileSource {
    fn poll(&mut self, _plan: FetchPlan) -> Option<ClusterSnapshot> {
        match self.target {
            Target::File { .. } => self.poll_file(),
            Target::Dir { .. } => self.poll_dir(),
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
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn sample_json(name: &str, fetched_at: &str) -> String {
        format!(
            r#"{{
                "fetched_at": "{}",
                "health": {{ "cluster_name": "{}", "status": "green" }},
                "nodes_stats": {{ "nodes": {{ "n1": {{ "name": "es-1" }} }} }}
            }}"#,
            fetched_at, name
        )
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/does-not-exist.json");
        assert_eq!(source.path(), Path::new("/tmp/does-not-exist.json"));
        assert_eq!(source.description(), "file: /tmp/does-not-exist.json");
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_poll_reads_once() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json("prod", "2024-05-01T12:00:00Z")).unwrap();

        let mut source = FileSource::new(file.path());

        let snapshot = source.poll(FetchPlan::overview()).unwrap();
        assert_eq!(snapshot.cluster_name(), "prod");
        assert!(snapshot.nodes_stats.nodes.contains_key("n1"));

        // Unchanged file yields nothing new
        assert!(source.poll(FetchPlan::overview()).is_none());
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/cluster.json");
        assert!(source.poll(FetchPlan::overview()).is_none());
        assert!(source.error().unwrap().contains("Read error"));
    }

    #[test]
    fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut source = FileSource::new(file.path());
        assert!(source.poll(FetchPlan::overview()).is_none());
        assert!(source.error().unwrap().contains("Parse error"));
    }

    #[test]
    fn test_directory_replay_in_timestamp_order() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("cluster_1714564805.json"),
            sample_json("second", "2024-05-01T12:00:05Z"),
        )
        .unwrap();
        fs::write(
            dir.path().join("cluster_1714564800.json"),
            sample_json("first", "2024-05-01T12:00:00Z"),
        )
        .unwrap();

        let mut source = FileSource::new(dir.path());
        assert!(source.description().starts_with("replay:"));

        let first = source.poll(FetchPlan::nodes_only()).unwrap();
        let second = source.poll(FetchPlan::nodes_only()).unwrap();
        assert_eq!(first.cluster_name(), "first");
        assert_eq!(second.cluster_name(), "second");
        assert_eq!(second.seconds_since(&first), 5.0);

        assert!(source.is_exhausted());
        assert!(source.poll(FetchPlan::nodes_only()).is_none());
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let mut source = FileSource::new(dir.path());
        assert!(source.poll(FetchPlan::overview()).is_none());
        assert!(source.error().unwrap().contains("No snapshots"));
    }
}
