//! Long-running search tasks.

use crate::source::api::TaskList;

#[derive(Debug, Clone, PartialEq)]
pub struct SlowTask {
    pub task_id: String,
    pub node: String,
    pub action: String,
    pub description: String,
    pub running_minutes: f64,
    pub cancellable: bool,
}

/// Nanoseconds to minutes.
pub fn running_minutes(nanos: u64) -> f64 {
    nanos as f64 / 60e9
}

/// Tasks running longer than `threshold_minutes`, longest first.
pub fn slow_tasks(tasks: &TaskList, threshold_minutes: f64) -> Vec<SlowTask> {
    let mut out: Vec<SlowTask> = tasks
        .nodes
        .values()
        .flat_map(|node| {
            node.tasks.iter().map(move |(id, task)| SlowTask {
                task_id: id.clone(),
                node: node.name.clone(),
                action: task.action.clone(),
                description: if task.description.is_empty() {
                    "N/A".to_string()
                } else {
                    task.description.clone()
                },
                running_minutes: running_minutes(task.running_time_in_nanos),
                cancellable: task.cancellable,
            })
        })
        .filter(|t| t.running_minutes > threshold_minutes)
        .collect();

    out.sort_by(|a, b| b.running_minutes.total_cmp(&a.running_minutes));
    out
}
