//! Completion gating: a task cannot progress while any prerequisite it lists
//! is unfinished.

use crate::error::EngineError;
use crate::model::{Task, TaskId, TaskStatus};

/// Prerequisites of `task` that are not completed or approved. Prerequisites
/// missing from `tasks` are ignored.
pub fn blocking_tasks(task: &Task, tasks: &[Task]) -> Vec<TaskId> {
    task.depends_on
        .iter()
        .filter_map(|dep| tasks.iter().find(|t| t.id == *dep))
        .filter(|dep| !dep.status.is_done())
        .map(|dep| dep.id)
        .collect()
}

/// # Errors
///
/// [`EngineError::DependencyIncomplete`] when `new_status` is in-progress,
/// completed or approved and some prerequisite is unfinished.
pub fn check_status_change(
    task: &Task,
    new_status: TaskStatus,
    tasks: &[Task],
) -> Result<(), EngineError> {
    if matches!(new_status, TaskStatus::Pending | TaskStatus::Rejected) {
        return Ok(());
    }
    let blocking = blocking_tasks(task, tasks);
    if blocking.is_empty() {
        Ok(())
    } else {
        Err(EngineError::DependencyIncomplete {
            task: task.id,
            blocking,
        })
    }
}
