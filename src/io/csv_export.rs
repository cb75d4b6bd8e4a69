use std::path::Path;

use super::PlanFileError;
use crate::model::{FactoryId, FactoryRegistry, Plan};

/// Export every task to a semicolon-delimited CSV file, grouped by lane in
/// factory order and by start date within a lane. Tasks on unknown lanes
/// come last.
///
/// Columns: Factory ; Task ; Type ; Start ; End ; Status
/// Dates are formatted as YYYY-MM-DD.
/// Returns the number of tasks written.
pub fn export_csv(plan: &Plan, path: &Path) -> Result<usize, PlanFileError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_path(path)?;

    wtr.write_record(["Factory", "Task", "Type", "Start", "End", "Status"])?;

    let lane_order = |factory_id: FactoryId| {
        plan.factories()
            .iter()
            .position(|f| f.id == factory_id)
            .unwrap_or(usize::MAX)
    };
    let mut tasks: Vec<_> = plan.tasks.iter().collect();
    tasks.sort_by_key(|t| (lane_order(t.factory_id), t.start, t.id));

    for task in &tasks {
        let start = task.start.format("%Y-%m-%d").to_string();
        let end = task.end.format("%Y-%m-%d").to_string();
        wtr.write_record([
            task.factory_name.as_str(),
            task.title.as_str(),
            task.task_type.as_str(),
            start.as_str(),
            end.as_str(),
            task.status.label(),
        ])?;
    }

    wtr.flush().map_err(|source| PlanFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(tasks.len())
}
