use std::path::Path;

use tracing::info;

use super::PlanFileError;
use crate::model::Plan;

/// Save a plan to a JSON file.
pub fn save_plan(plan: &Plan, path: &Path) -> Result<(), PlanFileError> {
    let json = serde_json::to_string_pretty(plan)?;
    std::fs::write(path, json).map_err(|source| PlanFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), tasks = plan.tasks.len(), "plan saved");
    Ok(())
}

/// Load a plan from a JSON file. Task display names are refreshed from the
/// factory list and inverted date ranges are clamped, so hand-edited files
/// cannot leave either stale.
pub fn load_plan(path: &Path) -> Result<Plan, PlanFileError> {
    let json = std::fs::read_to_string(path).map_err(|source| PlanFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut plan: Plan = serde_json::from_str(&json)?;
    plan.refresh_factory_names();
    plan.normalize_dates();
    info!(path = %path.display(), tasks = plan.tasks.len(), "plan loaded");
    Ok(plan)
}
