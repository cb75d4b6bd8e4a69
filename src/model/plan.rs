use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::factory::Factory;
use super::ids::{FactoryId, TaskId};
use super::task::{NewTask, Task, TaskPatch, TaskStatus};
use crate::engine::gating;
use crate::error::EngineError;

/// Where committed task changes go. The engine only ever calls
/// [`TaskStore::update_task`] and [`TaskStore::add_task`].
pub trait TaskStore {
    fn tasks(&self) -> &[Task];

    fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks().iter().find(|t| t.id == id)
    }

    fn add_task(&mut self, new_task: NewTask) -> Task;

    /// # Errors
    ///
    /// [`EngineError::StaleTaskReference`] if the task no longer exists,
    /// [`EngineError::InvalidDateOrder`] if the patch is inverted.
    fn update_task(&mut self, id: TaskId, patch: TaskPatch) -> Result<Task, EngineError>;

    fn delete_task(&mut self, id: TaskId) -> Option<Task>;
}

/// Read-only snapshot of factory metadata.
pub trait FactoryRegistry {
    fn factories(&self) -> &[Factory];

    fn factory(&self, id: FactoryId) -> Option<&Factory> {
        self.factories().iter().find(|f| f.id == id)
    }
}

/// A production plan: the factory lanes and every task scheduled on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
    pub factories: Vec<Factory>,
    pub tasks: Vec<Task>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            name: "Untitled Plan".to_string(),
            factories: Vec::new(),
            tasks: Vec::new(),
            created: Utc::now(),
            modified: Utc::now(),
        }
    }
}

impl Plan {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    pub fn add_factory(&mut self, factory: Factory) -> FactoryId {
        let id = factory.id;
        self.factories.push(factory);
        self.touch();
        id
    }

    pub fn tasks_in(&self, factory_id: FactoryId) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.factory_id == factory_id)
    }

    /// Change a task's status, honouring completion gating.
    ///
    /// # Errors
    ///
    /// [`EngineError::StaleTaskReference`] for an unknown task,
    /// [`EngineError::DependencyIncomplete`] when prerequisites are unfinished.
    pub fn set_status(&mut self, id: TaskId, status: TaskStatus) -> Result<(), EngineError> {
        let task = self
            .task(id)
            .ok_or(EngineError::StaleTaskReference(id))?;
        gating::check_status_change(task, status, &self.tasks)?;

        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.status = status;
        }
        self.touch();
        Ok(())
    }

    /// Re-copy factory names onto tasks after lanes were renamed or a plan
    /// was loaded from disk.
    pub fn refresh_factory_names(&mut self) {
        for task in &mut self.tasks {
            if let Some(factory) = self.factories.iter().find(|f| f.id == task.factory_id) {
                task.factory_name.clone_from(&factory.name);
            }
        }
    }

    /// Clamp every inverted task so `start <= end` holds again. Only plans
    /// read from outside (hand-edited files) can contain such tasks. Returns
    /// how many were fixed.
    pub fn normalize_dates(&mut self) -> usize {
        let mut fixed = 0;
        for task in self.tasks.iter_mut().filter(|t| t.start > t.end) {
            warn!(task_id = %task.id, start = %task.start, end = %task.end, "inverted task dates, clamping end to start");
            task.end = task.start;
            fixed += 1;
        }
        fixed
    }

    fn factory_name(&self, id: FactoryId) -> String {
        self.factory(id).map(|f| f.name.clone()).unwrap_or_default()
    }
}

impl TaskStore for Plan {
    fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    fn add_task(&mut self, new_task: NewTask) -> Task {
        let mut task = Task::new(
            new_task.title,
            new_task.factory_id,
            new_task.start,
            new_task.end,
        );
        task.task_type = new_task.task_type;
        task.project_id = new_task.project_id;
        task.depends_on = new_task.depends_on;
        task.factory_name = self.factory_name(task.factory_id);

        self.tasks.push(task.clone());
        self.touch();
        task
    }

    fn update_task(&mut self, id: TaskId, patch: TaskPatch) -> Result<Task, EngineError> {
        if patch.start > patch.end {
            return Err(EngineError::InvalidDateOrder {
                start: patch.start,
                end: patch.end,
            });
        }
        let factory_name = patch.factory_id.map(|fid| self.factory_name(fid));

        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(EngineError::StaleTaskReference(id))?;
        task.apply_patch(&patch);
        if let Some(name) = factory_name {
            task.factory_name = name;
        }
        let updated = task.clone();
        self.touch();
        Ok(updated)
    }

    fn delete_task(&mut self, id: TaskId) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        let removed = self.tasks.remove(idx);
        for task in &mut self.tasks {
            task.depends_on.retain(|dep| *dep != id);
        }
        self.touch();
        Some(removed)
    }
}

impl FactoryRegistry for Plan {
    fn factories(&self) -> &[Factory] {
        &self.factories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DateRange, FactoryType};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn plan_with_two_lanes() -> (Plan, FactoryId, FactoryId) {
        let mut plan = Plan::new("Test");
        let a = plan.add_factory(Factory::new("Plant A", FactoryType::Manufacturing));
        let b = plan.add_factory(Factory::new("Plant B", FactoryType::Manufacturing));
        (plan, a, b)
    }

    #[test]
    fn add_task_copies_factory_name() {
        let (mut plan, a, _) = plan_with_two_lanes();
        let task = plan.add_task(NewTask::new(
            "Weld",
            a,
            DateRange::new(d(2025, 1, 1), d(2025, 1, 3)),
        ));
        assert_eq!(task.factory_name, "Plant A");
        assert_eq!(plan.tasks.len(), 1);
    }

    #[test]
    fn update_task_moves_lane_and_renames() {
        let (mut plan, a, b) = plan_with_two_lanes();
        let task = plan.add_task(NewTask::new(
            "Weld",
            a,
            DateRange::new(d(2025, 1, 1), d(2025, 1, 3)),
        ));
        let updated = plan
            .update_task(
                task.id,
                TaskPatch::moved(b, DateRange::new(d(2025, 1, 4), d(2025, 1, 6))),
            )
            .unwrap();
        assert_eq!(updated.factory_id, b);
        assert_eq!(updated.factory_name, "Plant B");
        assert_eq!(updated.start, d(2025, 1, 4));
    }

    #[test]
    fn update_unknown_task_is_stale() {
        let (mut plan, _, _) = plan_with_two_lanes();
        let ghost = TaskId::new();
        let err = plan
            .update_task(
                ghost,
                TaskPatch::dates(DateRange::new(d(2025, 1, 1), d(2025, 1, 1))),
            )
            .unwrap_err();
        assert_eq!(err, EngineError::StaleTaskReference(ghost));
    }

    #[test]
    fn inverted_patch_is_refused() {
        let (mut plan, a, _) = plan_with_two_lanes();
        let task = plan.add_task(NewTask::new(
            "Weld",
            a,
            DateRange::new(d(2025, 1, 1), d(2025, 1, 3)),
        ));
        let patch = TaskPatch {
            factory_id: None,
            start: d(2025, 1, 9),
            end: d(2025, 1, 2),
        };
        assert!(matches!(
            plan.update_task(task.id, patch),
            Err(EngineError::InvalidDateOrder { .. })
        ));
        assert_eq!(plan.task(task.id).unwrap().start, d(2025, 1, 1));
    }

    #[test]
    fn delete_drops_dangling_dependencies() {
        let (mut plan, a, _) = plan_with_two_lanes();
        let first = plan.add_task(NewTask::new(
            "Cut",
            a,
            DateRange::new(d(2025, 1, 1), d(2025, 1, 2)),
        ));
        let mut second = NewTask::new("Weld", a, DateRange::new(d(2025, 1, 3), d(2025, 1, 4)));
        second.depends_on = vec![first.id];
        let second = plan.add_task(second);

        assert!(plan.delete_task(first.id).is_some());
        assert!(plan.task(second.id).unwrap().depends_on.is_empty());
        assert!(plan.delete_task(first.id).is_none());
    }

    #[test]
    fn normalize_clamps_only_inverted_tasks() {
        let (mut plan, a, _) = plan_with_two_lanes();
        let ok = plan.add_task(NewTask::new("Cut", a, DateRange::new(d(2025, 1, 1), d(2025, 1, 2))));
        let bad = plan.add_task(NewTask::new("Weld", a, DateRange::new(d(2025, 1, 3), d(2025, 1, 5))));
        plan.tasks[1].start = d(2025, 1, 9);

        assert_eq!(plan.normalize_dates(), 1);
        let bad = plan.task(bad.id).unwrap();
        assert_eq!((bad.start, bad.end), (d(2025, 1, 9), d(2025, 1, 9)));
        assert_eq!(plan.task(ok.id).unwrap().end, d(2025, 1, 2));
        assert_eq!(plan.normalize_dates(), 0);
    }
}
