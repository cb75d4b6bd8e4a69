//! Forward search for a conflict-free date range in one factory.

use chrono::NaiveDate;
use tracing::warn;

use super::coords::add_days;
use crate::error::EngineError;
use crate::model::{DateRange, FactoryId, NewTask, Task, TaskId, TaskStore};

/// Default number of candidate ranges tried before giving up.
pub const DEFAULT_SEARCH_HORIZON: usize = 365;

/// Result of [`find_available_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSearch {
    pub factory_id: FactoryId,
    pub range: DateRange,
    /// Candidates rejected before `range` was settled on.
    pub attempts: usize,
    /// `true` when the horizon ran out; `range` may still collide.
    pub exhausted: bool,
}

impl SlotSearch {
    /// The soft warning to surface when the search ran out.
    pub fn warning(&self) -> Option<EngineError> {
        self.exhausted.then_some(EngineError::SlotSearchExhausted {
            factory_id: self.factory_id,
            attempts: self.attempts,
        })
    }

    /// Whether the result moved away from the requested start.
    pub fn was_displaced(&self, desired_start: NaiveDate) -> bool {
        self.range.start != desired_start
    }
}

/// Find the first range at or after `desired_start`, `duration_days` long,
/// that overlaps no task of `factory_id` (other than `exclude`).
///
/// Each collision moves the candidate to the day after the latest end among
/// the tasks it hit. After `max_iterations` collisions the last candidate is
/// returned with `exhausted` set rather than failing.
pub fn find_available_range(
    factory_id: FactoryId,
    desired_start: NaiveDate,
    duration_days: i64,
    existing: &[Task],
    exclude: Option<TaskId>,
    max_iterations: usize,
) -> SlotSearch {
    let blockers: Vec<DateRange> = existing
        .iter()
        .filter(|t| t.factory_id == factory_id && Some(t.id) != exclude)
        .map(Task::range)
        .collect();

    let mut range = DateRange::with_duration(desired_start, duration_days);

    for attempts in 0..max_iterations {
        let latest_end = blockers
            .iter()
            .filter(|blocker| blocker.overlaps(&range))
            .map(|blocker| blocker.end)
            .max();

        match latest_end {
            None => {
                return SlotSearch {
                    factory_id,
                    range,
                    attempts,
                    exhausted: false,
                }
            }
            Some(end) => range = range.shifted_to(add_days(end, 1)),
        }
    }

    warn!(
        %factory_id,
        %desired_start,
        duration_days,
        max_iterations,
        "slot search exhausted, returning best-effort range"
    );
    SlotSearch {
        factory_id,
        range,
        attempts: max_iterations,
        exhausted: true,
    }
}

/// Create `new_task` at the first free range at or after its requested start,
/// keeping its requested length.
pub fn schedule_new_task<S>(store: &mut S, mut new_task: NewTask, max_iterations: usize) -> (Task, SlotSearch)
where
    S: TaskStore + ?Sized,
{
    let duration = DateRange::normalized(new_task.start, new_task.end).duration_days();
    let slot = find_available_range(
        new_task.factory_id,
        new_task.start,
        duration,
        store.tasks(),
        None,
        max_iterations,
    );
    new_task.start = slot.range.start;
    new_task.end = slot.range.end;
    (store.add_task(new_task), slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    #[test]
    fn free_start_is_kept() {
        let f = FactoryId::new();
        let existing = vec![Task::new("t", f, d(1, 1), d(1, 5))];
        let found = find_available_range(f, d(1, 10), 2, &existing, None, DEFAULT_SEARCH_HORIZON);
        assert_eq!(found.range, DateRange::new(d(1, 10), d(1, 12)));
        assert_eq!(found.attempts, 0);
        assert!(!found.was_displaced(d(1, 10)));
    }

    #[test]
    fn collision_moves_past_latest_end() {
        let f = FactoryId::new();
        let existing = vec![
            Task::new("short", f, d(1, 2), d(1, 3)),
            Task::new("long", f, d(1, 1), d(1, 8)),
        ];
        let found = find_available_range(f, d(1, 2), 1, &existing, None, DEFAULT_SEARCH_HORIZON);
        assert_eq!(found.range.start, d(1, 9));
        assert!(found.warning().is_none());
    }

    #[test]
    fn chained_collisions_are_walked() {
        let f = FactoryId::new();
        let existing = vec![
            Task::new("a", f, d(1, 1), d(1, 4)),
            Task::new("b", f, d(1, 6), d(1, 9)),
        ];
        // 3-day candidate from Jan 3 hits a, then Jan 5..8 hits b.
        let found = find_available_range(f, d(1, 3), 3, &existing, None, DEFAULT_SEARCH_HORIZON);
        assert_eq!(found.range, DateRange::new(d(1, 10), d(1, 13)));
        assert_eq!(found.attempts, 2);
    }

    #[test]
    fn excluded_task_does_not_block() {
        let f = FactoryId::new();
        let me = Task::new("me", f, d(1, 1), d(1, 5));
        let existing = vec![me.clone()];
        let found = find_available_range(f, d(1, 2), 3, &existing, Some(me.id), DEFAULT_SEARCH_HORIZON);
        assert_eq!(found.range.start, d(1, 2));
    }

    #[test]
    fn other_factories_are_ignored() {
        let f = FactoryId::new();
        let existing = vec![Task::new("elsewhere", FactoryId::new(), d(1, 1), d(1, 30))];
        let found = find_available_range(f, d(1, 2), 3, &existing, None, DEFAULT_SEARCH_HORIZON);
        assert_eq!(found.range.start, d(1, 2));
    }

    #[test]
    fn exhausted_search_reports_warning() {
        let f = FactoryId::new();
        let existing: Vec<Task> = (0..10)
            .map(|i| Task::new("block", f, d(1, 1 + i * 2), d(1, 2 + i * 2)))
            .collect();
        let found = find_available_range(f, d(1, 1), 0, &existing, None, 3);
        assert!(found.exhausted);
        assert!(matches!(
            found.warning(),
            Some(EngineError::SlotSearchExhausted { attempts: 3, .. })
        ));
    }

    #[test]
    fn new_task_lands_after_collision() {
        let mut plan = crate::model::Plan::new("slots");
        let f = FactoryId::new();
        plan.add_task(NewTask::new("t1", f, DateRange::new(d(1, 1), d(1, 5))));

        let wanted = NewTask::new("t2", f, DateRange::with_duration(d(1, 3), 3));
        let (task, slot) = schedule_new_task(&mut plan, wanted, DEFAULT_SEARCH_HORIZON);
        assert_eq!((task.start, task.end), (d(1, 6), d(1, 9)));
        assert!(slot.was_displaced(d(1, 3)));
        assert_eq!(plan.tasks().len(), 2);
    }

    #[test]
    fn negative_duration_is_treated_as_single_day() {
        let f = FactoryId::new();
        let found = find_available_range(f, d(1, 4), -3, &[], None, DEFAULT_SEARCH_HORIZON);
        assert_eq!(found.range, DateRange::new(d(1, 4), d(1, 4)));
    }
}
