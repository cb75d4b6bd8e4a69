//! Row packing inside a factory lane.
//!
//! Greedy interval colouring: tasks sorted by start (ties by id) each take the
//! lowest row that holds nothing overlapping them. This is the left-to-right
//! greedy result, not a guaranteed minimum.

use std::collections::HashMap;

use tracing::debug;

use super::overlap::overlaps;
use crate::model::{Factory, FactoryId, Task, TaskId};

/// Default upper bound on rows scanned per lane.
pub const DEFAULT_MAX_ROWS: usize = 100;

/// Row index per task for one factory lane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowAssignment {
    rows: HashMap<TaskId, usize>,
}

impl RowAssignment {
    pub fn row_of(&self, id: TaskId) -> Option<usize> {
        self.rows.get(&id).copied()
    }

    /// Rows needed to draw the lane; never less than one so empty lanes keep
    /// their height.
    pub fn row_count(&self) -> usize {
        self.rows.values().max().map_or(1, |max| max + 1)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskId, usize)> + '_ {
        self.rows.iter().map(|(id, row)| (*id, *row))
    }
}

/// Assign each task the lowest row free of overlaps.
///
/// Expects tasks already filtered to one factory (tasks from other factories
/// never conflict, so they would simply share rows). When every row below
/// `max_rows` is taken the task lands on `max_rows` itself.
pub fn assign_rows<'a, I>(tasks: I, max_rows: usize) -> RowAssignment
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut ordered: Vec<&Task> = tasks.into_iter().collect();
    ordered.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

    let mut occupied: Vec<Vec<&Task>> = Vec::new();
    let mut rows = HashMap::with_capacity(ordered.len());

    for task in ordered {
        let free = (0..max_rows).find(|&row| {
            occupied
                .get(row)
                .map_or(true, |placed| !placed.iter().any(|other| overlaps(other, task)))
        });

        let row = match free {
            Some(row) => {
                if occupied.len() <= row {
                    occupied.resize_with(row + 1, Vec::new);
                }
                occupied[row].push(task);
                row
            }
            None => {
                debug!(task_id = %task.id, max_rows, "lane is saturated, stacking task on overflow row");
                max_rows
            }
        };
        rows.insert(task.id, row);
    }

    RowAssignment { rows }
}

/// Rows needed by `factory_id` given the full task list.
pub fn row_count(factory_id: FactoryId, tasks: &[Task], max_rows: usize) -> usize {
    assign_rows(tasks.iter().filter(|t| t.factory_id == factory_id), max_rows).row_count()
}

/// Row assignments for every lane, computed together for one frame.
#[derive(Debug, Clone, Default)]
pub struct LaneLayout {
    lanes: HashMap<FactoryId, RowAssignment>,
}

impl LaneLayout {
    pub fn lane(&self, factory_id: FactoryId) -> Option<&RowAssignment> {
        self.lanes.get(&factory_id)
    }

    /// Row of `task` within its lane, 0 when the lane is unknown.
    pub fn row_of(&self, task: &Task) -> usize {
        self.lane(task.factory_id)
            .and_then(|lane| lane.row_of(task.id))
            .unwrap_or(0)
    }

    pub fn row_count(&self, factory_id: FactoryId) -> usize {
        self.lane(factory_id).map_or(1, RowAssignment::row_count)
    }
}

/// Pack every factory lane.
pub fn layout_lanes(factories: &[Factory], tasks: &[Task], max_rows: usize) -> LaneLayout {
    let lanes = factories
        .iter()
        .map(|factory| {
            let lane = assign_rows(tasks.iter().filter(|t| t.factory_id == factory.id), max_rows);
            (factory.id, lane)
        })
        .collect();
    LaneLayout { lanes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FactoryType;
    use chrono::NaiveDate;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    #[test]
    fn disjoint_tasks_share_row_zero() {
        let f = FactoryId::new();
        let tasks = vec![
            Task::new("a", f, d(1, 1), d(1, 3)),
            Task::new("b", f, d(1, 4), d(1, 6)),
            Task::new("c", f, d(1, 7), d(1, 7)),
        ];
        let rows = assign_rows(&tasks, DEFAULT_MAX_ROWS);
        assert!(tasks.iter().all(|t| rows.row_of(t.id) == Some(0)));
        assert_eq!(rows.row_count(), 1);
    }

    #[test]
    fn freed_row_is_reused() {
        let f = FactoryId::new();
        let long = Task::new("long", f, d(1, 1), d(1, 20));
        let short = Task::new("short", f, d(1, 2), d(1, 4));
        let later = Task::new("later", f, d(1, 6), d(1, 8));
        let tasks = vec![later.clone(), short.clone(), long.clone()];

        let rows = assign_rows(&tasks, DEFAULT_MAX_ROWS);
        assert_eq!(rows.row_of(long.id), Some(0));
        assert_eq!(rows.row_of(short.id), Some(1));
        assert_eq!(rows.row_of(later.id), Some(1));
    }

    #[test]
    fn ties_break_by_id() {
        let f = FactoryId::new();
        let mut first = Task::new("first", f, d(3, 1), d(3, 2));
        first.id = TaskId::from_u128(1);
        let mut second = Task::new("second", f, d(3, 1), d(3, 2));
        second.id = TaskId::from_u128(2);

        let rows = assign_rows([&second, &first], DEFAULT_MAX_ROWS);
        assert_eq!(rows.row_of(first.id), Some(0));
        assert_eq!(rows.row_of(second.id), Some(1));
    }

    #[test]
    fn saturated_lane_falls_back_to_bound() {
        let f = FactoryId::new();
        let tasks: Vec<Task> = (0..4)
            .map(|i| Task::new(format!("t{i}"), f, d(1, 1), d(1, 5)))
            .collect();
        let rows = assign_rows(&tasks, 2);
        let overflow = tasks
            .iter()
            .filter(|t| rows.row_of(t.id) == Some(2))
            .count();
        assert_eq!(overflow, 2);
        assert_eq!(rows.row_count(), 3);
    }

    #[test]
    fn empty_factory_keeps_one_row() {
        let f = FactoryId::new();
        assert_eq!(row_count(f, &[], DEFAULT_MAX_ROWS), 1);
    }

    #[test]
    fn layout_packs_each_lane_independently() {
        let a = Factory::new("A", FactoryType::Manufacturing);
        let b = Factory::new("B", FactoryType::Manufacturing);
        let tasks = vec![
            Task::new("a1", a.id, d(1, 1), d(1, 5)),
            Task::new("a2", a.id, d(1, 2), d(1, 6)),
            Task::new("b1", b.id, d(1, 1), d(1, 5)),
        ];
        let layout = layout_lanes(&[a.clone(), b.clone()], &tasks, DEFAULT_MAX_ROWS);
        assert_eq!(layout.row_count(a.id), 2);
        assert_eq!(layout.row_count(b.id), 1);
        assert_eq!(layout.row_of(&tasks[2]), 0);
    }
}
