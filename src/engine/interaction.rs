//! The drag / resize / select state machine.
//!
//! One [`InteractionEngine`] exists per timeline widget and is owned by the
//! host. At most one gesture is in flight at a time: the `Gesture` enum makes
//! the modes exclusive, and every `start_*` call goes through [`begin`] which
//! clears whatever was still active.
//!
//! Pointer-move handlers never fail. They correct bad geometry locally and
//! keep the last plausible [`Preview`]. Only `end_drag` / `end_resize`
//! report an [`Outcome`].
//!
//! [`begin`]: InteractionEngine::begin

use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;

use tracing::debug;

use super::compat::{check_compatibility, explain_incompatibility};
use super::coords::{add_days, pixel_delta_to_days, resize_edge_to_date, ResizeEdge};
use super::observer::{GestureEvent, GestureKind, GestureObserver, TracingObserver};
use super::slots::find_available_range;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::model::{
    DateRange, Factory, FactoryId, FactoryRegistry, Task, TaskId, TaskPatch, TaskStore,
    TimelineViewport,
};

/// Candidate geometry for the task under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub task_id: TaskId,
    pub factory_id: FactoryId,
    pub range: DateRange,
    /// The factory under the pointer accepts this task's type.
    pub compatible: bool,
    /// The candidate collides with a sibling (a drop will shift it).
    pub overlapping: bool,
    /// Why the pointer's factory was refused.
    pub reason: Option<String>,
    pub tooltip: String,
}

impl Preview {
    pub fn is_valid(&self) -> bool {
        self.compatible && !self.overlapping
    }
}

/// What a drag-select gesture does to the rows it passes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAction {
    Select,
    Deselect,
}

/// Factory rows ticked in the lane list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactorySelection {
    selected: BTreeSet<FactoryId>,
}

impl FactorySelection {
    pub fn contains(&self, id: FactoryId) -> bool {
        self.selected.contains(&id)
    }

    pub fn apply(&mut self, action: SelectAction, id: FactoryId) {
        match action {
            SelectAction::Select => {
                self.selected.insert(id);
            }
            SelectAction::Deselect => {
                self.selected.remove(&id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = FactoryId> + '_ {
        self.selected.iter().copied()
    }

    /// Drop ids that are no longer in the registry.
    pub fn retain_known(&mut self, factories: &[Factory]) {
        self.selected.retain(|id| factories.iter().any(|f| f.id == *id));
    }
}

/// Public view of the current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Idle,
    Dragging { task_id: TaskId },
    Resizing { task_id: TaskId, edge: ResizeEdge },
    Selecting { anchor: FactoryId, action: SelectAction },
}

/// Result of finishing a drag or resize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The store accepted the change. `notice` carries a soft warning such as
    /// an exhausted slot search.
    Committed {
        task: Task,
        notice: Option<EngineError>,
    },
    /// Refused for a reason the user should see; nothing changed.
    Rejected(EngineError),
    /// Nothing to commit: no gesture, no movement, or the task vanished.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    task_id: TaskId,
    origin: DateRange,
    origin_factory: FactoryId,
    origin_pointer_x: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ResizeState {
    task_id: TaskId,
    edge: ResizeEdge,
    origin: DateRange,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Dragging(DragState),
    Resizing(ResizeState),
    Selecting {
        anchor: FactoryId,
        action: SelectAction,
    },
}

impl Gesture {
    fn kind(&self) -> GestureKind {
        match self {
            Gesture::Dragging(_) => GestureKind::Drag,
            Gesture::Resizing(rs) => GestureKind::Resize(rs.edge),
            Gesture::Selecting { .. } => GestureKind::Select,
        }
    }

    fn task_id(&self) -> Option<TaskId> {
        match self {
            Gesture::Dragging(drag) => Some(drag.task_id),
            Gesture::Resizing(rs) => Some(rs.task_id),
            Gesture::Selecting { .. } => None,
        }
    }
}

pub struct InteractionEngine {
    config: EngineConfig,
    gesture: Option<Gesture>,
    preview: Option<Preview>,
    /// When the last drag or resize was released.
    released_at: Option<Instant>,
    last_activity: Option<Instant>,
    observer: Box<dyn GestureObserver>,
}

impl fmt::Debug for InteractionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionEngine")
            .field("mode", &self.mode())
            .field("preview", &self.preview)
            .field("released_at", &self.released_at)
            .finish_non_exhaustive()
    }
}

impl Default for InteractionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl InteractionEngine {
    /// An idle engine reporting through [`TracingObserver`].
    pub fn new(config: EngineConfig) -> Self {
        Self::with_observer(config, TracingObserver)
    }

    pub fn with_observer(config: EngineConfig, observer: impl GestureObserver + 'static) -> Self {
        Self {
            config,
            gesture: None,
            preview: None,
            released_at: None,
            last_activity: None,
            observer: Box::new(observer),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn mode(&self) -> InteractionMode {
        match self.gesture {
            None => InteractionMode::Idle,
            Some(Gesture::Dragging(drag)) => InteractionMode::Dragging {
                task_id: drag.task_id,
            },
            Some(Gesture::Resizing(rs)) => InteractionMode::Resizing {
                task_id: rs.task_id,
                edge: rs.edge,
            },
            Some(Gesture::Selecting { anchor, action }) => {
                InteractionMode::Selecting { anchor, action }
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        self.gesture.is_none()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Some(Gesture::Dragging(_)))
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.gesture, Some(Gesture::Resizing(_)))
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self.gesture, Some(Gesture::Selecting { .. }))
    }

    /// Task being dragged or resized.
    pub fn active_task_id(&self) -> Option<TaskId> {
        self.gesture.as_ref().and_then(Gesture::task_id)
    }

    pub fn resize_edge(&self) -> Option<ResizeEdge> {
        match self.gesture {
            Some(Gesture::Resizing(rs)) => Some(rs.edge),
            _ => None,
        }
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    /// `true` while the click that trails a drag/resize release should be
    /// swallowed.
    pub fn should_suppress_click(&self, now: Instant) -> bool {
        self.released_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.config.click_suppression())
    }

    // ── Drag ────────────────────────────────────────────────────

    /// Begin moving `task_id`. Returns `false` (and stays idle) when the task
    /// is unknown.
    pub fn start_drag<S>(&mut self, task_id: TaskId, pointer_x: f32, store: &S, now: Instant) -> bool
    where
        S: TaskStore + ?Sized,
    {
        let Some(task) = store.task(task_id) else {
            self.abandon_stale(GestureKind::Drag, task_id);
            return false;
        };
        let drag = DragState {
            task_id,
            origin: task.range(),
            origin_factory: task.factory_id,
            origin_pointer_x: pointer_x,
        };
        self.begin(Gesture::Dragging(drag), Some(task.factory_id), now);
        true
    }

    /// Recompute the drag preview for a pointer at `pointer_x` (timeline
    /// coordinates) over `hovered_factory`.
    ///
    /// When the hovered factory is incompatible, the preview keeps the last
    /// valid factory and dates and only flips `compatible` off.
    pub fn update_drag<S>(
        &mut self,
        pointer_x: f32,
        hovered_factory: Option<FactoryId>,
        store: &S,
        viewport: &TimelineViewport,
        now: Instant,
    ) -> Option<&Preview>
    where
        S: TaskStore + FactoryRegistry + ?Sized,
    {
        let Some(Gesture::Dragging(drag)) = self.gesture else {
            return None;
        };
        let Some(task) = store.task(drag.task_id) else {
            self.abandon_stale(GestureKind::Drag, drag.task_id);
            return None;
        };
        self.last_activity = Some(now);

        // Snap the pointer travel, not the bar edge: a bar starting left of
        // the visible days must not jump onto the first one.
        let day_delta = pixel_delta_to_days(pointer_x - drag.origin_pointer_x, viewport.pixels_per_day);
        let range = drag.origin.shifted_to(add_days(drag.origin.start, day_delta));

        let target = hovered_factory
            .or_else(|| self.preview.as_ref().map(|p| p.factory_id))
            .unwrap_or(drag.origin_factory);

        let preview = match explain_incompatibility(task.factory_id, target, store.factories()) {
            None => {
                let overlapping = collides(store.tasks(), task.id, target, range);
                Preview {
                    task_id: task.id,
                    factory_id: target,
                    range,
                    compatible: true,
                    overlapping,
                    reason: None,
                    tooltip: tooltip_for(store, target, range, overlapping),
                }
            }
            Some(reason) => {
                let (factory_id, range, overlapping) = match &self.preview {
                    Some(last) => (last.factory_id, last.range, last.overlapping),
                    None => (task.factory_id, drag.origin, false),
                };
                Preview {
                    task_id: task.id,
                    factory_id,
                    range,
                    compatible: false,
                    overlapping,
                    tooltip: reason.clone(),
                    reason: Some(reason),
                }
            }
        };

        self.observer.on_event(&GestureEvent::PreviewUpdated(&preview));
        self.preview = Some(preview);
        self.preview.as_ref()
    }

    /// Drop the dragged task.
    ///
    /// The hovered factory is checked one last time; an incompatible drop is
    /// rejected with no mutation. Otherwise residual overlap is resolved with
    /// the slot finder and `{factory, start, end}` is committed.
    pub fn end_drag<S>(
        &mut self,
        pointer_x: f32,
        hovered_factory: Option<FactoryId>,
        store: &mut S,
        viewport: &TimelineViewport,
        now: Instant,
    ) -> Outcome
    where
        S: TaskStore + FactoryRegistry + ?Sized,
    {
        if !self.is_dragging() {
            return Outcome::Discarded;
        }
        // The release ends the drag even when the task vanished under it.
        self.suppress_clicks(now);
        self.update_drag(pointer_x, hovered_factory, &*store, viewport, now);

        let Some(Gesture::Dragging(drag)) = self.gesture else {
            return Outcome::Discarded;
        };
        self.gesture = None;
        let preview = self.preview.take();

        let Some(task) = store.task(drag.task_id).cloned() else {
            self.abandon_stale(GestureKind::Drag, drag.task_id);
            return Outcome::Discarded;
        };
        let Some(preview) = preview else {
            return Outcome::Discarded;
        };

        let target = hovered_factory.unwrap_or(preview.factory_id);
        if let Err(error) = check_compatibility(task.factory_id, target, store.factories()) {
            self.observer.on_event(&GestureEvent::Rejected {
                kind: GestureKind::Drag,
                task_id: task.id,
                error: &error,
            });
            return Outcome::Rejected(error);
        }

        let slot = find_available_range(
            target,
            preview.range.start,
            preview.range.duration_days(),
            store.tasks(),
            Some(task.id),
            self.config.slot_search_horizon,
        );
        self.commit(GestureKind::Drag, store, task.id, TaskPatch::moved(target, slot.range), slot.warning())
    }

    // ── Resize ──────────────────────────────────────────────────

    /// Begin moving one edge of `task_id`. Returns `false` when the task is
    /// unknown.
    pub fn start_resize<S>(&mut self, task_id: TaskId, edge: ResizeEdge, store: &S, now: Instant) -> bool
    where
        S: TaskStore + ?Sized,
    {
        let Some(task) = store.task(task_id) else {
            self.abandon_stale(GestureKind::Resize(edge), task_id);
            return false;
        };
        let resize = ResizeState {
            task_id,
            edge,
            origin: task.range(),
        };
        self.begin(Gesture::Resizing(resize), Some(task.factory_id), now);
        true
    }

    /// Recompute the resize preview for a pointer at `pointer_x`.
    ///
    /// The moved edge snaps with the half-cell rule, never passes the other
    /// edge, and stops at the first sibling it would run into.
    pub fn update_resize<S>(
        &mut self,
        pointer_x: f32,
        store: &S,
        viewport: &TimelineViewport,
        now: Instant,
    ) -> Option<&Preview>
    where
        S: TaskStore + FactoryRegistry + ?Sized,
    {
        let Some(Gesture::Resizing(rs)) = self.gesture else {
            return None;
        };
        let Some(task) = store.task(rs.task_id) else {
            self.abandon_stale(GestureKind::Resize(rs.edge), rs.task_id);
            return None;
        };
        self.last_activity = Some(now);

        let origin = rs.origin;
        let siblings = || {
            store
                .tasks()
                .iter()
                .filter(move |t| t.factory_id == task.factory_id && t.id != task.id)
        };

        let range = match rs.edge {
            ResizeEdge::Start => {
                let snapped = resize_edge_to_date(
                    pointer_x,
                    viewport.pixels_per_day,
                    viewport.calendar_days(),
                    ResizeEdge::Start,
                )
                .unwrap_or(origin.start);
                let mut start = snapped.min(origin.end);
                let blocker_end = siblings()
                    .filter(|t| t.end < origin.start && t.end >= start)
                    .map(|t| t.end)
                    .max();
                if let Some(end) = blocker_end {
                    start = add_days(end, 1);
                }
                DateRange::new(start, origin.end)
            }
            ResizeEdge::End => {
                let snapped = resize_edge_to_date(
                    pointer_x,
                    viewport.pixels_per_day,
                    viewport.calendar_days(),
                    ResizeEdge::End,
                )
                .unwrap_or(origin.end);
                let mut end = snapped.max(origin.start);
                let blocker_start = siblings()
                    .filter(|t| t.start > origin.end && t.start <= end)
                    .map(|t| t.start)
                    .min();
                if let Some(start) = blocker_start {
                    end = add_days(start, -1);
                }
                DateRange::new(origin.start, end)
            }
        };
        let range = if range.is_ordered() {
            range
        } else {
            debug!(task_id = %task.id, start = %range.start, end = %range.end, "inverted resize range, clamping end to start");
            DateRange::normalized(range.start, range.end)
        };

        let overlapping = collides(store.tasks(), task.id, task.factory_id, range);
        let preview = Preview {
            task_id: task.id,
            factory_id: task.factory_id,
            range,
            compatible: true,
            overlapping,
            reason: None,
            tooltip: tooltip_for(store, task.factory_id, range, overlapping),
        };

        self.observer.on_event(&GestureEvent::PreviewUpdated(&preview));
        self.preview = Some(preview);
        self.preview.as_ref()
    }

    /// Commit the last resize preview and start the click-suppression window.
    pub fn end_resize<S>(&mut self, store: &mut S, now: Instant) -> Outcome
    where
        S: TaskStore + ?Sized,
    {
        let Some(Gesture::Resizing(rs)) = self.gesture else {
            return Outcome::Discarded;
        };
        self.gesture = None;
        let preview = self.preview.take();
        self.suppress_clicks(now);

        let Some(preview) = preview else {
            self.observer.on_event(&GestureEvent::Discarded {
                kind: GestureKind::Resize(rs.edge),
                task_id: Some(rs.task_id),
                reason: "released without movement",
            });
            return Outcome::Discarded;
        };
        if store.task(rs.task_id).is_none() {
            self.abandon_stale(GestureKind::Resize(rs.edge), rs.task_id);
            return Outcome::Discarded;
        }
        self.commit(
            GestureKind::Resize(rs.edge),
            store,
            rs.task_id,
            TaskPatch::dates(preview.range),
            None,
        )
    }

    // ── Select ──────────────────────────────────────────────────

    /// Press on a factory row checkbox: toggle it and remember whether this
    /// gesture selects or deselects.
    pub fn start_select(&mut self, anchor: FactoryId, selection: &mut FactorySelection, now: Instant) {
        let action = if selection.contains(anchor) {
            SelectAction::Deselect
        } else {
            SelectAction::Select
        };
        selection.apply(action, anchor);
        self.begin(Gesture::Selecting { anchor, action }, Some(anchor), now);
    }

    /// Pointer passed over another row while selecting.
    pub fn update_select(&mut self, factory_id: FactoryId, selection: &mut FactorySelection, now: Instant) -> bool {
        let Some(Gesture::Selecting { action, .. }) = self.gesture else {
            return false;
        };
        selection.apply(action, factory_id);
        self.last_activity = Some(now);
        true
    }

    pub fn end_select(&mut self) -> bool {
        if self.is_selecting() {
            self.gesture = None;
            true
        } else {
            false
        }
    }

    // ── Housekeeping ────────────────────────────────────────────

    /// Abort whatever is in flight without committing.
    pub fn cancel(&mut self) -> bool {
        self.clear_with("cancelled")
    }

    /// Force the engine back to idle if the active gesture has seen no
    /// activity for the configured stuck timeout. Returns whether it did.
    pub fn expire_stale(&mut self, now: Instant) -> bool {
        let timed_out = self.gesture.is_some()
            && self.last_activity.map_or(true, |last| {
                now.saturating_duration_since(last) >= self.config.stuck_timeout()
            });
        timed_out && self.clear_with("no pointer activity before stuck timeout")
    }

    /// The single place a gesture is entered. Anything still in flight is
    /// cleared first.
    fn begin(&mut self, gesture: Gesture, factory_id: Option<FactoryId>, now: Instant) {
        if let Some(previous) = self.gesture.take() {
            self.observer.on_event(&GestureEvent::Superseded {
                previous: previous.kind(),
            });
        }
        self.preview = None;
        self.last_activity = Some(now);
        self.observer.on_event(&GestureEvent::Started {
            kind: gesture.kind(),
            task_id: gesture.task_id(),
            factory_id,
        });
        self.gesture = Some(gesture);
    }

    fn clear_with(&mut self, reason: &'static str) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        self.preview = None;
        self.observer.on_event(&GestureEvent::Discarded {
            kind: gesture.kind(),
            task_id: gesture.task_id(),
            reason,
        });
        true
    }

    fn abandon_stale(&mut self, kind: GestureKind, task_id: TaskId) {
        self.gesture = None;
        self.preview = None;
        self.observer.on_event(&GestureEvent::Discarded {
            kind,
            task_id: Some(task_id),
            reason: "task no longer exists",
        });
    }

    fn suppress_clicks(&mut self, now: Instant) {
        self.released_at = Some(now);
    }

    fn commit<S>(
        &mut self,
        kind: GestureKind,
        store: &mut S,
        task_id: TaskId,
        patch: TaskPatch,
        notice: Option<EngineError>,
    ) -> Outcome
    where
        S: TaskStore + ?Sized,
    {
        match store.update_task(task_id, patch) {
            Ok(task) => {
                self.observer.on_event(&GestureEvent::Committed { kind, task: &task });
                Outcome::Committed { task, notice }
            }
            Err(EngineError::StaleTaskReference(id)) => {
                self.abandon_stale(kind, id);
                Outcome::Discarded
            }
            Err(error) => {
                self.observer.on_event(&GestureEvent::Rejected {
                    kind,
                    task_id,
                    error: &error,
                });
                Outcome::Rejected(error)
            }
        }
    }
}

fn collides(tasks: &[Task], task_id: TaskId, factory_id: FactoryId, range: DateRange) -> bool {
    tasks
        .iter()
        .any(|t| t.factory_id == factory_id && t.id != task_id && t.range().overlaps(&range))
}

fn tooltip_for<S>(store: &S, factory_id: FactoryId, range: DateRange, overlapping: bool) -> String
where
    S: FactoryRegistry + ?Sized,
{
    let name = store
        .factory(factory_id)
        .map_or("Unknown factory", |f| f.name.as_str());
    let mut text = format!(
        "{name} · {} → {}",
        range.start.format("%d/%m/%Y"),
        range.end.format("%d/%m/%Y"),
    );
    if overlapping {
        text.push_str(" (overlaps, will shift on drop)");
    }
    text
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use chrono::NaiveDate;

    use super::*;
    use crate::model::{FactoryType, NewTask, Plan};

    const CELL: f32 = 20.0;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    fn viewport() -> TimelineViewport {
        TimelineViewport::new(d(1, 1), d(3, 31), CELL)
    }

    fn x_of(vp: &TimelineViewport, date: NaiveDate) -> f32 {
        vp.date_to_x(date)
    }

    struct Fixture {
        plan: Plan,
        plant_a: FactoryId,
        plant_b: FactoryId,
        yard: FactoryId,
    }

    fn fixture() -> Fixture {
        let mut plan = Plan::new("test");
        let plant_a = plan.add_factory(Factory::new("Plant A", FactoryType::Manufacturing));
        let plant_b = plan.add_factory(Factory::new("Plant B", FactoryType::Manufacturing));
        let yard = plan.add_factory(Factory::new("Yard", FactoryType::Container));
        Fixture {
            plan,
            plant_a,
            plant_b,
            yard,
        }
    }

    fn add(plan: &mut Plan, factory: FactoryId, start: NaiveDate, end: NaiveDate) -> TaskId {
        plan.add_task(NewTask::new("job", factory, DateRange::new(start, end)))
            .id
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl GestureObserver for Recorder {
        fn on_event(&self, event: &GestureEvent<'_>) {
            let label = match event {
                GestureEvent::Started { .. } => "started",
                GestureEvent::Superseded { .. } => "superseded",
                GestureEvent::PreviewUpdated(_) => "preview",
                GestureEvent::Committed { .. } => "committed",
                GestureEvent::Rejected { .. } => "rejected",
                GestureEvent::Discarded { .. } => "discarded",
            };
            self.0.borrow_mut().push(label.to_string());
        }
    }

    #[test]
    fn drag_moves_task_by_whole_days() {
        let mut fx = fixture();
        let id = add(&mut fx.plan, fx.plant_a, d(1, 5), d(1, 7));
        let vp = viewport();
        let mut engine = InteractionEngine::default();
        let now = Instant::now();

        let grab = x_of(&vp, d(1, 6));
        assert!(engine.start_drag(id, grab, &fx.plan, now));
        let preview = engine
            .update_drag(grab + 3.0 * CELL + 4.0, Some(fx.plant_a), &fx.plan, &vp, now)
            .cloned()
            .unwrap();
        assert_eq!(preview.range, DateRange::new(d(1, 8), d(1, 10)));
        assert!(preview.is_valid());

        let outcome = engine.end_drag(grab + 3.0 * CELL, Some(fx.plant_a), &mut fx.plan, &vp, now);
        let Outcome::Committed { task, notice } = outcome else {
            panic!("expected commit, got {outcome:?}");
        };
        assert_eq!((task.start, task.end), (d(1, 8), d(1, 10)));
        assert!(notice.is_none());
        assert!(engine.is_idle());
    }

    #[test]
    fn drag_to_compatible_factory_moves_lane() {
        let mut fx = fixture();
        let id = add(&mut fx.plan, fx.plant_a, d(1, 5), d(1, 7));
        let vp = viewport();
        let mut engine = InteractionEngine::default();
        let now = Instant::now();

        let grab = x_of(&vp, d(1, 5));
        engine.start_drag(id, grab, &fx.plan, now);
        let outcome = engine.end_drag(grab, Some(fx.plant_b), &mut fx.plan, &vp, now);
        assert!(matches!(outcome, Outcome::Committed { .. }));
        let task = fx.plan.task(id).unwrap();
        assert_eq!(task.factory_id, fx.plant_b);
        assert_eq!(task.factory_name, "Plant B");
    }

    #[test]
    fn incompatible_hover_keeps_last_valid_preview() {
        let mut fx = fixture();
        let id = add(&mut fx.plan, fx.plant_a, d(1, 5), d(1, 7));
        let vp = viewport();
        let mut engine = InteractionEngine::default();
        let now = Instant::now();

        let grab = x_of(&vp, d(1, 5));
        engine.start_drag(id, grab, &fx.plan, now);
        engine.update_drag(grab + 2.0 * CELL, Some(fx.plant_b), &fx.plan, &vp, now);
        let preview = engine
            .update_drag(grab + 6.0 * CELL, Some(fx.yard), &fx.plan, &vp, now)
            .cloned()
            .unwrap();

        assert!(!preview.compatible);
        assert_eq!(preview.factory_id, fx.plant_b);
        assert_eq!(preview.range, DateRange::new(d(1, 7), d(1, 9)));
        assert!(preview.reason.unwrap().contains("Yard (container)"));
    }

    #[test]
    fn drop_on_overlap_shifts_past_sibling() {
        let mut fx = fixture();
        add(&mut fx.plan, fx.plant_a, d(1, 10), d(1, 14));
        let id = add(&mut fx.plan, fx.plant_a, d(1, 1), d(1, 2));
        let vp = viewport();
        let mut engine = InteractionEngine::default();
        let now = Instant::now();

        let grab = x_of(&vp, d(1, 1));
        engine.start_drag(id, grab, &fx.plan, now);
        let preview = engine
            .update_drag(x_of(&vp, d(1, 11)), Some(fx.plant_a), &fx.plan, &vp, now)
            .cloned()
            .unwrap();
        assert!(preview.overlapping);
        assert!(!preview.is_valid());

        engine.end_drag(x_of(&vp, d(1, 11)), Some(fx.plant_a), &mut fx.plan, &vp, now);
        let task = fx.plan.task(id).unwrap();
        assert_eq!((task.start, task.end), (d(1, 15), d(1, 16)));
    }

    #[test]
    fn stale_task_mid_drag_is_discarded() {
        let mut fx = fixture();
        let id = add(&mut fx.plan, fx.plant_a, d(1, 5), d(1, 7));
        let vp = viewport();
        let recorder = Recorder::default();
        let mut engine = InteractionEngine::with_observer(EngineConfig::default(), recorder.clone());
        let now = Instant::now();

        engine.start_drag(id, 0.0, &fx.plan, now);
        fx.plan.delete_task(id);
        assert!(engine.update_drag(40.0, Some(fx.plant_a), &fx.plan, &vp, now).is_none());
        assert!(engine.is_idle());

        let outcome = engine.end_drag(40.0, Some(fx.plant_a), &mut fx.plan, &vp, now);
        assert_eq!(outcome, Outcome::Discarded);
        assert!(recorder.0.borrow().contains(&"discarded".to_string()));
    }

    #[test]
    fn bar_starting_before_viewport_keeps_its_dates_on_tiny_drag() {
        let mut fx = fixture();
        let early = NaiveDate::from_ymd_opt(2024, 12, 28).unwrap();
        let id = add(&mut fx.plan, fx.plant_a, early, d(1, 5));
        let vp = viewport();
        let mut engine = InteractionEngine::default();
        let now = Instant::now();

        let grab = x_of(&vp, d(1, 2));
        engine.start_drag(id, grab, &fx.plan, now);
        let outcome = engine.end_drag(grab + 1.0, Some(fx.plant_a), &mut fx.plan, &vp, now);
        let Outcome::Committed { task, .. } = outcome else {
            panic!("expected commit, got {outcome:?}");
        };
        assert_eq!((task.start, task.end), (early, d(1, 5)));

        engine.start_drag(id, grab, &fx.plan, now);
        let preview = engine
            .update_drag(grab + 2.0 * CELL, Some(fx.plant_a), &fx.plan, &vp, now)
            .cloned()
            .unwrap();
        let two_later = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        assert_eq!(preview.range, DateRange::new(two_later, d(1, 7)));
    }

    #[test]
    fn release_after_task_vanished_still_swallows_click() {
        let mut fx = fixture();
        let id = add(&mut fx.plan, fx.plant_a, d(1, 5), d(1, 7));
        let vp = viewport();
        let mut engine = InteractionEngine::default();
        let now = Instant::now();

        engine.start_drag(id, 0.0, &fx.plan, now);
        fx.plan.delete_task(id);
        let outcome = engine.end_drag(40.0, Some(fx.plant_a), &mut fx.plan, &vp, now);

        assert_eq!(outcome, Outcome::Discarded);
        assert!(engine.is_idle());
        assert!(engine.should_suppress_click(now + Duration::from_millis(10)));
    }

    #[test]
    fn huge_click_suppression_does_not_overflow() {
        let mut fx = fixture();
        let id = add(&mut fx.plan, fx.plant_a, d(1, 5), d(1, 7));
        let vp = viewport();
        let config = EngineConfig {
            click_suppression_ms: u64::MAX,
            ..EngineConfig::default()
        };
        let mut engine = InteractionEngine::new(config);
        let now = Instant::now();

        engine.start_drag(id, x_of(&vp, d(1, 5)), &fx.plan, now);
        engine.end_drag(x_of(&vp, d(1, 6)), Some(fx.plant_a), &mut fx.plan, &vp, now);
        assert!(engine.should_suppress_click(now + Duration::from_secs(3600)));
    }

    #[test]
    fn start_drag_on_missing_task_stays_idle() {
        let fx = fixture();
        let mut engine = InteractionEngine::default();
        assert!(!engine.start_drag(TaskId::new(), 0.0, &fx.plan, Instant::now()));
        assert!(engine.is_idle());
    }

    #[test]
    fn end_edge_stops_before_next_sibling() {
        let mut fx = fixture();
        let id = add(&mut fx.plan, fx.plant_a, d(1, 5), d(1, 7));
        add(&mut fx.plan, fx.plant_a, d(1, 12), d(1, 15));
        let vp = viewport();
        let mut engine = InteractionEngine::default();
        let now = Instant::now();

        engine.start_resize(id, ResizeEdge::End, &fx.plan, now);
        let preview = engine
            .update_resize(x_of(&vp, d(1, 20)) + CELL * 0.75, &fx.plan, &vp, now)
            .cloned()
            .unwrap();
        assert_eq!(preview.range, DateRange::new(d(1, 5), d(1, 11)));
        assert!(!preview.overlapping);
    }

    #[test]
    fn start_edge_stops_after_previous_sibling() {
        let mut fx = fixture();
        add(&mut fx.plan, fx.plant_a, d(1, 2), d(1, 4));
        let id = add(&mut fx.plan, fx.plant_a, d(1, 10), d(1, 12));
        let vp = viewport();
        let mut engine = InteractionEngine::default();
        let now = Instant::now();

        engine.start_resize(id, ResizeEdge::Start, &fx.plan, now);
        let preview = engine
            .update_resize(x_of(&vp, d(1, 1)), &fx.plan, &vp, now)
            .cloned()
            .unwrap();
        assert_eq!(preview.range, DateRange::new(d(1, 5), d(1, 12)));
    }

    #[test]
    fn start_edge_cannot_pass_end() {
        let mut fx = fixture();
        let id = add(&mut fx.plan, fx.plant_a, d(1, 10), d(1, 12));
        let vp = viewport();
        let mut engine = InteractionEngine::default();
        let now = Instant::now();

        engine.start_resize(id, ResizeEdge::Start, &fx.plan, now);
        let preview = engine
            .update_resize(x_of(&vp, d(1, 25)), &fx.plan, &vp, now)
            .cloned()
            .unwrap();
        assert_eq!(preview.range, DateRange::new(d(1, 12), d(1, 12)));
    }

    #[test]
    fn resize_commit_sets_click_suppression() {
        let mut fx = fixture();
        let id = add(&mut fx.plan, fx.plant_a, d(1, 10), d(1, 12));
        let vp = viewport();
        let mut engine = InteractionEngine::default();
        let now = Instant::now();

        engine.start_resize(id, ResizeEdge::End, &fx.plan, now);
        engine.update_resize(x_of(&vp, d(1, 14)) + CELL * 0.6, &fx.plan, &vp, now);
        let outcome = engine.end_resize(&mut fx.plan, now);
        assert!(matches!(outcome, Outcome::Committed { .. }));
        assert_eq!(fx.plan.task(id).unwrap().end, d(1, 14));

        assert!(engine.should_suppress_click(now));
        let later = now + engine.config().click_suppression() + Duration::from_millis(1);
        assert!(!engine.should_suppress_click(later));
    }

    #[test]
    fn release_without_movement_commits_nothing() {
        let mut fx = fixture();
        let id = add(&mut fx.plan, fx.plant_a, d(1, 10), d(1, 12));
        let mut engine = InteractionEngine::default();
        let now = Instant::now();

        engine.start_resize(id, ResizeEdge::Start, &fx.plan, now);
        assert_eq!(engine.end_resize(&mut fx.plan, now), Outcome::Discarded);
        assert!(engine.is_idle());
    }

    #[test]
    fn new_gesture_clears_the_old_one() {
        let mut fx = fixture();
        let id = add(&mut fx.plan, fx.plant_a, d(1, 10), d(1, 12));
        let vp = viewport();
        let recorder = Recorder::default();
        let mut engine = InteractionEngine::with_observer(EngineConfig::default(), recorder.clone());
        let now = Instant::now();

        engine.start_resize(id, ResizeEdge::End, &fx.plan, now);
        engine.update_resize(x_of(&vp, d(1, 14)), &fx.plan, &vp, now);
        engine.start_drag(id, 0.0, &fx.plan, now);

        assert!(engine.is_dragging());
        assert!(!engine.is_resizing());
        assert_eq!(engine.resize_edge(), None);
        assert!(engine.preview().is_none());
        assert!(recorder.0.borrow().contains(&"superseded".to_string()));
    }

    #[test]
    fn drag_select_applies_anchor_action() {
        let fx = fixture();
        let mut selection = FactorySelection::default();
        let mut engine = InteractionEngine::default();
        let now = Instant::now();

        engine.start_select(fx.plant_a, &mut selection, now);
        engine.update_select(fx.plant_b, &mut selection, now);
        engine.update_select(fx.yard, &mut selection, now);
        assert!(engine.end_select());
        assert_eq!(selection.len(), 3);

        // Starting on a selected row deselects everything passed over.
        engine.start_select(fx.plant_b, &mut selection, now);
        assert_eq!(
            engine.mode(),
            InteractionMode::Selecting {
                anchor: fx.plant_b,
                action: SelectAction::Deselect
            }
        );
        engine.update_select(fx.yard, &mut selection, now);
        engine.end_select();
        assert!(selection.contains(fx.plant_a));
        assert!(!selection.contains(fx.plant_b));
        assert!(!selection.contains(fx.yard));
    }

    #[test]
    fn update_select_outside_gesture_is_ignored() {
        let fx = fixture();
        let mut selection = FactorySelection::default();
        let mut engine = InteractionEngine::default();
        assert!(!engine.update_select(fx.plant_a, &mut selection, Instant::now()));
        assert!(selection.is_empty());
    }

    #[test]
    fn stuck_gesture_expires() {
        let mut fx = fixture();
        let id = add(&mut fx.plan, fx.plant_a, d(1, 10), d(1, 12));
        let mut engine = InteractionEngine::default();
        let now = Instant::now();

        engine.start_drag(id, 0.0, &fx.plan, now);
        assert!(!engine.expire_stale(now + Duration::from_millis(10)));
        assert!(engine.is_dragging());

        let later = now + engine.config().stuck_timeout();
        assert!(engine.expire_stale(later));
        assert!(engine.is_idle());
    }

    #[test]
    fn cancel_discards_preview() {
        let mut fx = fixture();
        let id = add(&mut fx.plan, fx.plant_a, d(1, 10), d(1, 12));
        let vp = viewport();
        let mut engine = InteractionEngine::default();
        let now = Instant::now();

        engine.start_drag(id, 0.0, &fx.plan, now);
        engine.update_drag(CELL * 3.0, Some(fx.plant_a), &fx.plan, &vp, now);
        assert!(engine.cancel());
        assert!(engine.preview().is_none());
        assert!(!engine.cancel());
        assert_eq!(fx.plan.task(id).unwrap().start, d(1, 10));
    }
}
