//! Lifecycle hook for gestures.
//!
//! The [`InteractionEngine`](super::InteractionEngine) reports every gesture
//! start, preview update, commit, rejection and discard through a
//! [`GestureObserver`]. The default observer turns them into `tracing`
//! events; hosts and tests can inject their own.

use tracing::{debug, info, warn};

use super::coords::ResizeEdge;
use super::interaction::Preview;
use crate::error::EngineError;
use crate::model::{FactoryId, Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize(ResizeEdge),
    Select,
}

#[derive(Debug)]
pub enum GestureEvent<'a> {
    Started {
        kind: GestureKind,
        task_id: Option<TaskId>,
        factory_id: Option<FactoryId>,
    },
    /// A gesture still in flight was cleared because another one started.
    Superseded { previous: GestureKind },
    PreviewUpdated(&'a Preview),
    Committed { kind: GestureKind, task: &'a Task },
    Rejected {
        kind: GestureKind,
        task_id: TaskId,
        error: &'a EngineError,
    },
    Discarded {
        kind: GestureKind,
        task_id: Option<TaskId>,
        reason: &'static str,
    },
}

pub trait GestureObserver {
    fn on_event(&self, event: &GestureEvent<'_>);
}

/// Emits each lifecycle event as a structured `tracing` record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl GestureObserver for TracingObserver {
    fn on_event(&self, event: &GestureEvent<'_>) {
        match event {
            GestureEvent::Started {
                kind,
                task_id,
                factory_id,
            } => {
                debug!(?kind, task_id = ?task_id, factory_id = ?factory_id, "gesture started");
            }
            GestureEvent::Superseded { previous } => {
                debug!(?previous, "cleared gesture still in flight");
            }
            GestureEvent::PreviewUpdated(preview) => {
                debug!(
                    task_id = %preview.task_id,
                    factory_id = %preview.factory_id,
                    start = %preview.range.start,
                    end = %preview.range.end,
                    compatible = preview.compatible,
                    overlapping = preview.overlapping,
                    "preview updated"
                );
            }
            GestureEvent::Committed { kind, task } => {
                info!(
                    ?kind,
                    task_id = %task.id,
                    factory_id = %task.factory_id,
                    start = %task.start,
                    end = %task.end,
                    "gesture committed"
                );
            }
            GestureEvent::Rejected {
                kind,
                task_id,
                error,
            } => {
                warn!(?kind, %task_id, reason = ?error.kind(), "gesture rejected: {error}");
            }
            GestureEvent::Discarded {
                kind,
                task_id,
                reason,
            } => {
                warn!(?kind, task_id = ?task_id, reason, "gesture discarded");
            }
        }
    }
}
