//! Error taxonomy for the scheduling engine.
//!
//! Only the terminal step of a gesture (or a direct store call) ever returns
//! one of these. Pointer-move handlers correct problems locally instead.

use chrono::NaiveDate;

use crate::model::{FactoryId, TaskId};

/// Reason code for an [`EngineError`], for callers that branch on the kind
/// rather than the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    IncompatibleFactory,
    SlotSearchExhausted,
    StaleTaskReference,
    InvalidDateOrder,
    DependencyIncomplete,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Source and target factory types differ; nothing was changed.
    #[error("{message}")]
    IncompatibleFactory {
        from_factory: FactoryId,
        to_factory: FactoryId,
        message: String,
    },

    /// No conflict-free range within the search horizon. The returned range
    /// may still collide.
    #[error("no free slot found in factory {factory_id} after {attempts} attempts; the task may overlap existing work")]
    SlotSearchExhausted { factory_id: FactoryId, attempts: usize },

    /// The task was removed while a gesture was in flight.
    #[error("task {0} no longer exists")]
    StaleTaskReference(TaskId),

    #[error("start date {start} is after end date {end}")]
    InvalidDateOrder { start: NaiveDate, end: NaiveDate },

    #[error("task {task} is waiting on {} unfinished prerequisite(s)", blocking.len())]
    DependencyIncomplete { task: TaskId, blocking: Vec<TaskId> },
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::IncompatibleFactory { .. } => ErrorKind::IncompatibleFactory,
            EngineError::SlotSearchExhausted { .. } => ErrorKind::SlotSearchExhausted,
            EngineError::StaleTaskReference(_) => ErrorKind::StaleTaskReference,
            EngineError::InvalidDateOrder { .. } => ErrorKind::InvalidDateOrder,
            EngineError::DependencyIncomplete { .. } => ErrorKind::DependencyIncomplete,
        }
    }

    /// Whether the message belongs in front of the user. Stale references and
    /// date-order corrections are internal and only logged.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::IncompatibleFactory
                | ErrorKind::SlotSearchExhausted
                | ErrorKind::DependencyIncomplete
        )
    }
}
