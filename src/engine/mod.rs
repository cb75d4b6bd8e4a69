//! The scheduling and interaction engine.
//!
//! Pure functions for coordinate mapping, overlap detection, row packing,
//! slot search and compatibility, plus the [`InteractionEngine`] state
//! machine that drives drag / resize / select gestures. Nothing here knows
//! about rendering.

pub mod compat;
pub mod coords;
pub mod gating;
pub mod interaction;
pub mod observer;
pub mod overlap;
pub mod rows;
pub mod slots;

pub use compat::{check_compatibility, explain_incompatibility, is_compatible};
pub use coords::{
    add_days, date_to_pixel, duration_days, pixel_delta_to_days, pixel_to_date, resize_edge_to_date,
    ResizeEdge,
};
pub use interaction::{
    FactorySelection, InteractionEngine, InteractionMode, Outcome, Preview, SelectAction,
};
pub use observer::{GestureEvent, GestureKind, GestureObserver, TracingObserver};
pub use overlap::overlaps;
pub use rows::{assign_rows, layout_lanes, row_count, LaneLayout, RowAssignment, DEFAULT_MAX_ROWS};
pub use slots::{
    find_available_range, schedule_new_task, SlotSearch, DEFAULT_SEARCH_HORIZON,
};
