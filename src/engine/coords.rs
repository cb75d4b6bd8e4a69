//! Pixel ↔ day-index ↔ date conversions.
//!
//! The visible timeline is a contiguous, ordered slice of calendar days, each
//! `cell_width` pixels wide. Two snapping policies exist: free dragging rounds
//! to the nearest day boundary, while resize handles use a half-cell
//! threshold so an edge only jumps once the pointer is past the middle of a
//! day.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Which edge of a task bar a resize gesture moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeEdge {
    Start,
    End,
}

/// Every day from `start` to `end` inclusive.
pub fn calendar_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Map a pixel offset to a date using free-drag snapping
/// (`round(offset / cell_width)`), clamped to the visible days.
///
/// Returns `None` only when `calendar_days` is empty.
pub fn pixel_to_date(offset: f32, cell_width: f32, calendar_days: &[NaiveDate]) -> Option<NaiveDate> {
    if calendar_days.is_empty() {
        return None;
    }
    let index = if usable_width(cell_width) {
        (offset / cell_width).round() as i64
    } else {
        0
    };
    Some(calendar_days[clamp_index(index, calendar_days.len())])
}

/// Map a pixel offset to a date for a resize handle.
///
/// Within a cell, the left half snaps the end edge back to the previous day and
/// keeps the start edge on the current day; the right half keeps the end edge
/// on the current day and pushes the start edge to the next day.
pub fn resize_edge_to_date(
    offset: f32,
    cell_width: f32,
    calendar_days: &[NaiveDate],
    edge: ResizeEdge,
) -> Option<NaiveDate> {
    if calendar_days.is_empty() {
        return None;
    }
    if !usable_width(cell_width) {
        return calendar_days.first().copied();
    }

    let cell = (offset / cell_width).floor();
    let within = offset - cell * cell_width;
    let past_half = within >= cell_width / 2.0;
    let cell = cell as i64;

    let index = match (edge, past_half) {
        (ResizeEdge::End, false) => cell - 1,
        (ResizeEdge::End, true) => cell,
        (ResizeEdge::Start, false) => cell,
        (ResizeEdge::Start, true) => cell + 1,
    };
    Some(calendar_days[clamp_index(index, calendar_days.len())])
}

/// Whole days covered by a pointer movement of `delta` pixels, rounded to the
/// nearest day. Unlike [`pixel_to_date`] this is not clamped, so it moves
/// bars that start or end outside the visible days.
pub fn pixel_delta_to_days(delta: f32, cell_width: f32) -> i64 {
    if !usable_width(cell_width) || !delta.is_finite() {
        return 0;
    }
    (delta / cell_width).round() as i64
}

/// Left pixel offset of `date`. Exact inverse of [`pixel_to_date`] for every
/// date in `calendar_days`; extrapolated linearly for dates outside it.
pub fn date_to_pixel(date: NaiveDate, calendar_days: &[NaiveDate], cell_width: f32) -> f32 {
    match calendar_days.first() {
        Some(first) => (date - *first).num_days() as f32 * cell_width,
        None => 0.0,
    }
}

/// Whole days from `a` to `b` (negative when `b` precedes `a`).
pub fn duration_days(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// `date + n` days, saturating at the representable calendar bounds.
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    Duration::try_days(n)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

fn usable_width(cell_width: f32) -> bool {
    cell_width.is_finite() && cell_width > 0.0
}

fn clamp_index(index: i64, len: usize) -> usize {
    let last = len.saturating_sub(1) as i64;
    index.clamp(0, last) as usize
}
