use chrono::NaiveDate;

use crate::engine::coords;

/// Zoom bounds for `pixels_per_day`.
pub const MIN_PIXELS_PER_DAY: f32 = 4.0;
pub const MAX_PIXELS_PER_DAY: f32 = 80.0;

/// Controls what scale the timeline header displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineScale {
    Days,
    Weeks,
    Months,
}

/// The visible window of the timeline: a contiguous run of calendar days and
/// the pixel width of one day.
#[derive(Debug, Clone)]
pub struct TimelineViewport {
    /// The leftmost visible date.
    pub start: NaiveDate,
    /// The rightmost visible date.
    pub end: NaiveDate,
    /// Current header scale.
    pub scale: TimelineScale,
    /// Pixels per day (controls zoom level).
    pub pixels_per_day: f32,
    days: Vec<NaiveDate>,
}

impl TimelineViewport {
    /// `pixels_per_day` is brought inside the zoom bounds; a non-finite value
    /// falls back to the lower bound.
    pub fn new(start: NaiveDate, end: NaiveDate, pixels_per_day: f32) -> Self {
        let end = end.max(start);
        let pixels_per_day = if pixels_per_day.is_finite() {
            pixels_per_day.clamp(MIN_PIXELS_PER_DAY, MAX_PIXELS_PER_DAY)
        } else {
            MIN_PIXELS_PER_DAY
        };
        Self {
            start,
            end,
            scale: TimelineScale::Days,
            pixels_per_day,
            days: coords::calendar_days(start, end),
        }
    }

    /// The ordered, contiguous days currently on screen.
    pub fn calendar_days(&self) -> &[NaiveDate] {
        &self.days
    }

    /// Convert a date to an x-pixel offset from the viewport start.
    pub fn date_to_x(&self, date: NaiveDate) -> f32 {
        coords::date_to_pixel(date, &self.days, self.pixels_per_day)
    }

    /// Convert an x-pixel offset back to a date (free-drag snapping).
    pub fn x_to_date(&self, x: f32) -> Option<NaiveDate> {
        coords::pixel_to_date(x, self.pixels_per_day, &self.days)
    }

    /// Total width in pixels for the visible range, including the last day.
    pub fn total_width(&self) -> f32 {
        self.days.len() as f32 * self.pixels_per_day
    }

    /// Zoom in (increase pixels per day).
    pub fn zoom_in(&mut self) {
        self.pixels_per_day = (self.pixels_per_day * 1.2).min(MAX_PIXELS_PER_DAY);
    }

    /// Zoom out (decrease pixels per day).
    pub fn zoom_out(&mut self) {
        self.pixels_per_day = (self.pixels_per_day / 1.2).max(MIN_PIXELS_PER_DAY);
    }

    /// Scroll the viewport by a number of days.
    pub fn scroll_days(&mut self, days: i64) {
        self.set_range(
            coords::add_days(self.start, days),
            coords::add_days(self.end, days),
        );
    }

    /// Replace the visible range.
    pub fn set_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.start = start;
        self.end = end.max(start);
        self.days = coords::calendar_days(self.start, self.end);
    }
}
