use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::engine::coords::add_days;

/// An inclusive `[start, end]` span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping nothing: callers that can produce an inverted
    /// pair should go through [`DateRange::normalized`].
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A range starting at `start` whose end lies `duration_days` later.
    /// Negative durations collapse to a single day.
    pub fn with_duration(start: NaiveDate, duration_days: i64) -> Self {
        Self {
            start,
            end: add_days(start, duration_days.max(0)),
        }
    }

    /// Clamp `end` up to `start` when the pair is inverted.
    pub fn normalized(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    /// Number of days between start and end (0 for a single-day range).
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Closed-interval intersection test.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        !(self.end < other.start || self.start > other.end)
    }

    /// Same duration, moved so that it begins on `start`.
    pub fn shifted_to(&self, start: NaiveDate) -> Self {
        Self::with_duration(start, self.duration_days())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn single_day_ranges_touching_overlap() {
        let a = DateRange::new(d(2025, 1, 5), d(2025, 1, 5));
        let b = DateRange::new(d(2025, 1, 5), d(2025, 1, 9));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn adjacent_ranges_do_not_overlap() {
        let a = DateRange::new(d(2025, 1, 1), d(2025, 1, 5));
        let b = DateRange::new(d(2025, 1, 6), d(2025, 1, 9));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn shifted_keeps_duration() {
        let a = DateRange::new(d(2025, 1, 3), d(2025, 1, 6));
        let moved = a.shifted_to(d(2025, 1, 10));
        assert_eq!(moved, DateRange::new(d(2025, 1, 10), d(2025, 1, 13)));
    }

    #[test]
    fn normalized_clamps_end_to_start() {
        let r = DateRange::normalized(d(2025, 3, 4), d(2025, 3, 1));
        assert_eq!(r.start, r.end);
        assert!(r.is_ordered());
    }
}
