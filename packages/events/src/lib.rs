#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Timestamped crime events and evaluation time windows.
//!
//! Events carry a timestamp and a planar (easting/northing, meters)
//! coordinate, and are kept sorted by timestamp so that train/test slicing is
//! a pair of binary searches. Durations across the configuration surface use
//! a compact shorthand (`"1D"`, `"8W"`, `"6M"`, `"1Y"`) parsed by
//! [`TimeSpan`].

pub mod load;
pub mod timespan;
pub mod windows;

use chrono::NaiveDateTime;
use geo::{Contains, MultiPolygon, Point};
use thiserror::Error;

pub use timespan::{TimeSpan, TimeUnit};
pub use windows::{EvalWindow, test_date_range};

/// Errors produced while loading events or handling durations.
#[derive(Debug, Error)]
pub enum EventError {
    /// Failed to read the input file.
    #[error("failed to read events file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV input.
    #[error("failed to parse events CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A row was missing a required column.
    #[error("events CSV row {row} is missing column {column}")]
    MissingColumn {
        /// 1-based data row number.
        row: u64,
        /// 0-based column index.
        column: usize,
    },

    /// A timestamp did not match the configured format.
    #[error("failed to parse timestamp {value:?} with format {format:?}")]
    BadTimestamp {
        /// The offending timestamp text.
        value: String,
        /// The configured strftime format.
        format: String,
    },

    /// A coordinate field was not numeric.
    #[error("failed to parse coordinate {value:?} on row {row}")]
    BadCoordinate {
        /// The offending coordinate text.
        value: String,
        /// 1-based data row number.
        row: u64,
    },

    /// Malformed duration shorthand.
    #[error("invalid duration shorthand {value:?}: expected <count><D|W|M|Y>, e.g. \"8W\"")]
    BadTimeSpan {
        /// The offending shorthand text.
        value: String,
    },

    /// Date arithmetic left the representable range.
    #[error("date arithmetic out of range: {date} offset by {span}")]
    DateOutOfRange {
        /// The starting date.
        date: chrono::NaiveDate,
        /// The span applied to it.
        span: TimeSpan,
    },
}

/// A single crime event: when and where it occurred.
///
/// Coordinates are planar meters (easting/northing). Immutable once loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// When the event occurred.
    pub timestamp: NaiveDateTime,
    /// Easting in meters.
    pub x: f64,
    /// Northing in meters.
    pub y: f64,
}

impl Event {
    /// Creates an event.
    #[must_use]
    pub const fn new(timestamp: NaiveDateTime, x: f64, y: f64) -> Self {
        Self { timestamp, x, y }
    }
}

/// Returns the contiguous slice of events with `start <= timestamp < end`.
///
/// Requires `events` sorted by timestamp ascending (the loader guarantees
/// this). Half-open bounds keep adjacent train/test windows disjoint: an
/// event at exactly the test-window start belongs to the test data only.
#[must_use]
pub fn events_between(events: &[Event], start: NaiveDateTime, end: NaiveDateTime) -> &[Event] {
    let lo = events.partition_point(|e| e.timestamp < start);
    let hi = events.partition_point(|e| e.timestamp < end);
    &events[lo..hi]
}

/// Filters events to those inside the region geometry.
#[must_use]
pub fn events_in_region(events: &[Event], region: &MultiPolygon<f64>) -> Vec<Event> {
    events
        .iter()
        .copied()
        .filter(|e| region.contains(&Point::new(e.x, e.y)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use geo::polygon;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn slices_half_open_range() {
        let events = vec![
            Event::new(at(1, 0), 0.0, 0.0),
            Event::new(at(2, 12), 0.0, 0.0),
            Event::new(at(5, 0), 0.0, 0.0),
            Event::new(at(8, 0), 0.0, 0.0),
        ];
        let slice = events_between(&events, at(2, 0), at(8, 0));
        assert_eq!(slice.len(), 2);
        assert_eq!(slice[0].timestamp, at(2, 12));
        assert_eq!(slice[1].timestamp, at(5, 0));
    }

    #[test]
    fn boundary_event_belongs_to_later_window() {
        let events = vec![Event::new(at(5, 0), 0.0, 0.0)];
        // Train window ends at day 5; test window starts there.
        assert!(events_between(&events, at(1, 0), at(5, 0)).is_empty());
        assert_eq!(events_between(&events, at(5, 0), at(9, 0)).len(), 1);
    }

    #[test]
    fn empty_slice_for_empty_window() {
        let events = vec![Event::new(at(1, 0), 0.0, 0.0)];
        assert!(events_between(&events, at(2, 0), at(3, 0)).is_empty());
    }

    #[test]
    fn filters_events_to_region() {
        let region = MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ]]);
        let events = vec![
            Event::new(at(1, 0), 5.0, 5.0),
            Event::new(at(2, 0), 15.0, 5.0),
        ];
        let kept = events_in_region(&events, &region);
        assert_eq!(kept.len(), 1);
        assert!((kept[0].x - 5.0).abs() < f64::EPSILON);
    }
}
