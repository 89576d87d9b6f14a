//! CSV event loading.
//!
//! Input files carry one header row and the columns
//! `[timestamp, x, y, crime_type, (optional) location_type]`. Coordinates are
//! expected in planar meters; sources that standardise to survey feet can set
//! [`LoadOptions::infeet`]. Geographic (long/lat) sources must be projected
//! to planar meters upstream before loading.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::{Event, EventError};

/// Meters per US survey foot is 1200/3937.
const FEET_IN_METERS: f64 = 3937.0 / 1200.0;

const COL_TIMESTAMP: usize = 0;
const COL_X: usize = 1;
const COL_Y: usize = 2;
const COL_CRIME_TYPE: usize = 3;

/// Options controlling event loading.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Crime-type labels to retain; rows with any other label are dropped.
    pub crime_types: BTreeSet<String>,
    /// strftime format of the timestamp column.
    pub date_format: String,
    /// Whether coordinates are in survey feet and need converting to meters.
    pub infeet: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            crime_types: BTreeSet::new(),
            date_format: "%m/%d/%Y %I:%M:%S %p".to_string(),
            infeet: false,
        }
    }
}

/// Loads events from a CSV file, filtered to the configured crime types and
/// sorted by timestamp ascending.
///
/// # Errors
///
/// Returns an error if the file is unreadable, a retained row is missing a
/// required column, or a retained row's timestamp or coordinates do not
/// parse. Rows filtered out by crime type are never parsed further.
pub fn load_events(path: &Path, options: &LoadOptions) -> Result<Vec<Event>, EventError> {
    let file = std::fs::File::open(path)?;
    let mut events = read_events(file, options)?;
    events.sort_by_key(|e| e.timestamp);
    log::info!(
        "Loaded {} events ({} crime types) from {}",
        events.len(),
        options.crime_types.len(),
        path.display()
    );
    Ok(events)
}

/// Reads events from any CSV source. Rows are returned in file order; callers
/// wanting the time-sorted invariant should use [`load_events`].
///
/// # Errors
///
/// Same conditions as [`load_events`].
pub fn read_events<R: std::io::Read>(
    reader: R,
    options: &LoadOptions,
) -> Result<Vec<Event>, EventError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut events = Vec::new();
    for (i, record) in csv_reader.records().enumerate() {
        let row = i as u64 + 1;
        let record = record?;

        let crime_type = record
            .get(COL_CRIME_TYPE)
            .ok_or(EventError::MissingColumn {
                row,
                column: COL_CRIME_TYPE,
            })?
            .trim();
        if !options.crime_types.is_empty() && !options.crime_types.contains(crime_type) {
            continue;
        }

        let timestamp = parse_timestamp(&record, row, &options.date_format)?;
        let mut x = parse_coordinate(&record, row, COL_X)?;
        let mut y = parse_coordinate(&record, row, COL_Y)?;
        if options.infeet {
            x /= FEET_IN_METERS;
            y /= FEET_IN_METERS;
        }

        events.push(Event::new(timestamp, x, y));
    }
    Ok(events)
}

fn parse_timestamp(
    record: &csv::StringRecord,
    row: u64,
    format: &str,
) -> Result<NaiveDateTime, EventError> {
    let raw = record
        .get(COL_TIMESTAMP)
        .ok_or(EventError::MissingColumn {
            row,
            column: COL_TIMESTAMP,
        })?
        .trim();
    NaiveDateTime::parse_from_str(raw, format).map_err(|_| EventError::BadTimestamp {
        value: raw.to_string(),
        format: format.to_string(),
    })
}

fn parse_coordinate(
    record: &csv::StringRecord,
    row: u64,
    column: usize,
) -> Result<f64, EventError> {
    let raw = record
        .get(column)
        .ok_or(EventError::MissingColumn { row, column })?
        .trim();
    raw.parse().map_err(|_| EventError::BadCoordinate {
        value: raw.to_string(),
        row,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burglary_only() -> LoadOptions {
        LoadOptions {
            crime_types: BTreeSet::from(["BURGLARY".to_string()]),
            ..LoadOptions::default()
        }
    }

    #[test]
    fn filters_by_crime_type_and_sorts() {
        let csv = "date,x,y,type\n\
                   01/02/2020 10:00:00 AM,200.0,100.0,BURGLARY\n\
                   01/01/2020 09:00:00 PM,50.0,60.0,THEFT\n\
                   01/01/2020 09:00:00 AM,10.0,20.0,BURGLARY\n";
        let mut events = read_events(csv.as_bytes(), &burglary_only()).unwrap();
        events.sort_by_key(|e| e.timestamp);
        assert_eq!(events.len(), 2);
        assert!((events[0].x - 10.0).abs() < f64::EPSILON);
        assert!((events[1].x - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_type_set_keeps_everything() {
        let csv = "date,x,y,type\n\
                   01/01/2020 09:00:00 AM,1.0,2.0,BURGLARY\n\
                   01/01/2020 10:00:00 AM,3.0,4.0,THEFT\n";
        let options = LoadOptions::default();
        assert_eq!(read_events(csv.as_bytes(), &options).unwrap().len(), 2);
    }

    #[test]
    fn converts_feet_to_meters() {
        let csv = "date,x,y,type\n01/01/2020 09:00:00 AM,3937.0,3937.0,BURGLARY\n";
        let options = LoadOptions {
            infeet: true,
            ..burglary_only()
        };
        let events = read_events(csv.as_bytes(), &options).unwrap();
        assert!((events[0].x - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn custom_date_format() {
        let csv = "date,x,y,type\n2020-01-01 09:00:00,1.0,2.0,BURGLARY\n";
        let options = LoadOptions {
            date_format: "%Y-%m-%d %H:%M:%S".to_string(),
            ..burglary_only()
        };
        assert_eq!(read_events(csv.as_bytes(), &options).unwrap().len(), 1);
    }

    #[test]
    fn bad_timestamp_is_reported() {
        let csv = "date,x,y,type\nnot-a-date,1.0,2.0,BURGLARY\n";
        assert!(matches!(
            read_events(csv.as_bytes(), &burglary_only()),
            Err(EventError::BadTimestamp { .. })
        ));
    }

    #[test]
    fn bad_coordinate_is_reported() {
        let csv = "date,x,y,type\n01/01/2020 09:00:00 AM,oops,2.0,BURGLARY\n";
        assert!(matches!(
            read_events(csv.as_bytes(), &burglary_only()),
            Err(EventError::BadCoordinate { .. })
        ));
    }

    #[test]
    fn filtered_rows_skip_unparsed_fields() {
        // The THEFT row has a broken coordinate but is filtered out first.
        let csv = "date,x,y,type\n01/01/2020 09:00:00 AM,oops,2.0,THEFT\n";
        assert!(read_events(csv.as_bytes(), &burglary_only()).unwrap().is_empty());
    }
}
