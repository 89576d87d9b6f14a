//! Rolling train/test evaluation windows.
//!
//! Each experiment date is the start of a test window; the training window
//! ends exactly where the test window begins (no gap, no overlap).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::{EventError, TimeSpan};

/// One experiment's time frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalWindow {
    /// Start of the training data (inclusive).
    pub train_start: NaiveDate,
    /// End of the training data (exclusive); equals `test_start`.
    pub train_end: NaiveDate,
    /// Start of the test data (inclusive).
    pub test_start: NaiveDate,
    /// End of the test data (exclusive).
    pub test_end: NaiveDate,
}

impl EvalWindow {
    /// Derives the window around a test-start date.
    ///
    /// `train_start = test_start - train_len`, `train_end = test_start`,
    /// `test_end = test_start + test_len`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::DateOutOfRange`] if either offset leaves the
    /// representable date range.
    pub fn around(
        test_start: NaiveDate,
        train_len: TimeSpan,
        test_len: TimeSpan,
    ) -> Result<Self, EventError> {
        Ok(Self {
            train_start: train_len.before(test_start)?,
            train_end: test_start,
            test_start,
            test_end: test_len.after(test_start)?,
        })
    }

    /// Training window bounds as timestamps (midnight boundaries).
    #[must_use]
    pub fn train_bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        (
            self.train_start.and_time(NaiveTime::MIN),
            self.train_end.and_time(NaiveTime::MIN),
        )
    }

    /// Test window bounds as timestamps (midnight boundaries).
    #[must_use]
    pub fn test_bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        (
            self.test_start.and_time(NaiveTime::MIN),
            self.test_end.and_time(NaiveTime::MIN),
        )
    }

    /// The prediction reference instant for prospective models: the start of
    /// the test window. Events at or after this instant must not influence a
    /// model's score.
    #[must_use]
    pub fn cutoff(&self) -> NaiveDateTime {
        self.test_start.and_time(NaiveTime::MIN)
    }
}

/// Generates the ordered test-start dates from `earliest` to `latest`
/// inclusive of both ends, advancing by `step`.
///
/// # Errors
///
/// Returns [`EventError::DateOutOfRange`] if stepping leaves the
/// representable date range before passing `latest`.
pub fn test_date_range(
    earliest: NaiveDate,
    latest: NaiveDate,
    step: TimeSpan,
) -> Result<Vec<NaiveDate>, EventError> {
    let mut dates = Vec::new();
    let mut current = earliest;
    while current <= latest {
        dates.push(current);
        current = step.after(current)?;
    }
    Ok(dates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn span(s: &str) -> TimeSpan {
        s.parse().unwrap()
    }

    #[test]
    fn weekly_steps_inclusive_of_both_ends() {
        // Scenario: 2020-01-01 to 2020-01-15 by 1W gives exactly 3 dates.
        let dates = test_date_range(date(2020, 1, 1), date(2020, 1, 15), span("1W")).unwrap();
        assert_eq!(
            dates,
            vec![date(2020, 1, 1), date(2020, 1, 8), date(2020, 1, 15)]
        );
    }

    #[test]
    fn latest_between_steps_is_excluded() {
        let dates = test_date_range(date(2020, 1, 1), date(2020, 1, 14), span("1W")).unwrap();
        assert_eq!(dates, vec![date(2020, 1, 1), date(2020, 1, 8)]);
    }

    #[test]
    fn single_date_when_range_is_degenerate() {
        let dates = test_date_range(date(2020, 1, 1), date(2020, 1, 1), span("1D")).unwrap();
        assert_eq!(dates, vec![date(2020, 1, 1)]);
    }

    #[test]
    fn empty_when_latest_precedes_earliest() {
        let dates = test_date_range(date(2020, 1, 2), date(2020, 1, 1), span("1D")).unwrap();
        assert!(dates.is_empty());
    }

    #[test]
    fn window_derivation() {
        let window = EvalWindow::around(date(2020, 3, 1), span("8W"), span("1W")).unwrap();
        assert_eq!(window.train_start, date(2020, 1, 5));
        assert_eq!(window.train_end, date(2020, 3, 1));
        assert_eq!(window.test_start, date(2020, 3, 1));
        assert_eq!(window.test_end, date(2020, 3, 8));
        assert_eq!(window.train_end, window.test_start);
        assert_eq!(window.cutoff(), window.test_bounds().0);
    }
}
