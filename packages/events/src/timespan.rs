//! Duration shorthand: an integer count followed by a unit letter.
//!
//! `"1D"` = one day, `"8W"` = eight weeks, `"6M"` = six months, `"1Y"` = one
//! year. Used for train length, test length, sweep step, and sweep range.
//! Day and week arithmetic is exact; month and year arithmetic is calendar
//! arithmetic (e.g. Jan 31 + 1M = Feb 28/29), matching how the sweep dates
//! are generated.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};

use crate::EventError;

/// The unit letter of a duration shorthand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// Calendar day.
    Day,
    /// Seven days.
    Week,
    /// Calendar month.
    Month,
    /// Calendar year.
    Year,
}

impl TimeUnit {
    const fn letter(self) -> char {
        match self {
            Self::Day => 'D',
            Self::Week => 'W',
            Self::Month => 'M',
            Self::Year => 'Y',
        }
    }
}

/// A duration in shorthand form: count plus unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSpan {
    count: u32,
    unit: TimeUnit,
}

impl TimeSpan {
    /// Creates a span. The count must be non-zero; a zero-length sweep step
    /// would never advance.
    #[must_use]
    pub const fn new(count: u32, unit: TimeUnit) -> Option<Self> {
        if count == 0 {
            None
        } else {
            Some(Self { count, unit })
        }
    }

    /// The unit count.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// The unit.
    #[must_use]
    pub const fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// The date lying this span after `date`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::DateOutOfRange`] if the result is not
    /// representable.
    pub fn after(&self, date: NaiveDate) -> Result<NaiveDate, EventError> {
        let out_of_range = || EventError::DateOutOfRange {
            date,
            span: *self,
        };
        match self.unit {
            TimeUnit::Day => date
                .checked_add_days(Days::new(u64::from(self.count)))
                .ok_or_else(out_of_range),
            TimeUnit::Week => date
                .checked_add_days(Days::new(u64::from(self.count) * 7))
                .ok_or_else(out_of_range),
            TimeUnit::Month => date
                .checked_add_months(Months::new(self.count))
                .ok_or_else(out_of_range),
            TimeUnit::Year => date
                .checked_add_months(Months::new(self.count.saturating_mul(12)))
                .ok_or_else(out_of_range),
        }
    }

    /// The date lying this span before `date`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::DateOutOfRange`] if the result is not
    /// representable.
    pub fn before(&self, date: NaiveDate) -> Result<NaiveDate, EventError> {
        let out_of_range = || EventError::DateOutOfRange {
            date,
            span: *self,
        };
        match self.unit {
            TimeUnit::Day => date
                .checked_sub_days(Days::new(u64::from(self.count)))
                .ok_or_else(out_of_range),
            TimeUnit::Week => date
                .checked_sub_days(Days::new(u64::from(self.count) * 7))
                .ok_or_else(out_of_range),
            TimeUnit::Month => date
                .checked_sub_months(Months::new(self.count))
                .ok_or_else(out_of_range),
            TimeUnit::Year => date
                .checked_sub_months(Months::new(self.count.saturating_mul(12)))
                .ok_or_else(out_of_range),
        }
    }

    /// This span as a fixed number of seconds, for kernel time-decay ratios.
    ///
    /// Days and weeks are exact. Months and years have no fixed length, so
    /// they use the 30-day / 365-day conventions; prospective-hotspot time
    /// units are day- or week-scale in practice.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn approx_seconds(&self) -> u64 {
        const DAY: u64 = 86_400;
        let days = match self.unit {
            TimeUnit::Day => 1,
            TimeUnit::Week => 7,
            TimeUnit::Month => 30,
            TimeUnit::Year => 365,
        };
        self.count as u64 * days * DAY
    }
}

impl FromStr for TimeSpan {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || EventError::BadTimeSpan {
            value: s.to_string(),
        };
        let trimmed = s.trim();
        let Some(letter) = trimmed.chars().last() else {
            return Err(bad());
        };
        let digits = &trimmed[..trimmed.len() - letter.len_utf8()];
        let unit = match letter {
            'D' | 'd' => TimeUnit::Day,
            'W' | 'w' => TimeUnit::Week,
            'M' | 'm' => TimeUnit::Month,
            'Y' | 'y' => TimeUnit::Year,
            _ => return Err(bad()),
        };
        let count: u32 = digits.parse().map_err(|_| bad())?;
        Self::new(count, unit).ok_or_else(bad)
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.letter())
    }
}
