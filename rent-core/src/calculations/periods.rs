//! Reporting periods and their split into calendar-aligned buckets.
//!
//! A period is an inclusive [`DateRange`]. [`split_period`] cuts it into
//! consecutive buckets whose size depends on how many calendar months the
//! period touches:
//!
//! | Months touched | Bucket size |
//! |----------------|-------------|
//! | up to 12 | month |
//! | 13 to 36 | quarter |
//! | 37 to 60 | half-year |
//! | over 60 | year |
//!
//! Buckets follow calendar boundaries, except that the first and last are
//! clipped to the period itself.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("invalid period: start {start} must be before end {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns [`PeriodError::InvalidPeriod`] unless `start < end`.
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, PeriodError> {
        if start >= end {
            return Err(PeriodError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// Builds a range without checking the order of its bounds. A range
    /// with `start == end` covers a single day.
    pub(crate) fn new_unchecked(
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, both bounds included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(
        &self,
        date: NaiveDate,
    ) -> bool {
        self.start <= date && date <= self.end
    }

    /// Days shared by both ranges, if any.
    pub fn intersect(
        &self,
        other: &DateRange,
    ) -> Option<DateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(Self { start, end })
    }

    /// Calendar months touched by the range, counting both boundary months.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use rent_core::calculations::DateRange;
    ///
    /// let range = DateRange::new(
    ///     NaiveDate::from_ymd_opt(2024, 11, 20).unwrap(),
    ///     NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(range.month_span(), 4);
    /// ```
    pub fn month_span(&self) -> u32 {
        let years = self.end.year() - self.start.year();
        let months = self.end.month() as i32 - self.start.month() as i32;
        (years * 12 + months + 1).max(1) as u32
    }
}

/// A reporting period as chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    CurrentMonth,
    LastMonth,
    CurrentQuarter,
    CurrentYear,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl ReportPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentMonth => "current_month",
            Self::LastMonth => "last_month",
            Self::CurrentQuarter => "current_quarter",
            Self::CurrentYear => "current_year",
            Self::Custom { .. } => "custom",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CurrentMonth => "Текущий месяц",
            Self::LastMonth => "Прошлый месяц",
            Self::CurrentQuarter => "Текущий квартал",
            Self::CurrentYear => "Текущий год",
            Self::Custom { .. } => "Произвольный период",
        }
    }

    /// Resolves the period to concrete dates relative to `today`.
    ///
    /// Presets always cover whole calendar months.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::InvalidPeriod`] for a custom period whose
    /// start is not before its end.
    pub fn resolve(
        &self,
        today: NaiveDate,
    ) -> Result<DateRange, PeriodError> {
        let month = month_start(today);
        let (start, months) = match *self {
            Self::CurrentMonth => (month, 1),
            Self::LastMonth => (month - Months::new(1), 1),
            Self::CurrentQuarter => (month - Months::new(today.month0() % 3), 3),
            Self::CurrentYear => (month - Months::new(today.month0()), 12),
            Self::Custom { start, end } => return DateRange::new(start, end),
        };
        DateRange::new(start, last_day_before(start + Months::new(months)))
    }
}

/// Bucket size chosen for a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
}

impl Granularity {
    /// Picks the bucket size for a span of `months` calendar months.
    pub fn for_month_span(months: u32) -> Self {
        match months {
            m if m > 60 => Self::Yearly,
            m if m > 36 => Self::HalfYearly,
            m if m > 12 => Self::Quarterly,
            _ => Self::Monthly,
        }
    }

    pub fn for_range(range: &DateRange) -> Self {
        Self::for_month_span(range.month_span())
    }

    pub fn months(&self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::HalfYearly => 6,
            Self::Yearly => 12,
        }
    }

    /// First day of the calendar bucket containing `date`.
    pub fn align(
        &self,
        date: NaiveDate,
    ) -> NaiveDate {
        month_start(date) - Months::new(date.month0() % self.months())
    }

    /// Label for the calendar bucket starting at `bucket_start`.
    pub fn label(
        &self,
        bucket_start: NaiveDate,
    ) -> String {
        let year = bucket_start.year();
        match self {
            Self::Monthly => format!("{} {year}", MONTH_LABELS[bucket_start.month0() as usize]),
            Self::Quarterly => format!("{} кв. {year}", bucket_start.month0() / 3 + 1),
            Self::HalfYearly => format!("{} пол. {year}", bucket_start.month0() / 6 + 1),
            Self::Yearly => year.to_string(),
        }
    }
}

const MONTH_LABELS: [&str; 12] = [
    "Янв.", "Февр.", "Март", "Апр.", "Май", "Июнь", "Июль", "Авг.", "Сент.", "Окт.", "Нояб.",
    "Дек.",
];

/// One bucket of a split period, before any money is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRange {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BucketRange {
    pub fn range(&self) -> DateRange {
        DateRange::new_unchecked(self.start, self.end)
    }
}

/// Splits `range` into contiguous, calendar-aligned buckets.
///
/// The first bucket starts at `range.start()`, the last ends at
/// `range.end()`, and each bucket starts the day after the previous one
/// ends.
///
/// ```
/// use chrono::NaiveDate;
/// use rent_core::calculations::{split_period, DateRange};
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
/// )
/// .unwrap();
///
/// let labels: Vec<_> = split_period(&range).into_iter().map(|b| b.label).collect();
/// assert_eq!(labels, vec!["Янв. 2025", "Февр. 2025", "Март 2025"]);
/// ```
pub fn split_period(range: &DateRange) -> Vec<BucketRange> {
    let granularity = Granularity::for_range(range);
    let step = Months::new(granularity.months());

    let mut buckets = Vec::new();
    let mut cursor = granularity.align(range.start());
    while cursor <= range.end() {
        let next = cursor + step;
        buckets.push(BucketRange {
            label: granularity.label(cursor),
            start: cursor.max(range.start()),
            end: last_day_before(next).min(range.end()),
        });
        cursor = next;
    }
    buckets
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

fn last_day_before(date: NaiveDate) -> NaiveDate {
    date - Days::new(1)
}
