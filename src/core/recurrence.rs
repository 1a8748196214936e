//! Recurrence expansion business logic.
//!
//! Turns a task schedule into the concrete calendar dates it occurs on. This
//! module is purely about dates; the per-day-per-priority quota checks happen
//! at task creation where the database can be consulted. Nonexistent calendar
//! days (e.g., February 30th) are silently skipped rather than erred, while an
//! empty or out-of-range selector set rejects the whole request before any
//! expansion happens.

use crate::errors::{Error, Result};
use chrono::{Datelike, Days, NaiveDate, Weekday};

/// How many consecutive days a daily schedule expands to, anchor inclusive.
pub const DAILY_SPAN_DAYS: u64 = 7;

/// How many week-windows a weekly schedule expands across.
pub const WEEKLY_WINDOWS: u64 = 4;

/// How many months a monthly schedule expands across, anchor month inclusive.
pub const MONTHLY_SPAN_MONTHS: u32 = 2;

/// A task's recurrence pattern.
///
/// Weekday selectors use 0=Sunday..6=Saturday; day-of-month selectors use 1..=31.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    /// A single occurrence on the anchor date
    Once,
    /// One occurrence per day for [`DAILY_SPAN_DAYS`] days starting at the anchor
    Daily,
    /// One occurrence per selected weekday in each of [`WEEKLY_WINDOWS`] week-windows
    Weekly {
        /// Selected weekdays, 0=Sunday..6=Saturday
        weekdays: Vec<u8>,
    },
    /// One occurrence per selected day-of-month in the anchor month and the next
    Monthly {
        /// Selected days of the month, 1..=31
        month_days: Vec<u32>,
    },
}

impl Schedule {
    /// The frequency tag stored on expanded task instances (informational only).
    #[must_use]
    pub const fn frequency_tag(&self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Weekly { .. } => "weekly",
            Self::Monthly { .. } => "monthly",
        }
    }
}

/// Expands a schedule into the sorted, deduplicated set of occurrence dates.
///
/// # Errors
/// Returns [`Error::InvalidSelector`] if a weekly/monthly schedule has an empty
/// selector set or a selector outside its valid range. Selector validation runs
/// before any date is generated, so a rejected request produces nothing.
pub fn expand(schedule: &Schedule, anchor: NaiveDate) -> Result<Vec<NaiveDate>> {
    let mut dates = match schedule {
        Schedule::Once => vec![anchor],
        Schedule::Daily => (0..DAILY_SPAN_DAYS)
            .map(|offset| anchor + Days::new(offset))
            .collect(),
        Schedule::Weekly { weekdays } => expand_weekly(weekdays, anchor)?,
        Schedule::Monthly { month_days } => expand_monthly(month_days, anchor)?,
    };

    dates.sort_unstable();
    dates.dedup();
    Ok(dates)
}

fn expand_weekly(weekdays: &[u8], anchor: NaiveDate) -> Result<Vec<NaiveDate>> {
    if weekdays.is_empty() {
        return Err(Error::InvalidSelector {
            message: "a weekly schedule needs at least one weekday selected".to_string(),
        });
    }

    let targets = weekdays
        .iter()
        .map(|&index| weekday_from_index(index))
        .collect::<Result<Vec<_>>>()?;

    let mut dates = Vec::with_capacity(targets.len() * WEEKLY_WINDOWS as usize);
    for window in 0..WEEKLY_WINDOWS {
        let window_start = anchor + Days::new(window * 7);
        for &target in &targets {
            dates.push(next_on_or_after(window_start, target));
        }
    }
    Ok(dates)
}

fn expand_monthly(month_days: &[u32], anchor: NaiveDate) -> Result<Vec<NaiveDate>> {
    if month_days.is_empty() {
        return Err(Error::InvalidSelector {
            message: "a monthly schedule needs at least one day of the month selected".to_string(),
        });
    }

    for &day in month_days {
        if day == 0 || day > 31 {
            return Err(Error::InvalidSelector {
                message: format!("day of month {day} is outside 1..=31"),
            });
        }
    }

    let mut dates = Vec::new();
    for offset in 0..MONTHLY_SPAN_MONTHS {
        let months_total = anchor.month0() + offset;
        let year = anchor.year() + (months_total / 12) as i32;
        let month = months_total % 12 + 1;

        for &day in month_days {
            // Nonexistent days in the target month are silently skipped.
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                dates.push(date);
            }
        }
    }
    Ok(dates)
}

/// Maps a 0=Sunday..6=Saturday selector to a [`Weekday`].
fn weekday_from_index(index: u8) -> Result<Weekday> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        _ => Err(Error::InvalidSelector {
            message: format!("weekday {index} is outside 0 (Sunday)..=6 (Saturday)"),
        }),
    }
}

/// The next date on or after `start` falling on `target`.
fn next_on_or_after(start: NaiveDate, target: Weekday) -> NaiveDate {
    let gap = (target.num_days_from_sunday() + 7 - start.weekday().num_days_from_sunday()) % 7;
    start + Days::new(u64::from(gap))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_once_is_exactly_the_anchor() {
        let anchor = date(2024, 6, 10);
        assert_eq!(expand(&Schedule::Once, anchor).unwrap(), vec![anchor]);
    }

    #[test]
    fn test_daily_covers_seven_consecutive_days() {
        let anchor = date(2024, 6, 28);
        let dates = expand(&Schedule::Daily, anchor).unwrap();

        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], anchor);
        assert_eq!(dates[6], date(2024, 7, 4)); // crosses the month boundary
        for pair in dates.windows(2) {
            assert_eq!(pair[1], pair[0] + Days::new(1));
        }
    }

    #[test]
    fn test_weekly_picks_next_matching_weekday_per_window() {
        // 2024-06-10 is a Monday; select Wednesday (3) and Sunday (0).
        let anchor = date(2024, 6, 10);
        let schedule = Schedule::Weekly {
            weekdays: vec![3, 0],
        };
        let dates = expand(&schedule, anchor).unwrap();

        assert_eq!(dates.len(), 8); // 2 weekdays x 4 windows
        assert!(dates.contains(&date(2024, 6, 12))); // first Wednesday
        assert!(dates.contains(&date(2024, 6, 16))); // first Sunday
        assert!(dates.contains(&date(2024, 7, 3))); // last Wednesday
        for d in &dates {
            assert!(matches!(d.weekday(), Weekday::Wed | Weekday::Sun));
        }
    }

    #[test]
    fn test_weekly_anchor_on_selected_weekday_counts_today() {
        // Anchor itself is a Monday; selecting Monday must include the anchor.
        let anchor = date(2024, 6, 10);
        let schedule = Schedule::Weekly { weekdays: vec![1] };
        let dates = expand(&schedule, anchor).unwrap();

        assert_eq!(dates[0], anchor);
        assert_eq!(dates.len(), 4);
    }

    #[test]
    fn test_weekly_duplicate_selectors_are_deduplicated() {
        let anchor = date(2024, 6, 10);
        let schedule = Schedule::Weekly {
            weekdays: vec![2, 2],
        };
        let dates = expand(&schedule, anchor).unwrap();
        assert_eq!(dates.len(), 4);
    }

    #[test]
    fn test_weekly_empty_selectors_rejected() {
        let result = expand(&Schedule::Weekly { weekdays: vec![] }, date(2024, 6, 10));
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidSelector { message: _ }
        ));
    }

    #[test]
    fn test_weekly_out_of_range_selector_rejected() {
        let result = expand(&Schedule::Weekly { weekdays: vec![7] }, date(2024, 6, 10));
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidSelector { message: _ }
        ));
    }

    #[test]
    fn test_monthly_skips_nonexistent_february_day() {
        // Anchor in January 2023: day 30 exists in January but not in February.
        let schedule = Schedule::Monthly {
            month_days: vec![30],
        };
        let dates = expand(&schedule, date(2023, 1, 15)).unwrap();

        assert_eq!(dates, vec![date(2023, 1, 30)]);
    }

    #[test]
    fn test_monthly_day_29_exists_in_leap_february() {
        let schedule = Schedule::Monthly {
            month_days: vec![29],
        };
        let dates = expand(&schedule, date(2024, 1, 10)).unwrap();

        assert_eq!(dates, vec![date(2024, 1, 29), date(2024, 2, 29)]);
    }

    #[test]
    fn test_monthly_crosses_year_boundary() {
        let schedule = Schedule::Monthly { month_days: vec![5] };
        let dates = expand(&schedule, date(2023, 12, 1)).unwrap();

        assert_eq!(dates, vec![date(2023, 12, 5), date(2024, 1, 5)]);
    }

    #[test]
    fn test_monthly_empty_selectors_rejected() {
        let result = expand(
            &Schedule::Monthly { month_days: vec![] },
            date(2024, 6, 10),
        );
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidSelector { message: _ }
        ));
    }

    #[test]
    fn test_monthly_out_of_range_selector_rejected() {
        for bad in [0, 32] {
            let result = expand(
                &Schedule::Monthly {
                    month_days: vec![bad],
                },
                date(2024, 6, 10),
            );
            assert!(matches!(
                result.unwrap_err(),
                Error::InvalidSelector { message: _ }
            ));
        }
    }

    #[test]
    fn test_expansion_is_sorted() {
        let schedule = Schedule::Monthly {
            month_days: vec![20, 5],
        };
        let dates = expand(&schedule, date(2024, 6, 1)).unwrap();
        let mut sorted = dates.clone();
        sorted.sort_unstable();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_frequency_tags() {
        assert_eq!(Schedule::Once.frequency_tag(), "once");
        assert_eq!(Schedule::Daily.frequency_tag(), "daily");
        assert_eq!(
            Schedule::Weekly { weekdays: vec![1] }.frequency_tag(),
            "weekly"
        );
        assert_eq!(
            Schedule::Monthly { month_days: vec![1] }.frequency_tag(),
            "monthly"
        );
    }
}
