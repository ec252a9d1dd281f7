//! Comparisons between partially known diagnosis dates.
//!
//! A registry date may lack its day, its month, or both. Rather than guessing the missing
//! parts, every comparison here answers with certainty only when all calendar dates consistent
//! with the known parts agree, and reports `Unknown` otherwise.

use std::cmp::Ordering;

use chrono::{Datelike, Local, Months, NaiveDate};
use serde::Serialize;

use super::domain::Behavior;

/// Longest gap, in days, still treated as "within 60 days".
pub const SIXTY_DAYS: i64 = 60;

/// Date with optional month and day. Construction drops an out-of-range month (and with it
/// the day) and any day that does not exist in its month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PartialDate {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
}

impl PartialDate {
    pub fn new(year: Option<i32>, month: Option<u32>, day: Option<u32>) -> Self {
        let month = month.filter(|month| (1..=12).contains(month));
        let day = match month {
            None => None,
            Some(month) => {
                // An unknown year is checked against a leap year so 29 February survives.
                let last = days_in_month(year.unwrap_or(2000), month).unwrap_or(0);
                day.filter(|day| (1..=last).contains(day))
            }
        };

        Self { year, month, day }
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    pub fn is_complete(&self) -> bool {
        self.year.is_some() && self.month.is_some() && self.day.is_some()
    }

    /// The calendar date, when every component is known.
    pub fn exact(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month?, self.day?)
    }

    /// Earliest and latest calendar dates consistent with the known components.
    pub fn interval(&self) -> Option<DateInterval> {
        let year = self.year?;
        let (earliest, latest) = match (self.month, self.day) {
            (Some(month), Some(day)) => {
                let date = NaiveDate::from_ymd_opt(year, month, day)?;
                (date, date)
            }
            (Some(month), None) => (
                NaiveDate::from_ymd_opt(year, month, 1)?,
                last_day_of_month(year, month)?,
            ),
            (None, _) => (
                NaiveDate::from_ymd_opt(year, 1, 1)?,
                NaiveDate::from_ymd_opt(year, 12, 31)?,
            ),
        };

        Some(DateInterval { earliest, latest })
    }
}

/// Closed range of calendar dates a partial date may stand for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateInterval {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

impl DateInterval {
    /// Smallest and largest day counts from a date in `self` to a date in `later`.
    pub fn gap_bounds(&self, later: &DateInterval) -> (i64, i64) {
        let min = (later.earliest - self.latest).num_days();
        let max = (later.latest - self.earliest).num_days();
        (min, max)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.earliest <= date && date <= self.latest
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum YearsApart {
    Yes,
    No,
    Unknown,
}

/// Answer to "is one diagnosis more than 60 days after the other", with the later side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SixtyDayGap {
    FirstLater,
    SecondLater,
    Within,
    Unknown,
}

impl SixtyDayGap {
    pub fn is_apart(self) -> bool {
        matches!(self, Self::FirstLater | Self::SecondLater)
    }
}

/// Which of two tumors was diagnosed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisOrder {
    FirstLater,
    SecondLater,
    SameDay,
    Unknown,
}

/// Date comparisons against a fixed reference year; years after it count as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UncertainDateComparator {
    reference_year: i32,
}

impl Default for UncertainDateComparator {
    fn default() -> Self {
        Self::today()
    }
}

impl UncertainDateComparator {
    pub fn new(reference_year: i32) -> Self {
        Self { reference_year }
    }

    pub fn today() -> Self {
        Self::new(Local::now().year())
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    fn known_years(&self, first: &PartialDate, second: &PartialDate) -> Option<(i32, i32)> {
        let usable = |year: Option<i32>| year.filter(|year| *year <= self.reference_year);
        Some((usable(first.year)?, usable(second.year)?))
    }

    /// Whether the two dates are more than `threshold` years apart.
    pub fn years_apart(
        &self,
        first: &PartialDate,
        second: &PartialDate,
        threshold: u32,
    ) -> YearsApart {
        let Some((year1, year2)) = self.known_years(first, second) else {
            return YearsApart::Unknown;
        };

        let gap = (i64::from(year1) - i64::from(year2)).abs();
        match gap.cmp(&i64::from(threshold)) {
            Ordering::Greater => return YearsApart::Yes,
            Ordering::Less => return YearsApart::No,
            Ordering::Equal => {}
        }

        let (Some(month1), Some(month2)) = (first.month, second.month) else {
            return YearsApart::Unknown;
        };

        // The later year's month decides, unless the months tie.
        match year1.cmp(&year2) {
            Ordering::Greater if month1 > month2 => return YearsApart::Yes,
            Ordering::Greater if month1 < month2 => return YearsApart::No,
            Ordering::Less if month2 > month1 => return YearsApart::Yes,
            Ordering::Less if month2 < month1 => return YearsApart::No,
            _ => {}
        }

        let (Some(date1), Some(date2)) = (first.exact(), second.exact()) else {
            return YearsApart::Unknown;
        };

        match full_years_between(date1, date2) {
            Some(years) if years >= i64::from(threshold) => YearsApart::Yes,
            Some(_) => YearsApart::No,
            None => YearsApart::Unknown,
        }
    }

    /// Whether one date falls more than 60 days after the other.
    ///
    /// When `behaviors` is given, a pairing where the earlier diagnosis is invasive and the
    /// later one in situ never counts as apart.
    pub fn days_apart_60(
        &self,
        first: &PartialDate,
        second: &PartialDate,
        behaviors: Option<(Behavior, Behavior)>,
    ) -> SixtyDayGap {
        let Some((year1, year2)) = self.known_years(first, second) else {
            return SixtyDayGap::Unknown;
        };

        let reversed = |first_later: bool| match behaviors {
            Some((behavior1, behavior2)) => {
                let (earlier, later) = if first_later {
                    (behavior2, behavior1)
                } else {
                    (behavior1, behavior2)
                };
                earlier == Behavior::Invasive && later == Behavior::InSitu
            }
            None => false,
        };
        let apart = |first_later: bool| {
            if reversed(first_later) {
                SixtyDayGap::Within
            } else if first_later {
                SixtyDayGap::FirstLater
            } else {
                SixtyDayGap::SecondLater
            }
        };

        if let (Some(date1), Some(date2)) = (first.exact(), second.exact()) {
            let gap = (date1 - date2).num_days();
            return if gap > SIXTY_DAYS {
                apart(true)
            } else if -gap > SIXTY_DAYS {
                apart(false)
            } else {
                SixtyDayGap::Within
            };
        }

        if i64::from(year1) - i64::from(year2) >= 2 {
            return apart(true);
        }
        if i64::from(year2) - i64::from(year1) >= 2 {
            return apart(false);
        }

        let first_later = match year1.cmp(&year2) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match (first.month, second.month) {
                (Some(month1), Some(month2)) => match month1.cmp(&month2) {
                    Ordering::Greater => true,
                    Ordering::Less => false,
                    Ordering::Equal => return SixtyDayGap::Within,
                },
                _ => return SixtyDayGap::Unknown,
            },
        };

        if reversed(first_later) {
            return SixtyDayGap::Within;
        }

        let (earlier, later) = if first_later {
            (second, first)
        } else {
            (first, second)
        };
        let (Some(earlier), Some(later)) = (earlier.interval(), later.interval()) else {
            return SixtyDayGap::Unknown;
        };

        let (min_gap, max_gap) = earlier.gap_bounds(&later);
        if min_gap > SIXTY_DAYS {
            apart(first_later)
        } else if max_gap <= SIXTY_DAYS {
            SixtyDayGap::Within
        } else {
            SixtyDayGap::Unknown
        }
    }

    /// Which diagnosis came later, using only the components needed to tell them apart.
    pub fn diagnosis_order(&self, first: &PartialDate, second: &PartialDate) -> DiagnosisOrder {
        let Some((year1, year2)) = self.known_years(first, second) else {
            return DiagnosisOrder::Unknown;
        };

        let order = year1
            .cmp(&year2)
            .then_with(|| compare_known(first.month, second.month))
            .then_with(|| compare_known(first.day, second.day));

        match order {
            Ordering::Greater => DiagnosisOrder::FirstLater,
            Ordering::Less => DiagnosisOrder::SecondLater,
            Ordering::Equal if first.is_complete() && second.is_complete() => {
                DiagnosisOrder::SameDay
            }
            Ordering::Equal => DiagnosisOrder::Unknown,
        }
    }
}

// Unknown components compare equal here; `diagnosis_order` then needs complete dates.
fn compare_known(first: Option<u32>, second: Option<u32>) -> Ordering {
    match (first, second) {
        (Some(first), Some(second)) => first.cmp(&second),
        _ => Ordering::Equal,
    }
}

/// Whole years between two dates, counting a 29 February anniversary as reached on 28 February.
fn full_years_between(first: NaiveDate, second: NaiveDate) -> Option<i64> {
    let (earlier, later) = if first <= second {
        (first, second)
    } else {
        (second, first)
    };

    let mut years = later.year() - earlier.year();
    if years > 0 {
        let months = u32::try_from(years).ok()?.checked_mul(12)?;
        let anniversary = earlier.checked_add_months(Months::new(months))?;
        if anniversary > later {
            years -= 1;
        }
    }

    Some(i64::from(years))
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    last_day_of_month(year, month).map(|date| date.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_drops_impossible_components() {
        assert_eq!(
            PartialDate::new(Some(2010), Some(0), Some(5)),
            PartialDate::new(Some(2010), None, None)
        );
        assert_eq!(PartialDate::new(Some(2013), Some(2), Some(29)).day(), None);
        assert_eq!(PartialDate::new(Some(2012), Some(2), Some(29)).day(), Some(29));
        assert_eq!(PartialDate::new(None, Some(2), Some(29)).day(), Some(29));
        assert_eq!(PartialDate::new(Some(2010), None, Some(4)).day(), None);
    }

    #[test]
    fn interval_spans_unknown_components() {
        let year_only = PartialDate::new(Some(2011), None, None)
            .interval()
            .expect("interval");
        assert_eq!(year_only.earliest, NaiveDate::from_ymd_opt(2011, 1, 1).expect("date"));
        assert_eq!(year_only.latest, NaiveDate::from_ymd_opt(2011, 12, 31).expect("date"));

        let february = PartialDate::new(Some(2012), Some(2), None)
            .interval()
            .expect("interval");
        assert_eq!(february.latest, NaiveDate::from_ymd_opt(2012, 2, 29).expect("date"));

        assert!(PartialDate::new(None, Some(3), Some(1)).interval().is_none());
    }

    #[test]
    fn full_years_clamps_leap_day_anniversary() {
        let leap = NaiveDate::from_ymd_opt(2008, 2, 29).expect("date");
        let anniversary = NaiveDate::from_ymd_opt(2013, 2, 28).expect("date");
        assert_eq!(full_years_between(leap, anniversary), Some(5));
        assert_eq!(full_years_between(anniversary, leap), Some(5));

        let day_before = NaiveDate::from_ymd_opt(2013, 2, 27).expect("date");
        assert_eq!(full_years_between(leap, day_before), Some(4));
    }
}
