use chrono::{Datelike, Days, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::Transaction;

use super::Filter;

/// Relative date window used by transaction views, evaluated against an
/// explicit reference date so results are reproducible.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    All,
    CurrentYear,
    CurrentMonth,
    /// Monday of the reference week up to the reference date.
    CurrentWeek,
    /// One year back up to the reference date.
    LastYear,
    LastQuarter,
    LastMonth,
    LastDays(u32),
    LastMonths(u32),
    /// Month of the reference year, 1-based.
    Month(u32),
    Year(i32),
}

impl Period {
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match *self {
            Period::All => true,
            Period::CurrentYear => date.year() == today.year(),
            Period::CurrentMonth => date.year() == today.year() && date.month() == today.month(),
            Period::CurrentWeek => {
                let monday = days_back(today, today.weekday().num_days_from_monday());
                within(date, monday, today)
            }
            Period::LastYear => within(date, months_back(today, 12), today),
            Period::LastQuarter => within(date, months_back(today, 3), today),
            Period::LastMonth => within(date, months_back(today, 1), today),
            Period::LastDays(days) => within(date, days_back(today, days), today),
            Period::LastMonths(months) => within(date, months_back(today, months), today),
            Period::Month(month) => date.year() == today.year() && date.month() == month,
            Period::Year(year) => date.year() == year,
        }
    }

    pub fn filter(self, today: NaiveDate) -> Filter<Transaction> {
        Filter::new(move |txn: &Transaction| self.contains(txn.date, today))
    }

    /// Same as [`Period::filter`] with the local calendar date.
    pub fn filter_today(self) -> Filter<Transaction> {
        self.filter(Local::now().date_naive())
    }
}

fn within(date: NaiveDate, from: NaiveDate, to: NaiveDate) -> bool {
    date >= from && date <= to
}

fn days_back(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

fn months_back(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn huge_windows_reach_back_to_the_earliest_date() {
        let today = d(2024, 1, 1);
        assert!(Period::LastDays(u32::MAX).contains(d(1900, 6, 1), today));
        assert!(Period::LastMonths(u32::MAX).contains(d(1, 1, 1), today));
        assert!(!Period::LastDays(u32::MAX).contains(d(2024, 1, 2), today));
        assert!(Period::CurrentWeek.contains(NaiveDate::MIN, NaiveDate::MIN));
    }

    #[test]
    fn current_week_starts_on_monday() {
        let thursday = d(2024, 5, 16);
        assert!(Period::CurrentWeek.contains(d(2024, 5, 13), thursday));
        assert!(!Period::CurrentWeek.contains(d(2024, 5, 12), thursday));
        assert!(!Period::CurrentWeek.contains(d(2024, 5, 17), thursday));
    }

    #[test]
    fn trailing_windows_clamp_month_ends() {
        let today = d(2024, 3, 31);
        assert!(Period::LastMonth.contains(d(2024, 2, 29), today));
        assert!(!Period::LastMonth.contains(d(2024, 2, 28), today));
        assert!(Period::LastQuarter.contains(d(2023, 12, 31), today));
        assert!(Period::LastYear.contains(d(2023, 3, 31), today));
        assert!(Period::LastDays(7).contains(d(2024, 3, 24), today));
        assert!(!Period::LastDays(7).contains(d(2024, 3, 23), today));
    }

    #[test]
    fn calendar_periods() {
        let today = d(2024, 8, 2);
        assert!(Period::Month(2).contains(d(2024, 2, 10), today));
        assert!(!Period::Month(2).contains(d(2023, 2, 10), today));
        assert!(Period::CurrentMonth.contains(d(2024, 8, 31), today));
        assert!(Period::CurrentYear.contains(d(2024, 1, 1), today));
        assert!(Period::Year(2020).contains(d(2020, 6, 6), today));
        assert!(Period::All.contains(d(1999, 1, 1), today));
    }
}
