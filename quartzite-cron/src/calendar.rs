//! Gregorian calendar arithmetic and the lenient working calendar used by the search.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`.
pub fn days_in_month(month: u32, year: i32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Day of week numbered 1 = Sunday through 7 = Saturday. `None` for an invalid date.
pub fn day_of_week(year: i32, month: u32, day: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.weekday().number_from_sunday())
}

/// Local wall-clock fields that may be set out of range and then normalized, so
/// `hour = 24` becomes midnight of the next day and `day = 32` spills into the next month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct WorkingCalendar {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl WorkingCalendar {
    pub fn from_naive(naive: &NaiveDateTime) -> Self {
        Self {
            year: naive.year(),
            month: naive.month(),
            day: naive.day(),
            hour: naive.hour(),
            minute: naive.minute(),
            second: naive.second(),
        }
    }

    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(
            self.hour,
            self.minute,
            self.second,
        )
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.month, self.year)
    }

    pub fn day_of_week(&self) -> Option<u32> {
        day_of_week(self.year, self.month, self.day)
    }

    /// Zero the time of day.
    pub fn start_of_day(&mut self) {
        self.hour = 0;
        self.minute = 0;
        self.second = 0;
    }

    /// Midnight on `day` of `month` (month may be 13 and day may overflow; both carry).
    pub fn set_date(&mut self, month: u32, day: u32) {
        self.start_of_day();
        self.month = month;
        self.day = day;
        self.normalize();
    }

    /// Propagate out-of-range fields into the next larger field.
    pub fn normalize(&mut self) {
        self.minute += self.second / 60;
        self.second %= 60;
        self.hour += self.minute / 60;
        self.minute %= 60;
        self.day += self.hour / 24;
        self.hour %= 24;
        self.roll_months();
        loop {
            let length = self.days_in_month();
            if self.day <= length {
                break;
            }
            self.day -= length;
            self.month += 1;
            self.roll_months();
        }
    }

    fn roll_months(&mut self) {
        if self.month > 12 {
            self.year += ((self.month - 1) / 12) as i32;
            self.month = (self.month - 1) % 12 + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2024));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2, 2024), 29);
        assert_eq!(days_in_month(2, 2100), 28);
        assert_eq!(days_in_month(4, 2024), 30);
        assert_eq!(days_in_month(12, 2024), 31);
    }

    #[test]
    fn test_day_of_week_sunday_is_one() {
        // 2024-03-03 was a Sunday, 2024-03-15 a Friday
        assert_eq!(day_of_week(2024, 3, 3), Some(1));
        assert_eq!(day_of_week(2024, 3, 15), Some(6));
        assert_eq!(day_of_week(2024, 3, 16), Some(7));
        assert_eq!(day_of_week(1970, 1, 1), Some(5));
        assert_eq!(day_of_week(2023, 2, 29), None);
    }

    #[test]
    fn test_normalize_carries_through_year() {
        let mut cal = WorkingCalendar {
            year: 2023,
            month: 12,
            day: 31,
            hour: 23,
            minute: 59,
            second: 60,
        };
        cal.normalize();
        assert_eq!((cal.year, cal.month, cal.day, cal.hour, cal.minute, cal.second), (2024, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_set_date_spills_short_month() {
        let mut cal = WorkingCalendar {
            year: 2024,
            month: 3,
            day: 31,
            hour: 10,
            minute: 0,
            second: 0,
        };
        cal.set_date(4, 31);
        assert_eq!((cal.month, cal.day, cal.hour), (5, 1, 0));

        cal.set_date(13, 1);
        assert_eq!((cal.year, cal.month, cal.day), (2025, 1, 1));
    }
}
