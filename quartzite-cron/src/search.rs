//! Fire time search.
//!
//! The forward search walks a lenient local calendar one field at a time, coarser fields
//! resetting finer ones, until a full pass changes nothing. The backward search is built on
//! top of it: "no fire in `(t, target)`" is monotone in `t`, so the latest fire before
//! `target` is found by galloping back and then bisecting on whole seconds.

use crate::calendar::{WorkingCalendar, days_in_month};
use crate::field::{Field, ValueSet};
use crate::parser::ParsedFields;
use crate::zone::Zone;
use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, SubsecRound, TimeZone, Timelike, Utc,
};
use quartzite_log::debug;

/// Default cap on the year the forward search may reach.
pub const DEFAULT_SEARCH_YEAR_LIMIT: i32 = 2999;

pub(crate) struct Search<'a> {
    fields: &'a ParsedFields,
    zone: Zone,
    year_limit: i32,
}

impl<'a> Search<'a> {
    pub fn new(fields: &'a ParsedFields, zone: Zone, year_limit: i32) -> Self {
        Self {
            fields,
            zone,
            year_limit,
        }
    }

    fn set(&self, field: Field) -> &ValueSet {
        self.fields.set(field)
    }

    /// Earliest fire time strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let start_instant = after.trunc_subsecs(0).checked_add_signed(Duration::seconds(1))?;
        let start = WorkingCalendar::from_naive(&self.zone.to_local(start_instant));
        let mut cal = start;

        loop {
            if cal.year > self.year_limit {
                debug!("no fire time after {} before year {}", after, self.year_limit);
                return None;
            }
            if !self.advance(&mut cal, &start)? {
                continue;
            }

            let local = cal.to_naive()?;
            if let Some(instant) = self.zone.resolve_after(&local, after) {
                return Some(instant);
            }
            // Wall time skipped by a transition, or only readable before `after`
            cal.second += 1;
            cal.normalize();
        }
    }

    /// One pass over the fields. `Some(true)` when `cal` matched every field unchanged,
    /// `Some(false)` when something moved, `None` when no later match exists.
    fn advance(&self, cal: &mut WorkingCalendar, start: &WorkingCalendar) -> Option<bool> {
        self.settle_second(cal)?;
        Some(
            self.settle_minute(cal)?
                && self.settle_hour(cal)?
                && self.settle_day(cal, start)?
                && self.settle_month(cal)?
                && self.settle_year(cal)?,
        )
    }

    fn settle_second(&self, cal: &mut WorkingCalendar) -> Option<()> {
        let seconds = self.set(Field::Second);
        match seconds.at_or_after(cal.second) {
            Some(s) => cal.second = s,
            None => {
                cal.second = seconds.first()?;
                cal.minute += 1;
                cal.normalize();
            }
        }
        Some(())
    }

    fn settle_minute(&self, cal: &mut WorkingCalendar) -> Option<bool> {
        let minutes = self.set(Field::Minute);
        match minutes.at_or_after(cal.minute) {
            Some(m) if m == cal.minute => return Some(true),
            Some(m) => cal.minute = m,
            None => {
                cal.minute = minutes.first()?;
                cal.hour += 1;
            }
        }
        cal.second = 0;
        cal.normalize();
        Some(false)
    }

    fn settle_hour(&self, cal: &mut WorkingCalendar) -> Option<bool> {
        let hours = self.set(Field::Hour);
        match hours.at_or_after(cal.hour) {
            Some(h) if h == cal.hour => return Some(true),
            Some(h) => cal.hour = h,
            None => {
                cal.hour = hours.first()?;
                cal.day += 1;
            }
        }
        cal.minute = 0;
        cal.second = 0;
        cal.normalize();
        Some(false)
    }

    fn settle_day(&self, cal: &mut WorkingCalendar, start: &WorkingCalendar) -> Option<bool> {
        if self.set(Field::DayOfWeek).is_unspecified() {
            self.settle_day_of_month(cal, start)
        } else {
            self.settle_day_of_week(cal)
        }
    }

    fn settle_day_of_month(&self, cal: &mut WorkingCalendar, start: &WorkingCalendar) -> Option<bool> {
        let rules = self.fields.rules;
        let days = self.set(Field::DayOfMonth);
        let current = cal.day;
        let last = cal.days_in_month();

        let (day, month) = if rules.last_day_of_month {
            let target = i64::from(last) - i64::from(rules.last_day_offset);
            if rules.nearest_weekday {
                self.nearest_weekday(cal, target, start, 1)?
            } else if i64::from(current) > target {
                (1, cal.month + 1)
            } else {
                (target as u32, cal.month)
            }
        } else if rules.nearest_weekday {
            let first = days.first()?;
            self.nearest_weekday(cal, i64::from(first), start, first)?
        } else {
            match days.at_or_after(current) {
                Some(d) if d <= last => (d, cal.month),
                _ => (days.first()?, cal.month + 1),
            }
        };

        if day == current && month == cal.month {
            return Some(true);
        }
        cal.set_date(month, day);
        Some(false)
    }

    /// Weekday closest to `day` without leaving its month. Falls back to `fallback` of the
    /// next month when that weekday is already behind `start`.
    fn nearest_weekday(
        &self,
        cal: &WorkingCalendar,
        day: i64,
        start: &WorkingCalendar,
        fallback: u32,
    ) -> Option<(u32, u32)> {
        let next_month = (fallback, cal.month + 1);
        if day < 1 {
            return Some(next_month);
        }
        let day = day as u32;
        let last = cal.days_in_month();

        let mut probe = *cal;
        probe.set_date(cal.month, day);
        let shifted = match probe.day_of_week()? {
            7 if day == 1 => day + 2,
            7 => day - 1,
            1 if day == last => day - 2,
            1 => day + 1,
            _ => day,
        };

        let mut candidate = *cal;
        candidate.day = shifted;
        candidate.normalize();
        if candidate < *start {
            Some(next_month)
        } else {
            Some((shifted, cal.month))
        }
    }

    fn settle_day_of_week(&self, cal: &mut WorkingCalendar) -> Option<bool> {
        let rules = self.fields.rules;
        let days = self.set(Field::DayOfWeek);
        let today = cal.day_of_week()?;
        let last = cal.days_in_month();
        let days_until = |dow: u32| (dow + 7 - today) % 7;

        let day = if rules.last_day_of_week {
            let mut add = days_until(days.first()?);
            if cal.day + add > last {
                cal.set_date(cal.month + 1, 1);
                return Some(false);
            }
            while cal.day + add + 7 <= last {
                add += 7;
            }
            cal.day + add
        } else if rules.nth_day_of_week != 0 {
            let day = cal.day + days_until(days.first()?);
            let week = day.div_ceil(7);
            let nth = rules.nth_day_of_week;
            if nth < week || day + (nth - week) * 7 > last {
                cal.set_date(cal.month + 1, 1);
                return Some(false);
            }
            day + (nth - week) * 7
        } else {
            let dow = days.at_or_after(today).or_else(|| days.first())?;
            let day = cal.day + days_until(dow);
            if day > last {
                cal.set_date(cal.month + 1, 1);
                return Some(false);
            }
            day
        };

        if day == cal.day {
            return Some(true);
        }
        cal.set_date(cal.month, day);
        Some(false)
    }

    fn settle_month(&self, cal: &mut WorkingCalendar) -> Option<bool> {
        let months = self.set(Field::Month);
        match months.at_or_after(cal.month) {
            Some(m) if m == cal.month => Some(true),
            Some(m) => {
                cal.set_date(m, 1);
                Some(false)
            }
            None => {
                cal.year += 1;
                cal.set_date(months.first()?, 1);
                Some(false)
            }
        }
    }

    fn settle_year(&self, cal: &mut WorkingCalendar) -> Option<bool> {
        let year = u32::try_from(cal.year).unwrap_or(0);
        let next = self.set(Field::Year).at_or_after(year)?;
        if next == year {
            return Some(true);
        }
        cal.year = i32::try_from(next).ok()?;
        cal.set_date(1, 1);
        Some(false)
    }

    /// Whether `instant`, truncated to the second, is a fire time.
    pub fn is_satisfied_by(&self, instant: DateTime<Utc>) -> bool {
        let second = instant.trunc_subsecs(0);
        second
            .checked_sub_signed(Duration::seconds(1))
            .and_then(|probe| self.next_after(probe))
            == Some(second)
    }

    /// Earliest whole second after `after` that is not a fire time. Once the forward search
    /// is exhausted every later second is invalid, so the second after the last fire is
    /// returned.
    pub fn next_invalid_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let one = Duration::seconds(1);
        let mut last = after.trunc_subsecs(0);
        loop {
            match self.next_after(last) {
                Some(fire) if fire - last == one => last = self.run_end(fire),
                _ => return last.checked_add_signed(one),
            }
        }
    }

    /// Last second of the widest wall-clock unit around `fire` in which every second fires,
    /// or `fire` itself. A unit whose end reads under another UTC offset is not taken.
    fn run_end(&self, fire: DateTime<Utc>) -> DateTime<Utc> {
        let local = self.zone.to_local(fire);
        let offset = local - fire.naive_utc();

        let minute = self.covers(Field::Second);
        let hour = minute && self.covers(Field::Minute);
        let day = hour && self.covers(Field::Hour);
        let month = day && (self.covers(Field::DayOfMonth) || self.covers(Field::DayOfWeek));
        let year = month && self.covers(Field::Month);

        let date = local.date();
        let (y, mo) = (date.year(), date.month());
        let ends = [
            (year, NaiveDate::from_ymd_opt(y, 12, 31).and_then(|d| d.and_hms_opt(23, 59, 59))),
            (
                month,
                NaiveDate::from_ymd_opt(y, mo, days_in_month(mo, y)).and_then(|d| d.and_hms_opt(23, 59, 59)),
            ),
            (day, date.and_hms_opt(23, 59, 59)),
            (hour, date.and_hms_opt(local.hour(), 59, 59)),
            (minute, date.and_hms_opt(local.hour(), local.minute(), 59)),
        ];
        ends.into_iter()
            .filter_map(|(covered, end)| end.filter(|_| covered))
            .find_map(|end| self.reading_with_offset(&end, offset).filter(|t| *t >= fire))
            .unwrap_or(fire)
    }

    fn reading_with_offset(&self, local: &NaiveDateTime, offset: Duration) -> Option<DateTime<Utc>> {
        let same_offset = |t: &DateTime<Utc>| self.zone.to_local(*t) - t.naive_utc() == offset;
        match self.zone.from_local(local) {
            LocalResult::Single(t) => Some(t).filter(same_offset),
            LocalResult::Ambiguous(earliest, latest) => [latest, earliest].into_iter().find(same_offset),
            LocalResult::None => None,
        }
    }

    /// Every value of the field's domain is allowed.
    fn covers(&self, field: Field) -> bool {
        self.set(field).len() == (field.max() - field.min() + 1) as usize
    }

    /// Probe step for the backward search: the tightest gap of the finest time field with
    /// more than one value, else one day.
    pub fn min_increment(&self) -> Duration {
        for (field, unit) in [(Field::Second, 1), (Field::Minute, 60), (Field::Hour, 3600)] {
            let set = self.set(field);
            if set.len() != 1 {
                let gap = set.min_gap(field.modulus()).unwrap_or(1);
                return Duration::seconds(i64::from(gap) * unit);
            }
        }
        Duration::days(1)
    }

    /// Latest fire time strictly before `before`.
    pub fn previous_before(&self, before: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let one = Duration::seconds(1);
        let mut target = before.trunc_subsecs(0);
        if target < before {
            target = target.checked_add_signed(one)?;
        }
        let floor = search_floor();
        let clear = |t: DateTime<Utc>| self.next_after(t).is_none_or(|fire| fire >= target);

        let increment = self.min_increment();
        let mut lo = target.checked_sub_signed(increment).map_or(floor, |t| t.max(floor));
        if let Some(fire) = self.next_after(lo) {
            if fire < target && clear(fire) {
                return Some(fire);
            }
        }

        // clear(hi) always holds: the first fire after target - 1s is at or after target
        let mut hi = target.checked_sub_signed(one)?;
        let mut step = increment;
        while clear(lo) {
            if lo <= floor {
                debug!("no fire time before {}", before);
                return None;
            }
            hi = lo;
            step = step * 2;
            lo = target.checked_sub_signed(step).map_or(floor, |t| t.max(floor));
        }

        while (hi - lo).num_seconds() > 1 {
            let mid = lo + Duration::seconds((hi - lo).num_seconds() / 2);
            if clear(mid) {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        Some(hi)
    }
}

/// Lower bound of the backward search, a little before the earliest representable year in
/// any zone.
fn search_floor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1969, 12, 30, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
