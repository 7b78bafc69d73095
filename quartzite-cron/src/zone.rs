//! Time zones an expression can be evaluated in.

use crate::error::CronError;
use chrono::{DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

/// Zone in which an expression's wall-clock fields are interpreted.
///
/// `Local` is resolved against the system zone at query time, not when the expression
/// is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    #[default]
    Local,
    Utc,
    Fixed(FixedOffset),
    Named(Tz),
}

impl Zone {
    /// Wall-clock reading of `instant` in this zone.
    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Zone::Local => instant.with_timezone(&Local).naive_local(),
            Zone::Utc => instant.naive_utc(),
            Zone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
            Zone::Named(tz) => instant.with_timezone(tz).naive_local(),
        }
    }

    /// Instants that read as `local` in this zone: none inside a DST gap, two inside an
    /// overlap.
    pub fn from_local(&self, local: &NaiveDateTime) -> LocalResult<DateTime<Utc>> {
        match self {
            Zone::Local => Local.from_local_datetime(local).map(|dt| dt.with_timezone(&Utc)),
            Zone::Utc => Utc.from_local_datetime(local),
            Zone::Fixed(offset) => offset.from_local_datetime(local).map(|dt| dt.with_timezone(&Utc)),
            Zone::Named(tz) => tz.from_local_datetime(local).map(|dt| dt.with_timezone(&Utc)),
        }
    }

    /// Earliest instant reading as `local` that is strictly after `after`.
    pub(crate) fn resolve_after(&self, local: &NaiveDateTime, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.from_local(local) {
            LocalResult::Single(t) => (t > after).then_some(t),
            LocalResult::Ambiguous(earliest, latest) => [earliest, latest]
                .into_iter()
                .filter(|t| *t > after)
                .min(),
            LocalResult::None => None,
        }
    }
}

impl From<Tz> for Zone {
    fn from(tz: Tz) -> Self {
        Zone::Named(tz)
    }
}

impl From<FixedOffset> for Zone {
    fn from(offset: FixedOffset) -> Self {
        Zone::Fixed(offset)
    }
}

impl FromStr for Zone {
    type Err = CronError;

    /// Accepts `UTC`/`Z`, `LOCAL`/`SYSTEM`, offsets like `+05:30`, and IANA names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
            return Ok(Zone::Utc);
        }
        if trimmed.eq_ignore_ascii_case("local") || trimmed.eq_ignore_ascii_case("system") {
            return Ok(Zone::Local);
        }
        if trimmed.starts_with('+') || trimmed.starts_with('-') {
            return trimmed
                .parse::<FixedOffset>()
                .map(Zone::Fixed)
                .map_err(|e| CronError::InvalidTimeZone(format!("{}: {}", trimmed, e)));
        }
        trimmed
            .parse::<Tz>()
            .map(Zone::Named)
            .map_err(|_| CronError::InvalidTimeZone(trimmed.to_string()))
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Local => f.write_str("LOCAL"),
            Zone::Utc => f.write_str("UTC"),
            Zone::Fixed(offset) => write!(f, "{}", offset),
            Zone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_zone_names() {
        assert_eq!("utc".parse::<Zone>().unwrap(), Zone::Utc);
        assert_eq!("SYSTEM".parse::<Zone>().unwrap(), Zone::Local);
        assert_eq!(
            "Europe/Berlin".parse::<Zone>().unwrap(),
            Zone::Named(chrono_tz::Europe::Berlin)
        );
        assert_eq!(
            "+05:30".parse::<Zone>().unwrap(),
            Zone::Fixed(FixedOffset::east_opt(5 * 3600 + 1800).unwrap())
        );
        assert!("Mars/Olympus_Mons".parse::<Zone>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for name in ["UTC", "LOCAL", "America/New_York", "+02:00"] {
            let zone: Zone = name.parse().unwrap();
            assert_eq!(zone.to_string().parse::<Zone>().unwrap(), zone);
        }
    }

    #[test]
    fn test_gap_and_overlap() {
        let zone = Zone::Named(chrono_tz::America::New_York);
        let epoch = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();

        // 2024-03-10 02:30 does not exist in New York
        let gap = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap().and_hms_opt(2, 30, 0).unwrap();
        assert_eq!(zone.resolve_after(&gap, epoch), None);

        // 2024-11-03 01:30 happens twice
        let overlap = NaiveDate::from_ymd_opt(2024, 11, 3).unwrap().and_hms_opt(1, 30, 0).unwrap();
        let first = zone.resolve_after(&overlap, epoch).unwrap();
        assert_eq!(first, Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap());
        let second = zone.resolve_after(&overlap, first).unwrap();
        assert_eq!(second, Utc.with_ymd_and_hms(2024, 11, 3, 6, 30, 0).unwrap());
    }
}
