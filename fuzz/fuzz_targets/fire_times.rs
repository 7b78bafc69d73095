//! Fuzz target for fire time search.
//!
//! Builds expressions from arbitrary field choices and checks the ordering
//! guarantees of next and previous fire times around an arbitrary instant.

#![no_main]

use arbitrary::Arbitrary;
use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use quartzite_cron::{CronExpression, Zone};

const SECONDS: &[&str] = &["0", "*", "*/7", "5,35", "50-10"];
const MINUTES: &[&str] = &["0", "*", "*/13", "59", "45-15/10"];
const HOURS: &[&str] = &["0", "*", "23-2", "9-17/2", "12"];
const DAYS: &[(&str, &str)] = &[
    ("*", "?"),
    ("L", "?"),
    ("L-5W", "?"),
    ("1W", "?"),
    ("29", "?"),
    ("?", "SAT,SUN"),
    ("?", "1L"),
    ("?", "4#4"),
];
const MONTHS: &[&str] = &["*", "FEB", "DEC-MAR", "*/4"];

/// Arbitrary schedule and probe instant.
#[derive(Debug, Arbitrary)]
struct FuzzQuery {
    second: u8,
    minute: u8,
    hour: u8,
    day: u8,
    month: u8,
    /// Seconds since 2000-01-01
    offset: u32,
}

fn pick<T: Copy>(options: &[T], index: u8) -> T {
    options[index as usize % options.len()]
}

fuzz_target!(|query: FuzzQuery| {
    let (dom, dow) = pick(DAYS, query.day);
    let text = format!(
        "{} {} {} {} {} {}",
        pick(SECONDS, query.second),
        pick(MINUTES, query.minute),
        pick(HOURS, query.hour),
        dom,
        pick(MONTHS, query.month),
        dow
    );
    let expr = CronExpression::parse(&text).expect("generated expression must parse").with_time_zone(Zone::Utc);

    let Some(t) = Utc.timestamp_opt(946_684_800 + i64::from(query.offset), 0).single() else {
        return;
    };

    if let Some(next) = expr.next_fire_time(t) {
        assert!(next > t, "{}: next {} not after {}", text, next, t);
        assert!(expr.is_satisfied_by(next), "{}: {} not satisfied", text, next);
    }
    if let Some(previous) = expr.previous_fire_time(t) {
        assert!(previous < t, "{}: previous {} not before {}", text, previous, t);
        assert!(expr.next_fire_time(previous).is_none_or(|n| n >= t), "{}: skipped fire before {}", text, t);
    }
    if let Some(invalid) = expr.next_invalid_time_after(t) {
        assert!(invalid > t && !expr.is_satisfied_by(invalid), "{}: {} is not invalid", text, invalid);
    }
});
