//! Benchmarks for cron expression parsing and fire time search
//!
//! Measures parse cost across expression shapes and the forward and backward
//! searches for schedules that hit the expensive day rules.

use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use quartzite::{CronExpression, CronPresets, Zone};

const EXPRESSIONS: &[(&str, &str)] = &[
    ("every_second", CronPresets::EVERY_SECOND),
    ("weekdays", "0 0/15 9-17 ? * MON-FRI"),
    ("last_weekday", CronPresets::LAST_WEEKDAY_OF_MONTH),
    ("third_friday", "0 0 0 ? * 6#3"),
    ("wrapping_ranges", "0 50-10/5 22-2 ? NOV-FEB *"),
    ("leap_day", "0 0 0 29 2 ?"),
];

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("cron_parse");

    for (name, expression) in EXPRESSIONS {
        group.bench_with_input(BenchmarkId::from_parameter(name), expression, |b, expr| {
            b.iter(|| black_box(CronExpression::parse(black_box(expr))))
        });
    }

    group.bench_function("rejected", |b| {
        b.iter(|| black_box(CronExpression::parse(black_box("0 0 0 1 1 1"))))
    });

    group.finish();
}

fn bench_next_fire_time(c: &mut Criterion) {
    let mut group = c.benchmark_group("cron_next_fire_time");
    let after = Utc.with_ymd_and_hms(2024, 3, 1, 12, 34, 56).unwrap();

    for (name, expression) in EXPRESSIONS {
        let expr = CronExpression::parse(expression).unwrap().with_time_zone(Zone::Utc);
        group.bench_with_input(BenchmarkId::from_parameter(name), &expr, |b, expr| {
            b.iter(|| black_box(expr.next_fire_time(black_box(after))))
        });
    }

    let zoned = CronExpression::parse("0 30 2 * * ?")
        .unwrap()
        .with_time_zone(chrono_tz::America::New_York);
    let before_gap = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
    group.bench_function("dst_gap", |b| {
        b.iter(|| black_box(zoned.next_fire_time(black_box(before_gap))))
    });

    group.finish();
}

fn bench_previous_fire_time(c: &mut Criterion) {
    let mut group = c.benchmark_group("cron_previous_fire_time");
    let before = Utc.with_ymd_and_hms(2024, 3, 1, 12, 34, 56).unwrap();

    for (name, expression) in EXPRESSIONS {
        let expr = CronExpression::parse(expression).unwrap().with_time_zone(Zone::Utc);
        group.bench_with_input(BenchmarkId::from_parameter(name), &expr, |b, expr| {
            b.iter(|| black_box(expr.previous_fire_time(black_box(before))))
        });
    }

    group.finish();
}

fn bench_upcoming(c: &mut Criterion) {
    let expr = CronExpression::parse(CronPresets::EVERY_5_MINUTES)
        .unwrap()
        .with_time_zone(Zone::Utc);
    let after = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    c.bench_function("cron_upcoming_100", |b| {
        b.iter(|| black_box(expr.upcoming(after).take(100).count()))
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_next_fire_time,
    bench_previous_fire_time,
    bench_upcoming
);
criterion_main!(benches);
