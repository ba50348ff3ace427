// Performance benchmarks for overlay-clock
//
// Run with: cargo bench
// View results in: target/criterion/report/index.html

use chrono::{FixedOffset, TimeZone};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::{Duration, Instant};

use overlay_clock::{
    clock::{ClockState, ManualClock, TimeFormat, TimeSource},
    geometry::Rect,
    position::Placement,
    schedule::UpdateScheduler,
};

fn manual_clock() -> ManualClock {
    let wall = FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2024, 3, 1, 8, 59, 59)
        .unwrap();
    ManualClock::new(wall)
}

/// Benchmark the exposure overlap test
fn bench_overlap(c: &mut Criterion) {
    let painted = Rect::new(1800, 20, 100, 14);
    let exposures = [
        Rect::new(0, 0, 1920, 1080),
        Rect::new(1790, 10, 10, 10),
        Rect::new(0, 500, 300, 300),
    ];

    c.bench_function("rect_overlaps", |b| {
        b.iter(|| {
            exposures
                .iter()
                .filter(|e| black_box(painted).overlaps(e))
                .count()
        })
    });
}

/// Benchmark time formatting with different patterns
fn bench_time_format(c: &mut Criterion) {
    let time = manual_clock();
    let mut group = c.benchmark_group("time_format");

    for pattern in ["%T", "%-H:%M", "%a %d %b %Y, %H:%M:%S %z"] {
        let format = TimeFormat::new(pattern).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(pattern), &format, |b, format| {
            b.iter(|| format.format(black_box(&time.wall())).unwrap())
        });
    }

    group.finish();
}

/// Benchmark a clock tick: format plus change detection
fn bench_clock_update(c: &mut Criterion) {
    let time = manual_clock();
    let mut state = ClockState::new(TimeFormat::default(), &time).unwrap();

    c.bench_function("clock_update", |b| {
        b.iter(|| {
            time.advance(Duration::from_millis(250));
            black_box(state.update(&time).unwrap())
        })
    });
}

/// Benchmark placement and scheduling arithmetic
fn bench_layout(c: &mut Criterion) {
    let placement = Placement::new(-20, -20);
    let scheduler = UpdateScheduler::default();
    let start = Instant::now();

    c.bench_function("placement_origin", |b| {
        b.iter(|| placement.origin(black_box((1920, 1080)), black_box((120, 14))))
    });

    c.bench_function("scheduler_check", |b| {
        b.iter(|| scheduler.check(black_box(start), black_box(start + Duration::from_millis(400))))
    });
}

criterion_group!(
    benches,
    bench_overlap,
    bench_time_format,
    bench_clock_update,
    bench_layout,
);
criterion_main!(benches);
