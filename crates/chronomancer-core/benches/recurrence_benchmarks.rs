use chrono::{DateTime, TimeZone, Utc};
use chronomancer_core::coverage::{evenly_divides, realized_lengths};
use chronomancer_core::{CalendarDuration, Exception, Reconfiguration, Recurrence, Sequence, Window};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 31, 9, 30, 0).unwrap()
}

fn create_test_recurrence(interval: CalendarDuration, occurrences: Option<u32>) -> Recurrence {
    Recurrence::new(start(), interval, occurrences).unwrap()
}

fn bench_occurrence_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("occurrence_generation");

    for (name, interval) in [
        ("daily", CalendarDuration::days(1)),
        ("monthly", CalendarDuration::months(1)),
    ] {
        let recurrence = create_test_recurrence(interval, None);
        for count in [12usize, 120, 1200].iter() {
            group.bench_with_input(BenchmarkId::new(name, count), count, |b, count| {
                b.iter(|| recurrence.all().take(black_box(*count)).count())
            });
        }
    }
    group.finish();
}

fn bench_occurrence_generation_with_exceptions(c: &mut Criterion) {
    let mut recurrence = create_test_recurrence(CalendarDuration::days(1), Some(365));

    // skip every fifth day and one whole week
    let exceptions: Vec<Exception> = vec![
        Recurrence::new(start(), CalendarDuration::days(5), None).unwrap().into(),
        Window::new(
            start() + chrono::TimeDelta::days(100),
            start() + chrono::TimeDelta::days(106),
        )
        .unwrap()
        .into(),
    ];

    c.bench_function("occurrence_generation_with_exceptions", |b| {
        b.iter(|| {
            recurrence.with_exceptions(black_box(exceptions.clone()), |r| r.to_vec().unwrap())
        })
    });
}

fn bench_random_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_access");

    for (name, interval) in [
        ("fixed", CalendarDuration::weeks(1)),
        ("calendar", CalendarDuration::months(1)),
    ] {
        let recurrence = create_test_recurrence(interval, None);
        for index in [10u32, 100, 1000].iter() {
            group.bench_with_input(BenchmarkId::new(name, index), index, |b, index| {
                b.iter(|| recurrence.at(black_box(*index)).unwrap())
            });
        }
    }
    group.finish();
}

fn bench_membership(c: &mut Criterion) {
    let recurrence = create_test_recurrence(CalendarDuration::months(1), None);
    let far = recurrence.at(600).unwrap();

    c.bench_function("contains_far_occurrence", |b| {
        b.iter(|| recurrence.contains(black_box(far)))
    });

    c.bench_function("next_after_far_time", |b| {
        b.iter(|| recurrence.next_after(black_box(far)).unwrap())
    });
}

fn bench_coverage(c: &mut Criterion) {
    let mut group = c.benchmark_group("coverage");

    for months in [1u32, 12, 60].iter() {
        let coarser = CalendarDuration::months(*months);
        group.bench_with_input(BenchmarkId::new("realized_lengths", months), &coarser, |b, coarser| {
            b.iter(|| realized_lengths(black_box(*coarser)))
        });
        group.bench_with_input(BenchmarkId::new("evenly_divides", months), &coarser, |b, coarser| {
            b.iter(|| evenly_divides(black_box(CalendarDuration::days(1)), black_box(*coarser)))
        });
    }
    group.finish();
}

fn bench_sequence_enumeration(c: &mut Criterion) {
    let mut sequence = Sequence::new(create_test_recurrence(CalendarDuration::weeks(1), Some(520)));
    for stop in [50u32, 100, 150] {
        let stop = sequence.active().at(10).unwrap() + chrono::TimeDelta::days(i64::from(stop));
        sequence
            .reconfigure(Some(stop), None, Reconfiguration::new())
            .unwrap();
    }
    sequence.pause(Recurrence::new(start(), CalendarDuration::weeks(3), None).unwrap());

    c.bench_function("sequence_enumeration", |b| {
        b.iter(|| black_box(&sequence).each().count())
    });
}

criterion_group!(
    benches,
    bench_occurrence_generation,
    bench_occurrence_generation_with_exceptions,
    bench_random_access,
    bench_membership,
    bench_coverage,
    bench_sequence_enumeration
);
criterion_main!(benches);
