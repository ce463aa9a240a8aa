use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ultraplan::{
    AidStation, AllocationPolicy, NutritionRatePlan, RacePlan, RaceProfile, compute_schedule,
    hourly_plan, render_report,
};

fn create_stations(count: usize, total_distance: f64) -> Vec<AidStation> {
    // Reverse order so the sort has work to do
    (0..count)
        .rev()
        .map(|i| {
            let distance = total_distance * (i as f64 + 1.0) / (count as f64 + 1.0);
            AidStation::new(i.to_string(), format!("Aid Station {i}"), distance)
        })
        .collect()
}

fn bench_compute_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_schedule");
    let rates = NutritionRatePlan::default();

    for count in [10, 100, 1000] {
        let stations = create_stations(count, 160.0);
        group.bench_with_input(BenchmarkId::from_parameter(count), &stations, |b, stations| {
            b.iter(|| {
                black_box(
                    compute_schedule(
                        160.0,
                        30.0,
                        &rates,
                        stations,
                        AllocationPolicy::SegmentFromPrevious,
                    )
                    .unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let profile = RaceProfile::new("Tor des Geants", 330.0, 120.0).unwrap();
    let plan = RacePlan::compute(
        profile.clone(),
        NutritionRatePlan::default(),
        create_stations(50, 330.0),
        AllocationPolicy::SegmentToNext,
    )
    .unwrap();

    c.bench_function("render_report", |b| {
        b.iter(|| black_box(render_report(&plan).unwrap()));
    });

    c.bench_function("hourly_plan", |b| {
        b.iter(|| black_box(hourly_plan(&profile, &plan.rates, &plan.aid_stations).unwrap()));
    });
}

criterion_group!(benches, bench_compute_schedule, bench_report);
criterion_main!(benches);
