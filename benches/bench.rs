// Criterion benchmarks for homerank

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use homerank::core::{
    distance::{annotate_distances, geodesic_distance, haversine_distance},
    RankOptions, Ranker, ScoringParams,
};
use homerank::models::{DistanceMethod, DistanceUnit, Listing, PreferenceProfile, ReferencePoint};

fn create_listing(id: usize, lat: f64, lon: f64) -> Listing {
    let mut listing = Listing::new(format!("listing-{}", id));
    listing.city = "Austin".to_string();
    listing.state = "TX".to_string();
    listing.price = Some(150_000 + (id as u64 % 40) * 10_000);
    listing.bedrooms = Some(1 + (id % 5) as u32);
    listing.bathrooms = Some(1.0 + (id % 3) as f64);
    listing.sqft = Some(900 + (id % 20) as u32 * 100);
    listing.year_built = Some(1950 + (id % 75) as i32);
    listing.latitude = Some(lat);
    listing.longitude = Some(lon);
    listing
}

fn reference_points() -> Vec<ReferencePoint> {
    vec![
        ReferencePoint::new("downtown", 30.2672, -97.7431),
        ReferencePoint::new("airport", 30.1975, -97.6664),
        ReferencePoint::new("domain", 30.4021, -97.7253),
    ]
}

fn bench_distances(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(30.2672),
                black_box(-97.7431),
                black_box(30.1975),
                black_box(-97.6664),
            )
        });
    });

    c.bench_function("geodesic_distance", |b| {
        b.iter(|| {
            geodesic_distance(
                black_box(30.2672),
                black_box(-97.7431),
                black_box(30.1975),
                black_box(-97.6664),
            )
        });
    });
}

fn bench_annotation(c: &mut Criterion) {
    let listing = create_listing(1, 30.3, -97.7);
    let refs = reference_points();

    c.bench_function("annotate_distances_3_refs", |b| {
        b.iter(|| {
            annotate_distances(
                black_box(&listing),
                black_box(&refs),
                DistanceUnit::Miles,
                DistanceMethod::Haversine,
            )
        });
    });
}

fn bench_ranking(c: &mut Criterion) {
    let ranker = Ranker::new(ScoringParams::default());
    let profile = PreferenceProfile::default();
    let refs = reference_points();
    let options = RankOptions {
        limit: Some(20),
        current_year: Some(2025),
        ..Default::default()
    };

    let mut group = c.benchmark_group("ranking");

    for candidate_count in [10, 50, 100, 500, 1000].iter() {
        let candidates: Vec<Listing> = (0..*candidate_count)
            .map(|i| {
                let lat_offset = (i as f64 * 0.001) % 0.3;
                let lon_offset = (i as f64 * 0.0007) % 0.3;
                create_listing(i, 30.15 + lat_offset, -97.85 + lon_offset)
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::new("rank", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    ranker.rank(
                        black_box(&profile),
                        black_box(&refs),
                        black_box(candidates.clone()),
                        black_box(&options),
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_distances, bench_annotation, bench_ranking);

criterion_main!(benches);
