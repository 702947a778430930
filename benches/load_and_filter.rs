use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use listing_insights::cache::DatasetCache;
use listing_insights::filter::{self, FilterCriteria, HostStatusFilter, PriceRange};
use listing_insights::loader::{self, LoadOptions};
use listing_insights::report::DashboardReport;
use tempfile::TempDir;

fn generate_listings(rows: usize) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let csv_path = temp_dir.path().join("listings.csv");
    let mut file = File::create(&csv_path).expect("create csv");
    writeln!(
        file,
        "listing_id,listing_name,room_type,guests,bedrooms,latitude,longitude,ttm_avg_rate_native,ttm_revenue_native,ttm_occupancy,rating_overall,superhost"
    )
    .expect("header");
    for i in 0..rows {
        let room_type = match i % 4 {
            0 => "entire_home",
            1 => "private_room",
            2 => "hotel_room",
            _ => "shared_room",
        };
        let guests = i % 9;
        let bedrooms = if i % 13 == 0 { String::new() } else { (i % 5).to_string() };
        let rate = 100_000 + (i % 40) * 50_000;
        let lat = -8.5 - (i % 100) as f64 / 1000.0;
        let lon = 115.1 + (i % 100) as f64 / 1000.0;
        let occupancy = (i % 101) as f64 / 100.0;
        writeln!(
            file,
            "{id},Listing &amp; {i},{room_type},{guests},{bedrooms},{lat},{lon},{rate},{revenue},{occupancy},4.{rating},{superhost}",
            id = i % (rows - rows / 50),
            revenue = rate * 200,
            rating = i % 10,
            superhost = i % 3 == 0,
        )
        .expect("row");
    }
    (temp_dir, csv_path)
}

fn bench_pipeline(c: &mut Criterion) {
    let (temp_dir, csv_path) = generate_listings(20_000);
    let options = LoadOptions::new(&csv_path);
    let dataset = loader::load(&options).expect("load");
    let criteria = FilterCriteria::new(
        ["Entire Home".to_string(), "Private Room".to_string()],
        PriceRange::from_thousands(200, 1500).expect("range"),
        HostStatusFilter::All,
    );

    let mut group = c.benchmark_group("listing_pipeline");

    group.bench_function("load_and_clean", |b| {
        b.iter(|| loader::load(&options).expect("load"));
    });

    group.bench_function("cached_load", |b| {
        b.iter_batched(
            || {
                let mut cache = DatasetCache::new();
                cache.get_or_load(&options).expect("warm cache");
                cache
            },
            |mut cache| cache.get_or_load(&options).expect("cached"),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("filter_and_report", |b| {
        b.iter(|| {
            let view = filter::filter(&dataset, &criteria)
                .into_view()
                .expect("rows");
            DashboardReport::build(&view)
        });
    });

    drop(temp_dir);
    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
