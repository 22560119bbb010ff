//! Benchmarks for snapshot derivation and device listing
//!
//! Run with: cargo bench

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use envmon::readings::{derive_snapshot, FeedResponse, RawRow};
use envmon::store::{Database, DeviceStore, NewDevice};
use serde_json::json;
use tempfile::tempdir;

fn create_test_rows(count: usize) -> Vec<RawRow> {
    (0..count)
        .map(|i| {
            // Alternate numeric and string encodings, as real feeds do
            let row = if i % 2 == 0 {
                json!({
                    "DateTime": "2024-05-01T08:00:00Z",
                    "Temperature": 20.0 + (i % 10) as f64 * 0.37,
                    "humidity": 45.5,
                    "tvoc": 180 + (i % 200),
                    "eco2": 700 + (i % 500),
                    "airquality": 1,
                })
            } else {
                json!({
                    "DateTime": "2024-05-01 08:30:00",
                    "Temperature": format!("{:.2}", 21.0 + (i % 7) as f64 * 0.41),
                    "humidity": "51.25",
                    "tvoc": format!("{}", 220 + (i % 150)),
                    "eco2": "912",
                    "airquality": "0",
                })
            };
            serde_json::from_value(row).unwrap()
        })
        .collect()
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for size in [24, 1000, 10000] {
        let rows = create_test_rows(size);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("derive_window_24_of_{}", size), |b| {
            b.iter(|| derive_snapshot("bench", black_box(&rows), 24, Utc::now()))
        });

        group.bench_function(format!("derive_window_500_of_{}", size), |b| {
            b.iter(|| derive_snapshot("bench", black_box(&rows), 500, Utc::now()))
        });
    }

    group.finish();
}

fn bench_feed_parse(c: &mut Criterion) {
    let rows: Vec<serde_json::Value> = (0..1000)
        .map(|i| json!({ "DateTime": "2024-05-01T08:00:00Z", "Temperature": i, "humidity": "50" }))
        .collect();
    let body = json!({ "success": true, "data": rows }).to_string();

    c.bench_function("parse_feed_1000", |b| {
        b.iter(|| serde_json::from_str::<FeedResponse>(black_box(&body)).unwrap())
    });
}

fn bench_device_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("device_store");

    let dir = tempdir().unwrap();
    let devices = DeviceStore::new(Database::open(dir.path().join("bench.db")).unwrap());

    for i in 0..200 {
        devices
            .create(NewDevice {
                name: Some(format!("Sensor {}", i)),
                script_url: Some("AKfycbBench".to_string()),
                user_id: Some(if i % 2 == 0 { "owner-a" } else { "owner-b" }.to_string()),
                ..Default::default()
            })
            .unwrap();
    }

    group.bench_function("list_for_owner_100", |b| {
        b.iter(|| devices.list_for_owner(black_box("owner-a")).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_snapshot, bench_feed_parse, bench_device_store);
criterion_main!(benches);
