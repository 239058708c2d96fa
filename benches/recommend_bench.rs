use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nu_plugin_agronomy::algo::crop::{self, CropInput};
use nu_plugin_agronomy::algo::fertilizer::{self, FertilizerInput};
use nu_plugin_agronomy::algo::parse::{parse_lenient, RawField};
use nu_plugin_agronomy::ops;
use serde_json::{json, Value};

/// Synthetic field readings spread around the crop centroids.
fn generate_readings(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            let jitter = (i % 17) as f64;
            json!({
                "nitrogen": 20.0 + (i % 100) as f64,
                "phosphorous": 15.0 + jitter * 7.0,
                "potassium": 10.0 + jitter * 11.0,
                "temperature": 18.0 + jitter,
                "humidity": 20.0 + (i % 75) as f64,
                "ph": 5.5 + jitter / 10.0,
                "rainfall": format!("{}mm", 40 + i % 200),
            })
        })
        .collect()
}

fn rice_input() -> CropInput {
    CropInput {
        nitrogen: RawField::Number(80.0),
        phosphorous: RawField::Number(48.0),
        potassium: RawField::Number(40.0),
        temperature: RawField::Number(24.0),
        humidity: RawField::Number(82.0),
        ph: RawField::Number(6.4),
        rainfall: RawField::Number(236.0),
    }
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse/lenient", |b| {
        b.iter(|| parse_lenient(black_box(" 236.5mm")))
    });
}

fn bench_recommend_crop(c: &mut Criterion) {
    let input = rice_input();
    crop::crop_table().unwrap();
    c.bench_function("recommend/crop", |b| {
        b.iter(|| crop::recommend_crop(black_box(&input)).unwrap())
    });
}

fn bench_recommend_fertilizer(c: &mut Criterion) {
    let input = FertilizerInput {
        nitrogen: RawField::Number(12.0),
        phosphorous: RawField::Number(36.0),
        potassium: RawField::Number(0.0),
        temperature: RawField::Number(29.0),
        humidity: RawField::Number(52.0),
        moisture: RawField::Number(45.0),
        soil_type: Some("Loamy".into()),
        crop_type: Some("Sugarcane".into()),
    };
    fertilizer::fertilizer_table().unwrap();
    c.bench_function("recommend/fertilizer", |b| {
        b.iter(|| fertilizer::recommend_fertilizer(black_box(&input)).unwrap())
    });
}

fn bench_op_crop(c: &mut Criterion) {
    let mut group = c.benchmark_group("op_crop");
    for size in [100, 1000, 10000] {
        let rows = generate_readings(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &rows, |b, r| {
            b.iter(|| black_box(ops::op_crop(r).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_recommend_crop,
    bench_recommend_fertilizer,
    bench_op_crop,
);
criterion_main!(benches);
