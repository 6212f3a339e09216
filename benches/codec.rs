use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};

use cbor_codec::{from_slice, to_vec};

#[derive(Serialize, Deserialize, Clone)]
struct User {
    id: u32,
    name: String,
    email: String,
    active: bool,
}

#[derive(Serialize, Deserialize, Clone)]
struct Telemetry {
    device: String,
    readings: Vec<f64>,
    flags: Vec<bool>,
    payload: Vec<u8>,
}

fn benchmark_encode_simple(c: &mut Criterion) {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    };

    c.bench_function("encode_simple_struct", |b| {
        b.iter(|| to_vec(black_box(&user)).unwrap())
    });
}

fn benchmark_decode_simple(c: &mut Criterion) {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    };
    let bytes = to_vec(&user).unwrap();

    c.bench_function("decode_simple_struct", |b| {
        b.iter(|| from_slice::<User>(black_box(&bytes)).unwrap())
    });
}

fn benchmark_round_trip_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_trip_telemetry");
    for size in [16usize, 256, 4096] {
        let sample = Telemetry {
            device: "sensor-7".to_string(),
            readings: (0..size).map(|i| i as f64 * 0.5).collect(),
            flags: (0..size).map(|i| i % 3 == 0).collect(),
            payload: (0..size).map(|i| i as u8).collect(),
        };
        group.bench_with_input(BenchmarkId::from_parameter(size), &sample, |b, sample| {
            b.iter(|| {
                let bytes = to_vec(black_box(sample)).unwrap();
                from_slice::<Telemetry>(&bytes).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_encode_simple,
    benchmark_decode_simple,
    benchmark_round_trip_sizes
);
criterion_main!(benches);
