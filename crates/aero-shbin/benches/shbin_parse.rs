#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
use aero_shbin::test_utils::{EntryPointBuilder, ShbinBuilder};
#[cfg(not(target_arch = "wasm32"))]
use aero_shbin::{
    validate, ComponentMask, ConstantInfo, Float24, OutputRegisterInfo, OutputRegisterType,
    ShaderBinary, ShaderType,
};
#[cfg(not(target_arch = "wasm32"))]
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

#[cfg(not(target_arch = "wasm32"))]
fn criterion_config() -> Criterion {
    // Parses take microseconds.
    let ci = matches!(std::env::var("AERO_BENCH_PROFILE").as_deref(), Ok("ci"));
    let (warm_up, measurement, samples) = if ci {
        (Duration::from_millis(100), Duration::from_millis(500), 10)
    } else {
        (Duration::from_millis(500), Duration::from_secs(2), 50)
    };
    Criterion::default()
        .warm_up_time(warm_up)
        .measurement_time(measurement)
        .sample_size(samples)
        .noise_threshold(0.05)
}

/// A binary shaped like a typical compiled shader: a few hundred instructions
/// and a handful of entry points with populated tables.
#[cfg(not(target_arch = "wasm32"))]
fn build_binary(entry_points: u32) -> Vec<u8> {
    let code: Vec<u32> = (0..512u32).map(|i| 0x4C00_0000 | i).collect();
    let mut builder = ShbinBuilder::new().code(&code).filename("bench.vsh");
    for ep in 0..entry_points {
        let mut entry = EntryPointBuilder::new(ShaderType::Vertex).main(ep * 64, ep * 64 + 63);
        for c in 0..16 {
            entry = entry.constant(ConstantInfo::float(c, [Float24::ONE; 4]));
        }
        for l in 0..8 {
            entry = entry.label(l, ep * 64 + l, &format!("label_{ep}_{l}"));
        }
        for o in 0..4u16 {
            entry = entry.output(OutputRegisterInfo::new(
                OutputRegisterType::TexCoord0,
                o,
                ComponentMask::all(),
            ));
        }
        for u in 0..8u16 {
            entry = entry.uniform(&format!("uniform_{u}"), 0x10 + u * 4, 0x13 + u * 4);
        }
        builder = builder.entry_point(entry);
    }
    builder.build()
}

#[cfg(not(target_arch = "wasm32"))]
fn bench_parse(c: &mut Criterion) {
    let bytes = build_binary(8);

    let mut group = c.benchmark_group("shbin_parse");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("parse", |b| {
        b.iter(|| {
            let binary = ShaderBinary::parse(black_box(&bytes)).unwrap();
            black_box(binary.entry_points().len())
        })
    });
    group.bench_function("parse_and_resolve", |b| {
        b.iter(|| {
            let binary = ShaderBinary::parse(black_box(&bytes)).unwrap();
            let mut names = 0usize;
            for entry in binary.entry_points() {
                names += entry.named_uniforms().unwrap().len();
            }
            black_box(names)
        })
    });
    group.finish();

    let binary = ShaderBinary::parse(&bytes).unwrap();
    c.bench_function("shbin_validate", |b| {
        b.iter(|| black_box(validate(black_box(&binary)).len()))
    });
}

#[cfg(not(target_arch = "wasm32"))]
criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_parse
}
#[cfg(not(target_arch = "wasm32"))]
criterion_main!(benches);
