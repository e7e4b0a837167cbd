//! Benchmarks for model building and the continuation walk.
//!
//! Run with: cargo bench -p chordwalk --bench generate

use chordwalk::model::Model;
use chordwalk::{GenerateParams, Note, generate, segment_notes};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

/// Block chords of `size` pitches, one per second, cycling through a scale.
fn chord_progression(size: u8, bars: u8) -> Vec<Note> {
    let scale = [48u8, 50, 52, 53, 55, 57, 59];
    let mut notes = Vec::new();
    for bar in 0..bars {
        for voice in 0..size {
            let degree = (bar as usize + 2 * voice as usize) % scale.len();
            let octave = 12 * (voice / 3);
            notes.push(Note::new(scale[degree] + octave, bar as f64, 1.0, 64 + voice));
        }
    }
    notes
}

fn bench_model_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_build");
    for size in [3u8, 5, 7] {
        let notes = chord_progression(size, 32);
        let segments = segment_notes(&notes, 1.0 / 96.0, &mut StdRng::seed_from_u64(0)).unwrap();
        group.bench_with_input(BenchmarkId::new("loosened", size), &segments, |b, segs| {
            b.iter(|| Model::build(black_box(segs), true))
        });
        group.bench_with_input(BenchmarkId::new("strict", size), &segments, |b, segs| {
            b.iter(|| Model::build(black_box(segs), false))
        });
    }
    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let notes = chord_progression(4, 32);
    let params = GenerateParams::new(1.0 / 96.0, 120.0)
        .with_variation(0.2)
        .with_loosen(true)
        .with_include_new(true);
    c.bench_function("generate_loosened_online", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| generate(black_box(&notes), &params, &mut rng).unwrap())
    });
}

criterion_group!(benches, bench_model_build, bench_generate);
criterion_main!(benches);
