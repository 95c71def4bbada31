//! Criterion benchmarks for the sample puzzles under `data/`.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use crossfill::arc_consistency::enforce_arc_consistency;
use crossfill::domains::initialize_domains;
use crossfill::{find_fill, Puzzle};

const STRUCTURE0: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/structure0.txt");
const WORDS0: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/words0.txt");
const STRUCTURE1: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/structure1.txt");
const WORDS1: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/words1.txt");

fn bench_fill(c: &mut Criterion) {
    let sample = Puzzle::from_files(STRUCTURE0, WORDS0).expect("failed to load sample puzzle");
    let square = Puzzle::from_files(STRUCTURE1, WORDS1).expect("failed to load word square");

    c.bench_function("find_fill_sample", |b| {
        b.iter(|| assert!(find_fill(black_box(&sample)).is_ok()));
    });

    c.bench_function("find_fill_word_square", |b| {
        b.iter(|| assert!(find_fill(black_box(&square)).is_ok()));
    });
}

fn bench_arc_consistency(c: &mut Criterion) {
    let square = Puzzle::from_files(STRUCTURE1, WORDS1).expect("failed to load word square");
    let domains = initialize_domains(&square);

    c.bench_function("arc_consistency_word_square", |b| {
        b.iter(|| {
            let mut domains = domains.clone();
            black_box(enforce_arc_consistency(&square, &mut domains, None))
        });
    });
}

criterion_group!(benches, bench_fill, bench_arc_consistency);
criterion_main!(benches);
