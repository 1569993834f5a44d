//! Benchmarks for graph insertion and matching.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use graphmaster::category::Category;
use graphmaster::config::GraphConfig;
use graphmaster::graph::Graphmaster;

const WORDS: [&str; 16] = [
    "WHAT", "IS", "YOUR", "NAME", "I", "LIKE", "THE", "WEATHER", "DO", "YOU", "KNOW", "ABOUT",
    "MUSIC", "CATS", "TELL", "ME",
];

/// A synthetic corpus mixing literal rules with wildcard rules.
fn corpus(size: usize) -> Vec<Category> {
    (0..size)
        .map(|i| {
            let mut words: Vec<&str> = (0..4)
                .map(|k| WORDS[(i >> (k * 4)) % WORDS.len()])
                .collect();
            match i % 4 {
                0 => words.push("*"),
                1 => words.insert(0, "_"),
                2 => words.push("^"),
                _ => {}
            }
            Category::new(&words.join(" "), "")
        })
        .collect()
}

fn build(size: usize) -> Graphmaster {
    let mut g = Graphmaster::new("bench", GraphConfig::default());
    for c in corpus(size) {
        g.add(c);
    }
    g.add(Category::new("*", ""));
    g
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("insert_10k", |bench| bench.iter(|| black_box(build(10_000))));
}

fn bench_match_literal(c: &mut Criterion) {
    let g = build(10_000);
    c.bench_function("match_literal_10k", |bench| {
        bench.iter(|| black_box(g.match_input("what is your name", "unknown", "unknown")))
    });
}

fn bench_match_fallback(c: &mut Criterion) {
    let g = build(10_000);
    c.bench_function("match_fallback_10k", |bench| {
        bench.iter(|| {
            black_box(g.match_input(
                "tell me something nobody has ever said to a bot before",
                "unknown",
                "unknown",
            ))
        })
    });
}

criterion_group!(benches, bench_insert, bench_match_literal, bench_match_fallback);
criterion_main!(benches);
