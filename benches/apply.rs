//! Benchmarks for regex-filter
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use regex_filter::{hydrate, Action, ConfigDocument, RawRuleRecord, RuleStore};

fn document() -> ConfigDocument {
    let mut doc = ConfigDocument::default();
    doc.replace_rules.push(RawRuleRecord::new(r"\bcolour\b", "color", Action::Replace));
    doc.replace_rules.push(RawRuleRecord::new(r"(\d+)\s*km", "$1 kilometres", Action::Replace));
    doc.delete_rules.push(RawRuleRecord::PatternOnly(r"\s+$".to_string()));
    doc.append_rules.push(RawRuleRecord::new(r"[.!?]$", " ~", Action::Append));
    doc.prepend_rules.push(RawRuleRecord::new(r"(?<=\n)Note", "> ", Action::Prepend));
    doc
}

fn store() -> RuleStore {
    hydrate(&mut document()).store
}

/// Benchmark hydrating a document
fn bench_hydrate(c: &mut Criterion) {
    c.bench_function("hydrate", |b| {
        b.iter(|| {
            let mut doc = document();
            black_box(hydrate(&mut doc))
        })
    });
}

/// Benchmark hydrating an empty document (default fallback)
fn bench_hydrate_defaults(c: &mut Criterion) {
    c.bench_function("hydrate_defaults", |b| {
        b.iter(|| {
            let mut doc = ConfigDocument::default();
            black_box(hydrate(&mut doc))
        })
    });
}

/// Benchmark a short reply no rule touches
fn bench_apply_no_match(c: &mut Criterion) {
    let store = store();
    c.bench_function("apply_no_match", |b| {
        b.iter(|| black_box(store.apply(black_box("hello there"))))
    });
}

/// Benchmark a longer reply several rules rewrite
fn bench_apply_long(c: &mut Criterion) {
    let store = store();
    let text = "The colour of the sky after 12 km.\nNote the colour again!   ".repeat(20);
    c.bench_function("apply_long", |b| {
        b.iter(|| black_box(store.apply(black_box(&text))))
    });
}

criterion_group!(
    benches,
    bench_hydrate,
    bench_hydrate_defaults,
    bench_apply_no_match,
    bench_apply_long,
);

criterion_main!(benches);
