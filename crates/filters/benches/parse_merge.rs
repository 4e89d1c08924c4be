//! Benchmarks for filter parsing and merging
//!
//! Run with: cargo bench --package filters

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use filters::{FilterParser, FilterSet, TurnCommand, merge};

const STRUCTURED: &str = r#"{"query":"space","include_terms":["funny"],"exclude_terms":["horror"],"genres":["Sci-Fi","Comedy"],"actors":[],"directors":["Nolan"],"year":null,"year_from":1990,"year_to":1999,"country":"US"}"#;

const MALFORMED: &str = "```json\n{\"query\": \"romantic comedy\", \"year\": 2005, \"genres\": [\"Rom";

fn bench_parse_structured(c: &mut Criterion) {
    let parser = FilterParser::with_current_year(2025);
    c.bench_function("parse_structured", |b| {
        b.iter(|| black_box(parser.parse(black_box(STRUCTURED))))
    });
}

fn bench_parse_fallback(c: &mut Criterion) {
    let parser = FilterParser::with_current_year(2025);
    c.bench_function("parse_fallback", |b| {
        b.iter(|| black_box(parser.parse(black_box(MALFORMED))))
    });
}

fn bench_merge(c: &mut Criterion) {
    let parser = FilterParser::with_current_year(2025);
    let previous = merge(&FilterSet::new(), &parser.parse(STRUCTURED), TurnCommand::Search);
    let incoming = parser.parse(r#"{"year":2001,"clear":["genres"]}"#);

    c.bench_function("merge_refine", |b| {
        b.iter(|| black_box(merge(black_box(&previous), black_box(&incoming), TurnCommand::Refine)))
    });
}

criterion_group!(benches, bench_parse_structured, bench_parse_fallback, bench_merge);
criterion_main!(benches);
