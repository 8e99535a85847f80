use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tessera::prelude::*;

fn bench_media_type_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("media_type");

    group.bench_function("parse_simple", |b| {
        b.iter(|| MediaType::parse(black_box("text/html")))
    });

    group.bench_function("parse_with_parameters", |b| {
        b.iter(|| MediaType::parse(black_box("application/atom+xml; type=entry; charset=UTF-8")))
    });

    group.bench_function("value_of_registered", |b| {
        b.iter(|| MediaType::value_of(black_box("application/json")))
    });

    group.finish();
}

fn bench_inclusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("includes");
    let entry = MediaType::parse("application/atom+xml; type=entry").unwrap();

    group.bench_function("wildcard", |b| {
        b.iter(|| media_type::ALL.includes(black_box(&entry)))
    });

    group.bench_function("suffix", |b| {
        b.iter(|| media_type::APPLICATION_ALL_XML.includes(black_box(&entry)))
    });

    group.bench_function("parameters", |b| {
        b.iter(|| entry.includes_with_parameters(black_box(&*media_type::APPLICATION_ATOM)))
    });

    group.finish();
}

fn browser_preferences() -> ClientPreferences {
    ClientPreferences::new()
        .accept_media_type(media_type::TEXT_HTML.clone(), 1.0)
        .and_then(|p| p.accept_media_type(media_type::APPLICATION_XHTML.clone(), 1.0))
        .and_then(|p| p.accept_media_type(media_type::APPLICATION_XML.clone(), 0.9))
        .and_then(|p| p.accept_media_type(media_type::ALL.clone(), 0.8))
        .and_then(|p| p.accept_language(language::ENGLISH_US.clone(), 1.0))
        .and_then(|p| p.accept_language(language::ENGLISH.clone(), 0.7))
        .and_then(|p| p.accept_encoding(encoding::BROTLI.clone(), 1.0))
        .and_then(|p| p.accept_encoding(encoding::GZIP.clone(), 0.9))
        .unwrap()
}

fn bench_negotiation(c: &mut Criterion) {
    let mut group = c.benchmark_group("negotiation");
    let service = MetadataService::new();
    let preferences = browser_preferences();

    let pool = [
        "index.html.en.gz",
        "index.html.fr",
        "index.json",
        "index.xml.de",
        "index.txt.en",
        "index.html.es.br",
        "index.csv",
        "index.html.ja",
    ];

    for count in [2usize, 8, 32] {
        let variants: Vec<Variant> = pool
            .iter()
            .cycle()
            .take(count)
            .map(|name| service.variant_for_file_name(name))
            .collect();

        group.bench_with_input(BenchmarkId::new("preferred_variant", count), &variants, |b, variants| {
            b.iter(|| preferred_variant(black_box(variants), &preferences, &service))
        });
    }

    group.finish();
}

fn bench_extension_lookup(c: &mut Criterion) {
    let service = MetadataService::new();

    c.bench_function("variant_for_file_name", |b| {
        b.iter(|| service.variant_for_file_name(black_box("docs/index.html.fr.gz")))
    });
}

criterion_group!(
    benches,
    bench_media_type_parsing,
    bench_inclusion,
    bench_negotiation,
    bench_extension_lookup,
);
criterion_main!(benches);
