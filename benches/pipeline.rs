use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use markpipe::{Locator, Markup, Pipeline, Step};
use std::fs;
use std::path::Path;

fn load_fixture() -> Option<String> {
    fs::read_to_string(Path::new("tests/fixtures/article.html")).ok()
}

fn note_pipeline() -> Pipeline {
    Pipeline::new(vec![
        Step::Drop {
            targets: vec![
                Locator::tag("nav"),
                Locator::tag("aside"),
                Locator::tag("footer"),
                Locator::tag("script"),
            ],
        },
        Step::Filter {
            target: Locator::tag("article"),
        },
        Step::QuoteCaptions,
        Step::AbsoluteUrls,
        Step::TrimLinkQueries,
    ])
}

fn bench_convert(c: &mut Criterion) {
    let html = match load_fixture() {
        Some(html) => html,
        None => return,
    };
    let url = "https://webber.example/articles/news-article.html";
    let pipeline = note_pipeline();

    let mut group = c.benchmark_group("convert");
    group.throughput(Throughput::Bytes(html.len() as u64));

    group.bench_function("parse", |b| {
        b.iter(|| {
            Markup::from_html(std::hint::black_box(&html), Some(url), None).unwrap()
        });
    });

    group.bench_function("pipeline", |b| {
        b.iter(|| {
            let mut markup =
                Markup::from_html(std::hint::black_box(&html), Some(url), None).unwrap();
            markup.process(&pipeline).unwrap();
            std::hint::black_box(markup.to_html())
        });
    });

    group.bench_function("markdown", |b| {
        b.iter(|| {
            let mut markup =
                Markup::from_html(std::hint::black_box(&html), Some(url), None).unwrap();
            markup.process(&pipeline).unwrap();
            std::hint::black_box(markup.to_markdown().unwrap())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_convert);
criterion_main!(benches);
