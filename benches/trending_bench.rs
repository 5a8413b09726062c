//! Benchmarks do agrupamento de notícias.
//!
//! Testa performance de:
//! - Agrupamento + ranking de uma página de artigos
//! - Normalização de manchetes e similaridade de tokens
//!
//! Executar: `cargo bench --bench trending_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use news_sense::trending::{aggregate_articles, GroupingThresholds};
use news_sense::types::RawArticle;
use news_sense::utils::{content_tokens, jaccard, normalize_headline};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HELPERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const STORIES: &[&str] = &[
    "Central bank holds interest rates steady amid inflation worries",
    "Tech giant unveils new AI assistant for smartphones",
    "Wildfires force thousands to evacuate in the west",
    "Championship final ends in dramatic penalty shootout",
    "Electric vehicle sales surge in the first quarter",
    "Lawmakers pass sweeping climate bill after long debate",
    "Researchers report breakthrough in battery chemistry",
];

const SOURCES: &[&str] = &["Reuters", "AP", "BBC", "CNN", "Bloomberg", "Guardian", "NYT"];

fn create_test_articles(count: usize) -> Vec<RawArticle> {
    (0..count)
        .map(|i| {
            let story = STORIES[i % STORIES.len()];
            RawArticle {
                headline: if i % 2 == 0 {
                    story.to_string()
                } else {
                    format!("{} - live updates", story)
                },
                source: SOURCES[(i / STORIES.len()) % SOURCES.len()].to_string(),
                description: format!(
                    "Report {} on the story: {}. More details are expected later today.",
                    i, story
                ),
                published_at: None,
                url: format!("https://news{}.example/story/{}", i % 11, i),
            }
        })
        .collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BENCHMARKS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_articles");
    let thresholds = GroupingThresholds::default();

    for size in [10usize, 20, 50] {
        let articles = create_test_articles(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &articles, |b, articles| {
            b.iter(|| aggregate_articles(black_box(articles.clone()), "general", &thresholds))
        });
    }

    group.finish();
}

fn bench_text_similarity(c: &mut Criterion) {
    let a = content_tokens(STORIES[0]);
    let b = content_tokens("Central bank keeps rates steady as inflation worries linger");

    c.bench_function("normalize_headline", |bench| {
        bench.iter(|| normalize_headline(black_box("Tech giant's AI-assistant: What's NEXT?!")))
    });

    c.bench_function("content_tokens", |bench| {
        bench.iter(|| content_tokens(black_box(STORIES[5])))
    });

    c.bench_function("jaccard", |bench| bench.iter(|| jaccard(black_box(&a), black_box(&b))));
}

criterion_group!(benches, bench_aggregate, bench_text_similarity);
criterion_main!(benches);
