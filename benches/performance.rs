//! 正規化とベクトル化の性能ベンチマーク。
use std::num::NonZeroUsize;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use hoax_detector::classification::{TextNormalizer, TfidfVectorizer, VectorizerConfig};
use hoax_detector::corpus::RawArticle;
use hoax_detector::pipeline::CorpusNormalizer;

const WORDS: [&str; 16] = [
    "pemerintah", "membantah", "kabar", "beredar", "vaksin", "pesan", "berantai", "bantuan",
    "sosial", "menyebarkan", "informasi", "palsu", "banjir", "jakarta", "kesehatan", "masyarakat",
];

fn synthetic_excerpts(count: usize, words_per_doc: usize) -> Vec<String> {
    (0..count)
        .map(|doc| {
            (0..words_per_doc)
                .map(|i| WORDS[(doc * 7 + i * 3) % WORDS.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn bench_normalization(c: &mut Criterion) {
    let articles: Vec<RawArticle> = synthetic_excerpts(1024, 40)
        .into_iter()
        .map(|excerpt| RawArticle {
            excerpt,
            ..RawArticle::default()
        })
        .collect();
    let stage = CorpusNormalizer::new(
        TextNormalizer::indonesian(),
        NonZeroUsize::new(4).expect("non-zero"),
    );

    c.bench_function("normalize_articles_1k", |b| {
        b.iter(|| {
            let normalized = stage.normalize_batch(&articles).expect("normalize");
            black_box(normalized.len());
        });
    });
}

fn bench_vectorization(c: &mut Criterion) {
    let normalizer = TextNormalizer::indonesian();
    let texts: Vec<String> = synthetic_excerpts(512, 40)
        .iter()
        .map(|text| normalizer.normalize(text))
        .collect();

    c.bench_function("tfidf_fit_transform_500_docs", |b| {
        b.iter(|| {
            let vectorizer =
                TfidfVectorizer::fit(VectorizerConfig::default(), &texts).expect("fit");
            black_box(vectorizer.transform(&texts).nnz());
        });
    });
}

criterion_group!(benches, bench_normalization, bench_vectorization);
criterion_main!(benches);
