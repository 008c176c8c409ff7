use std::num::NonZeroUsize;

use hoax_detector::classification::TextNormalizer;
use hoax_detector::corpus::RawArticle;
use hoax_detector::pipeline::CorpusNormalizer;
use hoax_detector::util::partition::partitioned_map;
use rstest::rstest;

#[rstest]
#[case("")]
#[case("   ")]
fn test_blank_input_normalizes_to_empty(#[case] text: &str) {
    assert_eq!(TextNormalizer::indonesian().normalize(text), "");
}

#[test]
fn test_output_has_no_digits_punctuation_or_stopwords() {
    let normalizer = TextNormalizer::indonesian();
    let output = normalizer.normalize(
        "Menurut pesan yang beredar, 5G dan vaksin COVID-19 adalah \"senjata\" rahasia!!!",
    );
    assert!(!output.is_empty());
    assert!(!output.chars().any(|c| c.is_ascii_digit() || c.is_ascii_punctuation()));
    assert!(!output.contains("  "));
    for stopword in ["yang", "dan", "adalah"] {
        assert!(!output.split(' ').any(|token| token == stopword));
    }
}

#[test]
fn test_normalizing_stable_tokens_is_idempotent() {
    let normalizer = TextNormalizer::indonesian();
    let once = normalizer.normalize("kabar bohong vaksin covid");
    assert_eq!(normalizer.normalize(&once), once);
}

#[test]
fn test_parallel_normalization_matches_sequential_order() {
    let articles: Vec<RawArticle> = (0..101)
        .map(|i| RawArticle {
            title: format!("judul {i}"),
            excerpt: format!("Pemerintah membantah {} kabar bohong soal bantuan", "x".repeat(i % 7 + 2)),
            ..RawArticle::default()
        })
        .collect();
    let normalizer = TextNormalizer::indonesian();
    let workers = NonZeroUsize::new(4).expect("non-zero");

    let parallel = CorpusNormalizer::new(normalizer.clone(), workers)
        .normalize_batch(&articles)
        .expect("normalize");
    let sequential: Vec<String> = articles
        .iter()
        .map(|article| normalizer.normalize(&article.excerpt))
        .collect();

    let parallel_clean: Vec<String> = parallel.into_iter().map(|a| a.clean_excerpt).collect();
    assert_eq!(parallel_clean, sequential);
}

#[test]
fn test_partition_primitive_concatenates_in_order() {
    let items: Vec<u32> = (0..50).collect();
    let mapped = partitioned_map(&items, NonZeroUsize::new(4).expect("non-zero"), |item| {
        Ok(format!("item-{item}"))
    })
    .expect("map");
    assert_eq!(mapped.first().map(String::as_str), Some("item-0"));
    assert_eq!(mapped.last().map(String::as_str), Some("item-49"));
    assert_eq!(mapped.len(), 50);
}
