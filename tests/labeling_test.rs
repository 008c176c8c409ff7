use hoax_detector::classification::{LabelPolicy, TitleLabeler, WeakLabel};
use hoax_detector::corpus::{CorpusAssembler, NormalizedArticle, RawArticle};
use hoax_detector::error::DataError;
use rstest::rstest;

fn labeler() -> TitleLabeler {
    TitleLabeler::new(LabelPolicy::default()).expect("labeler")
}

fn article(title: &str) -> NormalizedArticle {
    NormalizedArticle {
        article: RawArticle {
            title: title.to_string(),
            ..RawArticle::default()
        },
        clean_excerpt: "isi".to_string(),
    }
}

#[rstest]
#[case("[HOAX] [VALID] judul")]
#[case("[VALID] [HOAX] judul")]
#[case("[Fakta] lalu [Salah]")]
fn test_hoax_tags_take_priority(#[case] title: &str) {
    assert_eq!(labeler().label(title), WeakLabel::Hoax);
}

#[rstest]
#[case("[salah] x", "[SALAH] x")]
#[case("[Penipuan] x", "[PENIPUAN] x")]
#[case("[benar] x", "[BENAR] x")]
#[case("kompas.com", "KOMPAS.COM")]
fn test_tag_matching_ignores_case(#[case] lower: &str, #[case] upper: &str) {
    let labeler = labeler();
    assert_eq!(labeler.label(lower), labeler.label(upper));
    assert_ne!(labeler.label(lower), WeakLabel::Unknown);
}

#[test]
fn test_untagged_kompas_title_is_valid_by_default() {
    assert_eq!(labeler().label("Harga cabai naik - Kompas"), WeakLabel::Valid);
}

#[test]
fn test_unknown_rows_never_reach_the_corpus() {
    let rows = vec![
        article("[HOAX] a"),
        article("Tanpa tag"),
        article("[VALID] b"),
        article("Juga tanpa tag"),
    ];
    let corpus = CorpusAssembler::new(labeler())
        .assemble([rows.as_slice()])
        .expect("assemble");
    assert_eq!(corpus.examples.len(), 2);
    assert_eq!(corpus.unlabeled, 2);
    assert_eq!(corpus.distribution.total(), 2);
}

#[test]
fn test_single_class_corpus_is_rejected() {
    let rows = vec![article("[VALID] a"), article("[BENAR] b")];
    let result = CorpusAssembler::new(labeler()).assemble([rows.as_slice()]);
    assert!(matches!(result, Err(DataError::SingleClass(_))));
}
