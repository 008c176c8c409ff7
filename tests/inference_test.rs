use rstest::rstest;

use hoax_detector::classification::{
    ForestConfig, Label, LabelPolicy, ModelArtifacts, TextNormalizer, TitleLabeler,
};
use hoax_detector::corpus::{CorpusAssembler, LabeledExample};
use hoax_detector::error::ArtifactError;
use hoax_detector::pipeline::{
    CorpusAccuracy, InferenceEngine, ModelKind, Trainer, TrainingOptions, Verdict,
};

fn engine() -> InferenceEngine {
    let normalizer = TextNormalizer::indonesian();
    let hoax = [
        "Pesan berantai vaksin chip palsu",
        "Klaim palsu undian berhadiah",
        "Video rekayasa beredar grup",
        "Tautan palsu bantuan sosial",
        "Klaim obat ajaib menyembuhkan kanker",
    ];
    let valid = [
        "Pemerintah menetapkan jadwal libur nasional",
        "Harga beras stabil pasar tradisional",
        "Program imunisasi anak diluncurkan",
        "Bandara menambah penerbangan musim liburan",
        "Presiden meresmikan bendungan irigasi",
    ];
    let examples: Vec<LabeledExample> = hoax
        .iter()
        .map(|text| LabeledExample::new(normalizer.normalize(text), Label::Hoax))
        .chain(
            valid
                .iter()
                .map(|text| LabeledExample::new(normalizer.normalize(text), Label::Valid)),
        )
        .collect();

    let outcome = Trainer::new(TrainingOptions {
        forest: ForestConfig {
            n_trees: 15,
            ..ForestConfig::default()
        },
        ..TrainingOptions::default()
    })
    .train(&examples)
    .expect("train");
    InferenceEngine::from_model(outcome.model, normalizer).expect("engine")
}

fn assembler() -> CorpusAssembler {
    CorpusAssembler::new(TitleLabeler::new(LabelPolicy::default()).expect("labeler"))
}

#[test]
fn test_missing_artifacts_fail_before_any_prediction() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = InferenceEngine::load(
        &ModelArtifacts::new(dir.path().join("model")),
        TextNormalizer::indonesian(),
    );

    let error = result.expect_err("artifacts are missing");
    assert!(matches!(&error, ArtifactError::Missing { paths } if paths.len() == 3));
    let message = error.to_string();
    assert!(message.contains("vectorizer.json"));
    assert!(message.contains("train"));
}

#[test]
fn test_corpus_accuracy_without_corpus_files_is_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let accuracy = engine()
        .corpus_accuracy(&dir.path().join("data_clean"), &assembler())
        .expect("accuracy");
    assert_eq!(accuracy, CorpusAccuracy::default());
    assert_eq!(accuracy.naive_bayes, None);
    assert_eq!(accuracy.random_forest, None);
}

#[test]
fn test_corpus_accuracy_ignores_unlabeled_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("misc_cleaned.csv"),
        "Judul,Isi Ringkas Clean\nBerita tanpa tag,cuaca cerah\n",
    )
    .expect("write");

    let accuracy = engine()
        .corpus_accuracy(dir.path(), &assembler())
        .expect("accuracy");
    assert_eq!(accuracy, CorpusAccuracy::default());
}

#[test]
fn test_predictions_are_percentages() {
    let engine = engine();
    for text in [
        "",
        "   ",
        "Pesan berantai vaksin chip palsu",
        "Presiden meresmikan bendungan",
        "teks yang sama sekali tidak dikenal",
    ] {
        let verdict = engine.predict(text);
        for probability in [
            verdict.naive_bayes_probability,
            verdict.random_forest_probability,
            verdict.final_probability,
        ] {
            assert!(
                (0.0..=100.0).contains(&probability),
                "{probability} out of range for {text:?}"
            );
        }
    }
}

#[rstest]
#[case(62.5, Label::Hoax)]
#[case(50.0, Label::Hoax)]
#[case(12.0, Label::Valid)]
fn test_ties_go_to_random_forest(#[case] probability: f64, #[case] expected: Label) {
    let verdict = Verdict::from_probabilities(probability, probability);
    assert_eq!(verdict.decided_by, ModelKind::RandomForest);
    assert!((verdict.final_probability - probability).abs() < f64::EPSILON);
    assert_eq!(verdict.final_label, verdict.random_forest_label);
    assert_eq!(verdict.final_label, expected);
}
