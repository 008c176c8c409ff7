//! 学習段階: ベクトライザの学習、層化分割、2 モデルの学習と評価、成果物の保存。
use anyhow::{Context, Result};
use tracing::info;

use crate::classification::{
    FeatureMatrix, ForestConfig, Label, LabelPolicy, ModelArtifacts, MultinomialNaiveBayes,
    RandomForest, TfidfVectorizer, TitleLabeler, TrainedModel, VectorizerConfig,
};
use crate::config::Config;
use crate::corpus::{ClassDistribution, CorpusAssembler, LabeledExample, store};
use crate::error::DataError;
use crate::evaluation::{ClassificationReport, ConfusionMatrix, stratified_split};

/// 学習のハイパーパラメータ。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingOptions {
    pub vectorizer: VectorizerConfig,
    pub test_ratio: f64,
    pub seed: u64,
    pub nb_alpha: f64,
    pub forest: ForestConfig,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            vectorizer: VectorizerConfig::default(),
            test_ratio: 0.2,
            seed: 42,
            nb_alpha: 1.0,
            forest: ForestConfig::default(),
        }
    }
}

impl TrainingOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            vectorizer: VectorizerConfig {
                max_features: config.max_features().get(),
                ngram_range: config.ngram_range(),
                sublinear_tf: true,
            },
            test_ratio: config.test_ratio(),
            seed: config.seed(),
            nb_alpha: config.nb_alpha(),
            forest: ForestConfig {
                n_trees: config.rf_trees().get(),
                seed: config.seed(),
                threads: config.rf_threads(),
                ..ForestConfig::default()
            },
        }
    }
}

/// 学習結果。モデル本体とホールドアウト評価を含む。
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: TrainedModel,
    pub distribution: ClassDistribution,
    pub train_size: usize,
    pub test_size: usize,
    pub naive_bayes: ClassificationReport,
    pub random_forest: ClassificationReport,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Trainer {
    options: TrainingOptions,
}

impl Trainer {
    #[must_use]
    pub fn new(options: TrainingOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> TrainingOptions {
        self.options
    }

    /// ラベル付きコーパスから 2 つの分類器を学習し、ホールドアウトで評価する。
    ///
    /// ベクトライザは分割前の全テキストで学習する。
    ///
    /// # Errors
    /// 例が空・語彙が空・層化分割が成立しない場合（[`DataError`]）、
    /// いずれかのモデルの学習に失敗した場合。
    pub fn train(&self, examples: &[LabeledExample]) -> Result<TrainingOutcome> {
        if examples.is_empty() {
            return Err(DataError::EmptyCorpus.into());
        }
        let texts: Vec<&str> = examples.iter().map(|example| example.text.as_str()).collect();
        let labels: Vec<Label> = examples.iter().map(|example| example.label).collect();
        let mut distribution = ClassDistribution::default();
        for &label in &labels {
            distribution.record(label);
        }

        let vectorizer = TfidfVectorizer::fit(self.options.vectorizer, &texts)
            .context("failed to fit tf-idf vectorizer")?;
        let features = vectorizer.transform(&texts);
        info!(
            documents = texts.len(),
            vocabulary = vectorizer.vocab_len(),
            ngram_range = %self.options.vectorizer.ngram_range,
            "vectorized corpus"
        );

        let split = stratified_split(&labels, self.options.test_ratio, self.options.seed)?;
        let x_train = select_rows(&features, &split.train);
        let x_test = select_rows(&features, &split.test);
        let y_train: Vec<Label> = split.train.iter().map(|&row| labels[row]).collect();
        let y_test: Vec<Label> = split.test.iter().map(|&row| labels[row]).collect();
        info!(
            train = y_train.len(),
            test = y_test.len(),
            seed = self.options.seed,
            "split corpus"
        );

        let naive_bayes = MultinomialNaiveBayes::fit(&x_train, &y_train, self.options.nb_alpha)
            .context("failed to fit naive bayes")?;
        let naive_bayes_report =
            ConfusionMatrix::from_predictions(&y_test, &naive_bayes.predict(&x_test)).finalize();
        log_report("naive_bayes", &naive_bayes_report);

        let random_forest = RandomForest::fit(&x_train, &y_train, self.options.forest)
            .context("failed to fit random forest")?;
        let random_forest_report =
            ConfusionMatrix::from_predictions(&y_test, &random_forest.predict(&x_test)).finalize();
        log_report("random_forest", &random_forest_report);

        Ok(TrainingOutcome {
            model: TrainedModel {
                vectorizer,
                naive_bayes,
                random_forest,
            },
            distribution,
            train_size: y_train.len(),
            test_size: y_test.len(),
            naive_bayes: naive_bayes_report,
            random_forest: random_forest_report,
        })
    }
}

/// 正規化済みコーパスの読み込みから成果物の保存までを実行する。
///
/// # Errors
/// コーパスの読み込み・組み立て・学習・保存のいずれかが失敗した場合。
pub fn train_from_corpus(config: &Config) -> Result<TrainingOutcome> {
    let sources = store::load_normalized_dir(config.clean_dir())?;
    let labeler = TitleLabeler::new(LabelPolicy {
        trusted_source_is_valid: config.kompas_default_valid(),
    })
    .context("failed to build title labeler")?;
    let corpus = CorpusAssembler::new(labeler).assemble(sources.iter().map(Vec::as_slice))?;

    let outcome = Trainer::new(TrainingOptions::from_config(config)).train(&corpus.examples)?;
    outcome
        .model
        .save(&ModelArtifacts::new(config.model_dir()))
        .context("failed to save model artifacts")?;
    Ok(outcome)
}

fn select_rows(features: &FeatureMatrix, rows: &[usize]) -> FeatureMatrix {
    let mut indptr = Vec::with_capacity(rows.len() + 1);
    let mut indices = Vec::new();
    let mut data = Vec::new();
    indptr.push(0);
    for &row in rows {
        if let Some(view) = features.outer_view(row) {
            for (column, &value) in view.iter() {
                indices.push(column);
                data.push(value);
            }
        }
        indptr.push(indices.len());
    }
    sprs::CsMat::new((rows.len(), features.cols()), indptr, indices, data)
}

fn log_report(model: &'static str, report: &ClassificationReport) {
    let hoax = report.scores(Label::Hoax);
    let valid = report.scores(Label::Valid);
    info!(
        model,
        accuracy = report.accuracy,
        hoax_precision = hoax.precision,
        hoax_recall = hoax.recall,
        hoax_f1 = hoax.f1,
        valid_precision = valid.precision,
        valid_recall = valid.recall,
        valid_f1 = valid.f1,
        "evaluated on held-out split"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn examples() -> Vec<LabeledExample> {
        let mut examples = Vec::new();
        for i in 0..10 {
            examples.push(LabeledExample::new(
                format!("vaksin palsu bohong sebar hoaks {i}x"),
                Label::Hoax,
            ));
            examples.push(LabeledExample::new(
                format!("jadwal libur resmi umum nasional {i}y"),
                Label::Valid,
            ));
        }
        examples
    }

    fn fast_options() -> TrainingOptions {
        TrainingOptions {
            forest: ForestConfig {
                n_trees: 20,
                ..ForestConfig::default()
            },
            ..TrainingOptions::default()
        }
    }

    #[test]
    fn trains_both_models_on_separable_corpus() {
        let outcome = Trainer::new(fast_options()).train(&examples()).expect("train");

        assert_eq!(outcome.train_size + outcome.test_size, 20);
        assert_eq!(outcome.test_size, 4);
        assert_eq!(outcome.distribution, ClassDistribution { hoax: 10, valid: 10 });
        assert!(outcome.naive_bayes.accuracy > 0.99);
        assert!(outcome.random_forest.accuracy > 0.99);
        assert_eq!(
            outcome.model.naive_bayes.n_features(),
            outcome.model.vectorizer.vocab_len()
        );
        assert_eq!(
            outcome.model.random_forest.n_features(),
            outcome.model.vectorizer.vocab_len()
        );
    }

    #[test]
    fn infeasible_split_is_a_data_error() {
        let mut examples = examples();
        examples.retain(|example| example.label == Label::Valid);
        examples.push(LabeledExample::new("vaksin palsu", Label::Hoax));

        let error = Trainer::new(fast_options())
            .train(&examples)
            .expect_err("one hoax example");
        assert!(error.downcast_ref::<DataError>().is_some());
    }

    #[test]
    fn excerpts_without_terms_are_an_empty_vocabulary_error() {
        let examples: Vec<LabeledExample> = [Label::Hoax, Label::Valid, Label::Hoax, Label::Valid]
            .into_iter()
            .map(|label| LabeledExample::new("", label))
            .collect();

        let error = Trainer::new(fast_options())
            .train(&examples)
            .expect_err("no terms");
        assert!(matches!(
            error.downcast_ref::<DataError>(),
            Some(DataError::EmptyVocabulary)
        ));
    }

    #[test]
    fn no_examples_is_an_empty_corpus_error() {
        let error = Trainer::new(fast_options()).train(&[]).expect_err("empty");
        assert!(matches!(
            error.downcast_ref::<DataError>(),
            Some(DataError::EmptyCorpus)
        ));
    }

    #[test]
    fn selected_rows_keep_their_values() {
        let vectorizer =
            TfidfVectorizer::fit(VectorizerConfig::default(), &["kabar bohong", "jadwal libur"])
                .expect("fit");
        let features = vectorizer.transform(&["kabar bohong", "jadwal libur"]);
        let selected = select_rows(&features, &[1]);
        assert_eq!(selected.rows(), 1);
        assert_eq!(
            selected.outer_view(0).expect("row").nnz(),
            features.outer_view(1).expect("row").nnz()
        );
    }
}
