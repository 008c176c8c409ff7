//! 学習済みモデルによる推論と、コーパス全体に対する正解率の集計。
use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use crate::classification::{Label, ModelArtifacts, TextNormalizer, TrainedModel};
use crate::corpus::{CorpusAssembler, LabeledExample, store};
use crate::error::{ArtifactError, DataError};
use crate::evaluation::ConfusionMatrix;

/// HOAX と判定する確率の下限（パーセント）。
pub const HOAX_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    NaiveBayes,
    RandomForest,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NaiveBayes => "Naive Bayes",
            Self::RandomForest => "Random Forest",
        })
    }
}

/// 1 件の判定結果。確率はいずれも HOAX の確率をパーセントで表す。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub naive_bayes_probability: f64,
    pub random_forest_probability: f64,
    pub naive_bayes_label: Label,
    pub random_forest_label: Label,
    pub final_label: Label,
    pub final_probability: f64,
    pub decided_by: ModelKind,
}

impl Verdict {
    /// 2 モデルの HOAX 確率（パーセント）から最終判定を組み立てる。
    ///
    /// Naive Bayes の確率が厳密に大きいときだけ Naive Bayes を採用し、同値を含むそれ以外は Random Forest。
    #[must_use]
    pub fn from_probabilities(naive_bayes: f64, random_forest: f64) -> Self {
        let naive_bayes = clamp_percent(naive_bayes);
        let random_forest = clamp_percent(random_forest);
        let (decided_by, final_probability) = if naive_bayes > random_forest {
            (ModelKind::NaiveBayes, naive_bayes)
        } else {
            (ModelKind::RandomForest, random_forest)
        };

        Self {
            naive_bayes_probability: naive_bayes,
            random_forest_probability: random_forest,
            naive_bayes_label: label_for(naive_bayes),
            random_forest_label: label_for(random_forest),
            final_label: label_for(final_probability),
            final_probability,
            decided_by,
        }
    }
}

fn clamp_percent(probability: f64) -> f64 {
    if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 100.0)
    }
}

fn label_for(percent: f64) -> Label {
    if percent >= HOAX_THRESHOLD {
        Label::Hoax
    } else {
        Label::Valid
    }
}

/// 弱ラベル付きコーパスに対するモデルごとの正解率。評価対象がなければ `None`。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CorpusAccuracy {
    pub naive_bayes: Option<f64>,
    pub random_forest: Option<f64>,
}

/// 読み込み済みのモデルを保持する推論器。構築後は不変で、`&self` のまま並行に使える。
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    normalizer: TextNormalizer,
    model: TrainedModel,
}

impl InferenceEngine {
    /// 成果物を読み込んで推論器を構築する。
    ///
    /// # Errors
    /// 成果物が欠けている、読めない、壊れている、互いに整合しない場合。
    pub fn load(
        artifacts: &ModelArtifacts,
        normalizer: TextNormalizer,
    ) -> Result<Self, ArtifactError> {
        let model = TrainedModel::load(artifacts)?;
        Ok(Self { normalizer, model })
    }

    /// 学習直後のモデルから構築する。
    ///
    /// # Errors
    /// 成果物の幅が一致しない場合。
    pub fn from_model(
        model: TrainedModel,
        normalizer: TextNormalizer,
    ) -> Result<Self, ArtifactError> {
        model.validate()?;
        Ok(Self { normalizer, model })
    }

    #[must_use]
    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    /// 生テキストを正規化してから判定する。
    #[must_use]
    pub fn predict(&self, text: &str) -> Verdict {
        let normalized = self.normalizer.normalize(text);
        debug!(
            tokens = normalized.split_whitespace().count(),
            "normalized input"
        );
        self.predict_normalized(&normalized)
    }

    /// 正規化済みテキストを判定する。
    #[must_use]
    pub fn predict_normalized(&self, normalized: &str) -> Verdict {
        let features = self.model.vectorizer.transform(&[normalized]);
        let Some(row) = features.outer_view(0) else {
            return Verdict::from_probabilities(0.0, 0.0);
        };
        let [_, naive_bayes] = self.model.naive_bayes.predict_proba_row(row);
        let [_, random_forest] = self.model.random_forest.predict_proba_row(row);
        Verdict::from_probabilities(naive_bayes * 100.0, random_forest * 100.0)
    }

    /// ラベル付き例に対する各モデルの正解率（閾値 50%）。
    #[must_use]
    pub fn accuracy_against(&self, examples: &[LabeledExample]) -> CorpusAccuracy {
        if examples.is_empty() {
            return CorpusAccuracy::default();
        }

        let texts: Vec<&str> = examples.iter().map(|example| example.text.as_str()).collect();
        let expected: Vec<Label> = examples.iter().map(|example| example.label).collect();
        let features = self.model.vectorizer.transform(&texts);

        let to_labels = |probabilities: Vec<[f64; 2]>| -> Vec<Label> {
            probabilities
                .into_iter()
                .map(|[_, hoax]| label_for(clamp_percent(hoax * 100.0)))
                .collect()
        };
        let naive_bayes = to_labels(self.model.naive_bayes.predict_proba(&features));
        let random_forest = to_labels(self.model.random_forest.predict_proba(&features));

        CorpusAccuracy {
            naive_bayes: ConfusionMatrix::from_predictions(&expected, &naive_bayes).accuracy(),
            random_forest: ConfusionMatrix::from_predictions(&expected, &random_forest).accuracy(),
        }
    }

    /// 正規化済みコーパス全体を弱ラベルで評価する。UNKNOWN の行は除外する。
    ///
    /// ファイルがない、またはラベル付きの行がない場合は両方 `None`。
    ///
    /// # Errors
    /// コーパスファイルの読み込みに失敗した場合。
    pub fn corpus_accuracy(
        &self,
        clean_dir: &Path,
        assembler: &CorpusAssembler,
    ) -> Result<CorpusAccuracy, DataError> {
        let files = store::list_files(clean_dir, store::CLEANED_SUFFIX)?;
        let mut examples = Vec::new();
        for path in &files {
            examples.extend(assembler.label(&store::read_normalized(path)?));
        }

        let accuracy = self.accuracy_against(&examples);
        info!(
            files = files.len(),
            labeled_rows = examples.len(),
            naive_bayes = ?accuracy.naive_bayes,
            random_forest = ?accuracy.random_forest,
            "computed corpus accuracy"
        );
        Ok(accuracy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(80.0, 60.0, ModelKind::NaiveBayes, Label::Hoax, 80.0)]
    #[case(40.0, 70.0, ModelKind::RandomForest, Label::Hoax, 70.0)]
    #[case(55.0, 55.0, ModelKind::RandomForest, Label::Hoax, 55.0)]
    #[case(30.0, 10.0, ModelKind::NaiveBayes, Label::Valid, 30.0)]
    #[case(50.0, 20.0, ModelKind::NaiveBayes, Label::Hoax, 50.0)]
    fn naive_bayes_wins_only_with_a_strictly_higher_hoax_probability(
        #[case] naive_bayes: f64,
        #[case] random_forest: f64,
        #[case] decided_by: ModelKind,
        #[case] final_label: Label,
        #[case] final_probability: f64,
    ) {
        let verdict = Verdict::from_probabilities(naive_bayes, random_forest);
        assert_eq!(verdict.decided_by, decided_by);
        assert_eq!(verdict.final_label, final_label);
        assert!((verdict.final_probability - final_probability).abs() < f64::EPSILON);
    }

    #[test]
    fn per_model_labels_use_the_fifty_percent_threshold() {
        let verdict = Verdict::from_probabilities(50.0, 49.9);
        assert_eq!(verdict.naive_bayes_label, Label::Hoax);
        assert_eq!(verdict.random_forest_label, Label::Valid);
    }

    #[test]
    fn probabilities_are_clamped_to_percent_range() {
        let verdict = Verdict::from_probabilities(120.0, f64::NAN);
        assert!((verdict.naive_bayes_probability - 100.0).abs() < f64::EPSILON);
        assert!(verdict.random_forest_probability.abs() < f64::EPSILON);
    }
}
