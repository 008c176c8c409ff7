use std::fmt;

use crate::classification::Label;

/// 2x2 の混同行列。行 = 正解、列 = 予測（いずれも VALID, HOAX の順）。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: [[usize; 2]; 2],
}

/// 1 クラス分のスコア。
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize, // 正解側の件数
}

/// ホールドアウト集合に対する評価結果。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationReport {
    pub accuracy: f64,
    /// `Label::index()` 順。
    pub per_class: [ClassScores; 2],
    pub confusion: ConfusionMatrix,
}

impl ConfusionMatrix {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 正解ラベルと予測ラベルの組から集計する。長さが違う場合は短い方に合わせる。
    #[must_use]
    pub fn from_predictions(expected: &[Label], predicted: &[Label]) -> Self {
        let mut matrix = Self::new();
        for (&truth, &prediction) in expected.iter().zip(predicted) {
            matrix.push(truth, prediction);
        }
        matrix
    }

    pub fn push(&mut self, expected: Label, predicted: Label) {
        self.counts[expected.index()][predicted.index()] += 1;
    }

    #[must_use]
    pub fn count(&self, expected: Label, predicted: Label) -> usize {
        self.counts[expected.index()][predicted.index()]
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        Label::ALL.iter().map(|&label| self.count(label, label)).sum()
    }

    /// 正解率。サンプルがなければ `None`。
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.correct() as f64 / total as f64)
    }

    #[must_use]
    pub fn finalize(&self) -> ClassificationReport {
        let per_class = Label::ALL.map(|label| {
            let true_positive = self.count(label, label) as f64;
            let predicted: usize = Label::ALL.iter().map(|&truth| self.count(truth, label)).sum();
            let support: usize = Label::ALL.iter().map(|&guess| self.count(label, guess)).sum();

            let precision = ratio(true_positive, predicted as f64);
            let recall = ratio(true_positive, support as f64);
            let f1 = ratio(2.0 * precision * recall, precision + recall);
            ClassScores {
                precision,
                recall,
                f1,
                support,
            }
        });

        ClassificationReport {
            accuracy: self.accuracy().unwrap_or(0.0),
            per_class,
            confusion: *self,
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

impl ClassificationReport {
    #[must_use]
    pub fn scores(&self, label: Label) -> ClassScores {
        self.per_class[label.index()]
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for label in Label::ALL {
            let scores = self.scores(label);
            writeln!(
                f,
                "{:>12} {:>10.4} {:>10.4} {:>10.4} {:>10}",
                label.as_str(),
                scores.precision,
                scores.recall,
                scores.f1,
                scores.support
            )?;
        }
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10.4} {:>10}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.confusion.total()
        )?;
        writeln!(f, "confusion matrix (rows = true, columns = predicted VALID, HOAX):")?;
        for truth in Label::ALL {
            writeln!(
                f,
                "{:>12} {:>10} {:>10}",
                truth.as_str(),
                self.confusion.count(truth, Label::Valid),
                self.confusion.count(truth, Label::Hoax)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_per_class_scores() {
        use Label::{Hoax, Valid};
        let expected = [Hoax, Hoax, Hoax, Valid, Valid];
        let predicted = [Hoax, Hoax, Valid, Valid, Hoax];
        let report = ConfusionMatrix::from_predictions(&expected, &predicted).finalize();

        assert!((report.accuracy - 0.6).abs() < 1e-12);
        let hoax = report.scores(Hoax);
        assert!((hoax.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((hoax.recall - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(hoax.support, 3);
        let valid = report.scores(Valid);
        assert!((valid.precision - 0.5).abs() < 1e-12);
        assert!((valid.recall - 0.5).abs() < 1e-12);
        assert_eq!(report.confusion.count(Hoax, Valid), 1);
        assert_eq!(report.confusion.count(Valid, Hoax), 1);
    }

    #[test]
    fn empty_matrix_has_no_accuracy() {
        let matrix = ConfusionMatrix::new();
        assert_eq!(matrix.accuracy(), None);
        let report = matrix.finalize();
        assert!(report.accuracy.abs() < f64::EPSILON);
        assert!(report.scores(Label::Hoax).f1.abs() < f64::EPSILON);
    }

    #[test]
    fn report_renders_every_class_row() {
        let report =
            ConfusionMatrix::from_predictions(&[Label::Hoax, Label::Valid], &[Label::Hoax, Label::Hoax])
                .finalize();
        let rendered = report.to_string();
        assert!(rendered.contains("HOAX"));
        assert!(rendered.contains("VALID"));
        assert!(rendered.contains("accuracy"));
    }
}
