//! TF-IDF 行列上の多項ナイーブベイズ。
use anyhow::{Result, ensure};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use sprs::CsVecView;

use super::{FeatureMatrix, Label};

/// 多項ナイーブベイズ分類器。行 0 が VALID、行 1 が HOAX。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNaiveBayes {
    alpha: f64,
    class_log_prior: Array1<f64>,
    feature_log_prob: Array2<f64>,
}

impl MultinomialNaiveBayes {
    /// 学習データから事前確率と特徴量の条件付き対数確率を推定する。
    ///
    /// 平滑化は加法（`alpha = 1.0` でラプラス平滑化）、事前確率はクラス頻度から求める。
    ///
    /// # Errors
    /// 行数とラベル数が一致しない場合、`alpha` が正でない場合、
    /// いずれかのクラスのサンプルが存在しない場合はエラーを返す。
    pub fn fit(features: &FeatureMatrix, labels: &[Label], alpha: f64) -> Result<Self> {
        ensure!(
            features.rows() == labels.len(),
            "feature matrix has {} rows but {} labels were given",
            features.rows(),
            labels.len()
        );
        ensure!(alpha > 0.0, "smoothing alpha must be positive, got {alpha}");

        let n_classes = Label::ALL.len();
        let mut class_count = Array1::<f64>::zeros(n_classes);
        let mut feature_count = Array2::<f64>::zeros((n_classes, features.cols()));

        for (row, label) in features.outer_iterator().zip(labels) {
            let class = label.index();
            class_count[class] += 1.0;
            for (column, &value) in row.iter() {
                feature_count[[class, column]] += value;
            }
        }

        for label in Label::ALL {
            ensure!(
                class_count[label.index()] > 0.0,
                "no training samples for class {label}"
            );
        }

        let total = class_count.sum();
        let class_log_prior = class_count.mapv(|count| (count / total).ln());

        let smoothed = feature_count + alpha;
        let row_totals = smoothed.sum_axis(Axis(1)).insert_axis(Axis(1));
        let feature_log_prob = smoothed.mapv(f64::ln) - row_totals.mapv(f64::ln);

        Ok(Self {
            alpha,
            class_log_prior,
            feature_log_prob,
        })
    }

    /// 1 文書の `[P(VALID), P(HOAX)]`。
    #[must_use]
    pub fn predict_proba_row(&self, row: CsVecView<'_, f64>) -> [f64; 2] {
        let mut joint = [0.0; 2];
        for label in Label::ALL {
            let class = label.index();
            let log_prob = self.feature_log_prob.row(class);
            joint[class] = self.class_log_prior[class]
                + row
                    .iter()
                    .filter(|(column, _)| *column < log_prob.len())
                    .map(|(column, &value)| value * log_prob[column])
                    .sum::<f64>();
        }
        softmax(joint)
    }

    /// 行列の各行について `[P(VALID), P(HOAX)]` を返す。
    #[must_use]
    pub fn predict_proba(&self, features: &FeatureMatrix) -> Vec<[f64; 2]> {
        features
            .outer_iterator()
            .map(|row| self.predict_proba_row(row))
            .collect()
    }

    #[must_use]
    pub fn predict(&self, features: &FeatureMatrix) -> Vec<Label> {
        self.predict_proba(features)
            .into_iter()
            .map(|[_, hoax]| if hoax >= 0.5 { Label::Hoax } else { Label::Valid })
            .collect()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_log_prob.ncols()
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.feature_log_prob.nrows()
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

fn softmax(log_probs: [f64; 2]) -> [f64; 2] {
    let max = log_probs[0].max(log_probs[1]);
    let exp = log_probs.map(|log_prob| (log_prob - max).exp());
    let sum = exp[0] + exp[1];
    exp.map(|value| value / sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprs::TriMat;

    fn matrix(rows: &[&[f64]]) -> FeatureMatrix {
        let cols = rows.first().map_or(0, |row| row.len());
        let mut triplets = TriMat::new((rows.len(), cols));
        for (r, row) in rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                if value != 0.0 {
                    triplets.add_triplet(r, c, value);
                }
            }
        }
        triplets.to_csr()
    }

    #[test]
    fn separates_disjoint_vocabularies() {
        let x = matrix(&[&[1.0, 0.0], &[0.9, 0.1], &[0.0, 1.0], &[0.1, 0.9]]);
        let labels = [Label::Valid, Label::Valid, Label::Hoax, Label::Hoax];
        let model = MultinomialNaiveBayes::fit(&x, &labels, 1.0).expect("fit");

        assert_eq!(model.predict(&x), labels);
        let [valid, hoax] = model.predict_proba_row(x.outer_view(2).expect("row"));
        assert!(hoax > valid);
        assert!(((valid + hoax) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_row_falls_back_to_class_prior() {
        let x = matrix(&[&[1.0, 0.0], &[0.0, 1.0], &[0.0, 1.0], &[0.0, 0.0]]);
        let labels = [Label::Valid, Label::Hoax, Label::Hoax, Label::Hoax];
        let model = MultinomialNaiveBayes::fit(&x, &labels, 1.0).expect("fit");

        let [valid, hoax] = model.predict_proba_row(x.outer_view(3).expect("row"));
        assert!((valid - 0.25).abs() < 1e-12);
        assert!((hoax - 0.75).abs() < 1e-12);
    }

    #[test]
    fn rejects_missing_class_and_mismatched_labels() {
        let x = matrix(&[&[1.0], &[0.5]]);
        assert!(MultinomialNaiveBayes::fit(&x, &[Label::Hoax, Label::Hoax], 1.0).is_err());
        assert!(MultinomialNaiveBayes::fit(&x, &[Label::Hoax], 1.0).is_err());
        assert!(MultinomialNaiveBayes::fit(&x, &[Label::Hoax, Label::Valid], 0.0).is_err());
    }

    #[test]
    fn reports_feature_width() {
        let x = matrix(&[&[1.0, 0.0, 0.0], &[0.0, 0.0, 1.0]]);
        let model =
            MultinomialNaiveBayes::fit(&x, &[Label::Valid, Label::Hoax], 1.0).expect("fit");
        assert_eq!(model.n_features(), 3);
        assert_eq!(model.n_classes(), 2);
    }
}
