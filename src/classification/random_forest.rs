//! ブートストラップ木を並列に学習するランダムフォレスト。
use std::num::NonZeroUsize;

use anyhow::{Context, Result, ensure};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sprs::CsVecView;
use tracing::debug;

use super::decision_tree::{DecisionTree, TrainingSet, TreeParams};
use super::{FeatureMatrix, Label};

/// フォレストの学習設定。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// 木 `i` は `seed + i` で初期化した乱数列を使う。
    pub seed: u64,
    /// `None` なら葉が純粋になるまで成長させる。
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// 分割ごとに評価する特徴量数。`None` なら `ceil(sqrt(n_features))`。
    pub max_features: Option<usize>,
    /// 学習に使うスレッド数。`None` なら rayon のグローバルプールを使う。
    pub threads: Option<NonZeroUsize>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 300,
            seed: 42,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            threads: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// # Errors
    /// 行数とラベル数が一致しない場合、木の本数が 0 の場合、
    /// スレッドプールを構築できない場合はエラーを返す。
    pub fn fit(features: &FeatureMatrix, labels: &[Label], config: ForestConfig) -> Result<Self> {
        ensure!(
            features.rows() == labels.len(),
            "feature matrix has {} rows but {} labels were given",
            features.rows(),
            labels.len()
        );
        ensure!(!labels.is_empty(), "cannot fit a random forest without samples");
        ensure!(config.n_trees > 0, "random forest needs at least one tree");

        let data = TrainingSet::new(features, labels);
        let n_features = data.n_features();
        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split.max(2),
            max_features: config
                .max_features
                .unwrap_or_else(|| default_max_features(n_features))
                .clamp(1, n_features.max(1)),
        };

        let grow = || -> Vec<DecisionTree> {
            (0..config.n_trees)
                .into_par_iter()
                .map(|i| {
                    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(i as u64));
                    DecisionTree::fit_bootstrap(&data, params, &mut rng)
                })
                .collect()
        };

        let trees = match config.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads.get())
                .build()
                .context("failed to build random forest thread pool")?
                .install(grow),
            None => grow(),
        };

        debug!(
            trees = trees.len(),
            n_features,
            max_features = params.max_features,
            total_nodes = trees.iter().map(DecisionTree::node_count).sum::<usize>(),
            "fitted random forest"
        );

        Ok(Self { n_features, trees })
    }

    /// 1 文書の `[P(VALID), P(HOAX)]`。各木の葉の確率を平均する。
    #[must_use]
    pub fn predict_proba_row(&self, row: CsVecView<'_, f64>) -> [f64; 2] {
        let mut dense = vec![0.0; self.n_features];
        for (column, &value) in row.iter() {
            if let Some(slot) = dense.get_mut(column) {
                *slot = value;
            }
        }

        let mut sum = [0.0; 2];
        for tree in &self.trees {
            let [valid, hoax] = tree.predict_proba(&dense);
            sum[0] += valid;
            sum[1] += hoax;
        }
        let n = self.trees.len().max(1) as f64;
        [sum[0] / n, sum[1] / n]
    }

    #[must_use]
    pub fn predict_proba(&self, features: &FeatureMatrix) -> Vec<[f64; 2]> {
        features
            .outer_iterator()
            .collect::<Vec<_>>()
            .into_par_iter()
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
        self.n_features
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// 木の構造と特徴量番号が `n_features` の範囲に収まっているかを確認する。
    ///
    /// # Errors
    /// 木が 1 本もない場合、節点の参照が壊れている場合、範囲外の特徴量を参照する場合。
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.trees.is_empty(), "random forest contains no trees");
        for (index, tree) in self.trees.iter().enumerate() {
            let max_feature = tree
                .check_structure()
                .map_err(|reason| anyhow::anyhow!("tree {index}: {reason}"))?;
            if let Some(feature) = max_feature {
                ensure!(
                    feature < self.n_features,
                    "tree {index} splits on feature {feature} but the forest has {} features",
                    self.n_features
                );
            }
        }
        Ok(())
    }
}

fn default_max_features(n_features: usize) -> usize {
    (n_features as f64).sqrt().ceil() as usize
}
