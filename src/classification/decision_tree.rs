//! ランダムフォレストを構成する CART 分類木。
//!
//! 疎な TF-IDF 行列を列方向に引き直し、ノードごとに非ゼロ要素だけを走査して分割点を探す。
//! 特徴量は非負を前提とし、ゼロの要素は常に閾値の左側に入る。
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::{FeatureMatrix, Label};

/// 木の構築パラメータ。
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// 1 ノードで評価する（定数でない）特徴量の数。
    pub max_features: usize,
}

/// 全木で共有する読み取り専用の学習データ。
pub(crate) struct TrainingSet<'a> {
    columns: Vec<Vec<(usize, f64)>>,
    labels: &'a [Label],
}

impl<'a> TrainingSet<'a> {
    pub(crate) fn new(features: &FeatureMatrix, labels: &'a [Label]) -> Self {
        let mut columns = vec![Vec::new(); features.cols()];
        for (row_index, row) in features.outer_iterator().enumerate() {
            for (column, &value) in row.iter() {
                columns[column].push((row_index, value));
            }
        }
        Self { columns, labels }
    }

    pub(crate) fn n_samples(&self) -> usize {
        self.labels.len()
    }

    pub(crate) fn n_features(&self) -> usize {
        self.columns.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TreeNode {
    Leaf {
        proba: [f64; 2],
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// 配列上に節点を並べた二分木。節点 0 が根。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DecisionTree {
    nodes: Vec<TreeNode>,
}

struct Split {
    feature: usize,
    threshold: f64,
    impurity_decrease: f64,
}

struct Builder<'a, 'r> {
    data: &'a TrainingSet<'a>,
    params: TreeParams,
    rng: &'r mut StdRng,
    /// ブートストラップで各行が選ばれた回数。
    weights: Vec<u32>,
    in_node: Vec<bool>,
    goes_right: Vec<bool>,
    feature_order: Vec<usize>,
}

impl DecisionTree {
    /// ブートストラップ標本を引いてから木を最後まで成長させる。
    pub(crate) fn fit_bootstrap(data: &TrainingSet<'_>, params: TreeParams, rng: &mut StdRng) -> Self {
        let n = data.n_samples();
        let mut weights = vec![0_u32; n];
        for _ in 0..n {
            weights[rng.random_range(0..n)] += 1;
        }

        let mut builder = Builder {
            data,
            params,
            rng,
            weights,
            in_node: vec![false; n],
            goes_right: vec![false; n],
            feature_order: (0..data.n_features()).collect(),
        };
        builder.build()
    }

    /// 1 行分の密ベクトルに対する `[P(VALID), P(HOAX)]`。範囲外の特徴量は 0 とみなす。
    pub(crate) fn predict_proba(&self, row: &[f64]) -> [f64; 2] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { proba } => return *proba,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    index = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// 節点構造が壊れていないかを確かめ、参照される最大の特徴量番号を返す。
    pub(crate) fn check_structure(&self) -> Result<Option<usize>, String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        let mut max_feature = None;
        for (index, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                let in_range = |child: usize| child > index && child < self.nodes.len();
                if !in_range(*left) || !in_range(*right) {
                    return Err(format!("node {index} has invalid children"));
                }
                max_feature = max_feature.max(Some(*feature));
            }
        }
        Ok(max_feature)
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Builder<'_, '_> {
    fn build(&mut self) -> DecisionTree {
        let root_samples: Vec<usize> = (0..self.data.n_samples())
            .filter(|&row| self.weights[row] > 0)
            .collect();

        let mut nodes = vec![TreeNode::Leaf { proba: [0.0; 2] }];
        let mut stack = vec![(0_usize, root_samples, 0_usize)];

        while let Some((node, samples, depth)) = stack.pop() {
            let counts = self.class_weights(&samples);
            let Some(split) = self.best_split(&samples, counts, depth) else {
                nodes[node] = leaf(counts);
                continue;
            };

            let (left_samples, right_samples) = self.partition(&samples, &split);
            let left = nodes.len();
            let right = left + 1;
            nodes.push(TreeNode::Leaf { proba: [0.0; 2] });
            nodes.push(TreeNode::Leaf { proba: [0.0; 2] });
            nodes[node] = TreeNode::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };
            stack.push((right, right_samples, depth + 1));
            stack.push((left, left_samples, depth + 1));
        }

        DecisionTree { nodes }
    }

    fn class_weights(&self, samples: &[usize]) -> [f64; 2] {
        let mut counts = [0.0; 2];
        for &row in samples {
            counts[self.data.labels[row].index()] += f64::from(self.weights[row]);
        }
        counts
    }

    fn best_split(&mut self, samples: &[usize], counts: [f64; 2], depth: usize) -> Option<Split> {
        if counts[0] == 0.0 || counts[1] == 0.0 {
            return None;
        }
        if samples.len() < self.params.min_samples_split {
            return None;
        }
        if self.params.max_depth.is_some_and(|max_depth| depth >= max_depth) {
            return None;
        }

        for &row in samples {
            self.in_node[row] = true;
        }

        let parent = gini(counts);
        let n_features = self.feature_order.len();
        let mut visited = 0;
        let mut best: Option<Split> = None;
        let mut values = Vec::new();

        // 部分的な Fisher-Yates で特徴量を重複なく引く
        for position in 0..n_features {
            if visited >= self.params.max_features {
                break;
            }
            let pick = self.rng.random_range(position..n_features);
            self.feature_order.swap(position, pick);
            let feature = self.feature_order[position];

            values.clear();
            values.extend(
                self.data.columns[feature]
                    .iter()
                    .filter(|(row, _)| self.in_node[*row])
                    .copied(),
            );
            if is_constant(&values, samples.len()) {
                continue;
            }
            visited += 1;

            if let Some(candidate) = self.sweep(feature, &mut values, counts, parent)
                && best
                    .as_ref()
                    .is_none_or(|current| candidate.impurity_decrease > current.impurity_decrease)
            {
                best = Some(candidate);
            }
        }

        for &row in samples {
            self.in_node[row] = false;
        }
        best
    }

    /// 値の昇順に走査し、ジニ不純度の減少が最大になる閾値を探す。
    fn sweep(
        &self,
        feature: usize,
        values: &mut [(usize, f64)],
        counts: [f64; 2],
        parent: f64,
    ) -> Option<Split> {
        values.sort_by(|(_, left), (_, right)| left.total_cmp(right));

        let total = counts[0] + counts[1];
        let mut non_zero = [0.0; 2];
        for &(row, _) in values.iter() {
            non_zero[self.data.labels[row].index()] += f64::from(self.weights[row]);
        }
        let mut left = [counts[0] - non_zero[0], counts[1] - non_zero[1]];
        let mut previous = 0.0;
        let mut best: Option<Split> = None;

        for &(row, value) in values.iter() {
            let left_total = left[0] + left[1];
            if value > previous && left_total > 0.0 {
                let right = [counts[0] - left[0], counts[1] - left[1]];
                let right_total = total - left_total;
                let children =
                    (left_total * gini(left) + right_total * gini(right)) / total;
                let decrease = parent - children;
                if best
                    .as_ref()
                    .is_none_or(|current| decrease > current.impurity_decrease)
                {
                    let mut threshold = previous + (value - previous) / 2.0;
                    if threshold >= value {
                        threshold = previous;
                    }
                    best = Some(Split {
                        feature,
                        threshold,
                        impurity_decrease: decrease,
                    });
                }
            }
            left[self.data.labels[row].index()] += f64::from(self.weights[row]);
            previous = value;
        }
        best
    }

    fn partition(&mut self, samples: &[usize], split: &Split) -> (Vec<usize>, Vec<usize>) {
        let right_rows: Vec<usize> = self.data.columns[split.feature]
            .iter()
            .filter(|(_, value)| *value > split.threshold)
            .map(|(row, _)| *row)
            .collect();
        for &row in &right_rows {
            self.goes_right[row] = true;
        }
        let (right, left): (Vec<usize>, Vec<usize>) =
            samples.iter().copied().partition(|&row| self.goes_right[row]);
        for &row in &right_rows {
            self.goes_right[row] = false;
        }
        (left, right)
    }
}

fn is_constant(values: &[(usize, f64)], node_size: usize) -> bool {
    match values.split_first() {
        None => true,
        Some(((_, first), rest)) => {
            values.len() == node_size && rest.iter().all(|(_, value)| value == first)
        }
    }
}

fn gini(counts: [f64; 2]) -> f64 {
    let total = counts[0] + counts[1];
    if total == 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|count| (count / total).powi(2)).sum::<f64>()
}

fn leaf(counts: [f64; 2]) -> TreeNode {
    let total = counts[0] + counts[1];
    let proba = if total > 0.0 {
        [counts[0] / total, counts[1] / total]
    } else {
        [0.5, 0.5]
    };
    TreeNode::Leaf { proba }
}
