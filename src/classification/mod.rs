//! HOAX / VALID 二値分類のための前処理・特徴量・モデル群。
use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod features;
pub mod labeler;
pub mod model;
pub mod naive_bayes;
pub mod normalizer;
pub mod random_forest;
pub mod roots;
pub mod stemmer;
pub mod stopwords;

mod decision_tree;

pub use features::{FeatureMatrix, TfidfVectorizer, VectorizerConfig};
pub use labeler::{LabelPolicy, TitleLabeler, WeakLabel};
pub use model::{ModelArtifacts, TrainedModel};
pub use naive_bayes::MultinomialNaiveBayes;
pub use normalizer::TextNormalizer;
pub use random_forest::{ForestConfig, RandomForest};
pub use roots::RootWords;
pub use stemmer::IndonesianStemmer;
pub use stopwords::StopwordSet;

/// 二値ラベル。`Valid` がクラス 0、`Hoax` がクラス 1。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Valid,
    Hoax,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Valid, Label::Hoax];

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Valid => 0,
            Self::Hoax => 1,
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Self {
        if index == 0 { Self::Valid } else { Self::Hoax }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::Hoax => "HOAX",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TF-IDF の n-gram 範囲（両端を含む）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgramRange {
    low: usize,
    high: usize,
}

impl NgramRange {
    /// # Errors
    /// `low` が 0、または `low > high` の場合はエラーを返す。
    pub fn new(low: usize, high: usize) -> Result<Self> {
        anyhow::ensure!(low >= 1, "n-gram lower bound must be at least 1, got {low}");
        anyhow::ensure!(
            low <= high,
            "n-gram lower bound {low} exceeds upper bound {high}"
        );
        Ok(Self { low, high })
    }

    #[must_use]
    pub fn low(self) -> usize {
        self.low
    }

    #[must_use]
    pub fn high(self) -> usize {
        self.high
    }
}

impl Default for NgramRange {
    fn default() -> Self {
        Self { low: 1, high: 2 }
    }
}

impl fmt::Display for NgramRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}
