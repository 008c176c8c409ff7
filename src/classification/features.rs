//! 正規化済みテキストから TF-IDF 特徴量を抽出する。
use std::sync::LazyLock;

use anyhow::{Result, ensure};
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use sprs::CsMat;
use tracing::debug;

use super::NgramRange;
use crate::error::DataError;

/// 行 = 文書、列 = 語彙の CSR 行列。
pub type FeatureMatrix = CsMat<f64>;

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("compile token pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    pub max_features: usize,
    pub ngram_range: NgramRange,
    /// `1 + ln(tf)` を使う。
    pub sublinear_tf: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            ngram_range: NgramRange::default(),
            sublinear_tf: true,
        }
    }
}

/// 学習済み TF-IDF ベクトライザ。
///
/// 語彙は辞書順に並べた語と、その位置を列番号として保持する。
/// 永続化形式は `VectorizerState` で、読み込み時に長さの整合性を検証する。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "VectorizerState", into = "VectorizerState")]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    vocabulary: Vec<String>,
    idf: Vec<f64>,
    index: FxHashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VectorizerState {
    config: VectorizerConfig,
    vocabulary: Vec<String>,
    idf: Vec<f64>,
}

impl TryFrom<VectorizerState> for TfidfVectorizer {
    type Error = anyhow::Error;

    fn try_from(state: VectorizerState) -> Result<Self> {
        let range = state.config.ngram_range;
        NgramRange::new(range.low(), range.high())?;
        ensure!(
            state.vocabulary.len() == state.idf.len(),
            "vocabulary has {} terms but idf has {} weights",
            state.vocabulary.len(),
            state.idf.len()
        );
        let index = build_index(&state.vocabulary);
        ensure!(
            index.len() == state.vocabulary.len(),
            "vocabulary contains duplicate terms"
        );
        Ok(Self {
            config: state.config,
            vocabulary: state.vocabulary,
            idf: state.idf,
            index,
        })
    }
}

impl From<TfidfVectorizer> for VectorizerState {
    fn from(vectorizer: TfidfVectorizer) -> Self {
        Self {
            config: vectorizer.config,
            vocabulary: vectorizer.vocabulary,
            idf: vectorizer.idf,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct TermStats {
    term_frequency: u64,
    document_frequency: usize,
}

impl TfidfVectorizer {
    /// コーパスから語彙と IDF を学習する。
    ///
    /// 語彙はコーパス全体の出現回数で上位 `max_features` 語に絞り、同数の場合は辞書順で選ぶ。
    ///
    /// # Errors
    /// `max_features` が 0 の場合はエラー、語彙が 1 語も得られない場合は
    /// [`DataError::EmptyVocabulary`] を返す。
    pub fn fit<S: AsRef<str>>(config: VectorizerConfig, texts: &[S]) -> Result<Self> {
        ensure!(config.max_features > 0, "max_features must be positive");

        let mut stats: FxHashMap<String, TermStats> = FxHashMap::default();
        for text in texts {
            for (term, count) in term_counts(text.as_ref(), config.ngram_range) {
                let entry = stats.entry(term).or_default();
                entry.term_frequency += count as u64;
                entry.document_frequency += 1;
            }
        }
        if stats.is_empty() {
            return Err(DataError::EmptyVocabulary.into());
        }

        let mut ranked: Vec<(String, TermStats)> = stats.into_iter().collect();
        ranked.sort_by(|(left_term, left), (right_term, right)| {
            right
                .term_frequency
                .cmp(&left.term_frequency)
                .then_with(|| left_term.cmp(right_term))
        });
        let candidate_terms = ranked.len();
        ranked.truncate(config.max_features);
        ranked.sort_by(|(left, _), (right, _)| left.cmp(right));

        let n_documents = texts.len() as f64;
        let (vocabulary, idf): (Vec<String>, Vec<f64>) = ranked
            .into_iter()
            .map(|(term, stats)| {
                let df = stats.document_frequency as f64;
                (term, ((n_documents + 1.0) / (df + 1.0)).ln() + 1.0)
            })
            .unzip();

        debug!(
            documents = texts.len(),
            candidate_terms,
            vocabulary = vocabulary.len(),
            ngram_range = %config.ngram_range,
            "fitted tf-idf vocabulary"
        );

        let index = build_index(&vocabulary);
        Ok(Self {
            config,
            vocabulary,
            idf,
            index,
        })
    }

    /// テキスト群を TF-IDF 行列に変換する。未知語は無視され、失敗しない。
    #[must_use]
    pub fn transform<S: AsRef<str>>(&self, texts: &[S]) -> FeatureMatrix {
        let mut indptr = Vec::with_capacity(texts.len() + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);

        for text in texts {
            let row = self.weigh(text.as_ref());
            for (column, weight) in row {
                indices.push(column);
                data.push(weight);
            }
            indptr.push(indices.len());
        }

        CsMat::new((texts.len(), self.vocab_len()), indptr, indices, data)
    }

    /// 1 文書分の (列, 重み) を列番号順に返す。
    fn weigh(&self, text: &str) -> Vec<(usize, f64)> {
        let mut row: Vec<(usize, f64)> = term_counts(text, self.config.ngram_range)
            .into_iter()
            .filter_map(|(term, count)| {
                let column = *self.index.get(&term)?;
                let tf = count as f64;
                let tf = if self.config.sublinear_tf {
                    1.0 + tf.ln()
                } else {
                    tf
                };
                Some((column, tf * self.idf[column]))
            })
            .collect();
        row.sort_unstable_by_key(|(column, _)| *column);

        let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in &mut row {
                *weight /= norm;
            }
        }
        row
    }

    #[must_use]
    pub fn vocab_len(&self) -> usize {
        self.vocabulary.len()
    }

    #[must_use]
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    #[must_use]
    pub fn config(&self) -> VectorizerConfig {
        self.config
    }

    #[must_use]
    pub fn column_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }
}

fn build_index(vocabulary: &[String]) -> FxHashMap<String, usize> {
    vocabulary
        .iter()
        .enumerate()
        .map(|(column, term)| (term.clone(), column))
        .collect()
}

/// 小文字化して 2 文字以上の語を取り出し、n-gram ごとの出現回数を数える。
fn term_counts(text: &str, ngram_range: NgramRange) -> FxHashMap<String, usize> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .collect();

    let mut counts = FxHashMap::default();
    for n in ngram_range.low()..=ngram_range.high() {
        if n > tokens.len() {
            break;
        }
        for window in tokens.windows(n) {
            *counts.entry(window.join(" ")).or_insert(0) += 1;
        }
    }
    counts
}
