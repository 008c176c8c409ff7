//! スクレイピング済み記事コーパスの型と入出力。
pub mod assembler;
pub mod store;

pub use assembler::{ClassDistribution, CorpusAssembler, LabeledCorpus};

use crate::classification::Label;

/// スクレイパーが出力した 1 記事。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawArticle {
    pub title: String,
    pub link: String,
    pub published: String,
    pub author: String,
    pub excerpt: String,
}

/// 要約を正規化した記事。`clean_excerpt` は空白区切りの語幹列。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedArticle {
    pub article: RawArticle,
    pub clean_excerpt: String,
}

impl NormalizedArticle {
    #[must_use]
    pub fn title(&self) -> &str {
        &self.article.title
    }
}

/// 学習・評価に使う (正規化テキスト, ラベル) の組。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledExample {
    pub text: String,
    pub label: Label,
}

impl LabeledExample {
    pub fn new(text: impl Into<String>, label: Label) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}
