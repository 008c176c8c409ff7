//! 記事要約テキストの正規化処理。
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::{stemmer::IndonesianStemmer, stopwords::StopwordSet};

/// 生テキストをモデル入力用のトークン列に変換する。
///
/// 小文字化 → 数字除去 → ASCII 記号除去 → ストップワード除去 → ステミング の順に適用する。
/// 内部状態は読み取り専用なので、`&self` のまま複数スレッドから呼び出せる。
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    stopwords: StopwordSet,
    stemmer: IndonesianStemmer,
    digits: Regex,
}

impl TextNormalizer {
    #[must_use]
    pub fn new(stopwords: StopwordSet, stemmer: IndonesianStemmer) -> Self {
        Self {
            stopwords,
            stemmer,
            digits: Regex::new(r"\d+").expect("compile digit pattern"),
        }
    }

    /// 組み込みのインドネシア語ストップワードとステマーで構成する。
    #[must_use]
    pub fn indonesian() -> Self {
        Self::new(StopwordSet::indonesian(), IndonesianStemmer::indonesian())
    }

    /// テキストを正規化する。空白のみの入力は空文字列になる。
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.nfc().collect::<String>().to_lowercase();
        let without_digits = self.digits.replace_all(&lowered, "");
        let without_punctuation: String = without_digits
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect();

        without_punctuation
            .split_whitespace()
            .filter(|token| !self.stopwords.contains(token))
            .map(|token| self.stemmer.stem(token))
            .filter(|token| !token.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::indonesian()
    }
}
