//! 記事タイトルのタグから弱教師ラベルを導出する。
use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

use super::Label;

pub const HOAX_TAGS: [&str; 5] = ["[SALAH]", "[PENIPUAN]", "[FITNAH]", "[DISINFORMASI]", "[HOAX]"];
pub const VALID_TAGS: [&str; 4] = ["[VALID]", "[BENAR]", "[FAKTA]", "[KLARIFIKASI]"];
pub const TRUSTED_SOURCE: &str = "KOMPAS";

/// タイトルから得られる三値の弱ラベル。`Unknown` は学習・評価から除外される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeakLabel {
    Hoax,
    Valid,
    Unknown,
}

impl WeakLabel {
    /// 二値ラベルへ変換する。`Unknown` は `None`。
    #[must_use]
    pub fn known(self) -> Option<Label> {
        match self {
            Self::Hoax => Some(Label::Hoax),
            Self::Valid => Some(Label::Valid),
            Self::Unknown => None,
        }
    }
}

/// ラベリング方針。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelPolicy {
    /// タグのない Kompas 記事を VALID とみなす。
    pub trusted_source_is_valid: bool,
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self {
            trusted_source_is_valid: true,
        }
    }
}

/// タグ集合ごとの大文字小文字を区別しない照合器。
#[derive(Debug, Clone)]
pub struct TitleLabeler {
    hoax: AhoCorasick,
    valid: AhoCorasick,
    trusted: AhoCorasick,
    policy: LabelPolicy,
}

impl TitleLabeler {
    /// # Errors
    /// オートマトンの構築に失敗した場合（パターンが大きすぎる場合など）はエラーを返す。
    pub fn new(policy: LabelPolicy) -> Result<Self, aho_corasick::BuildError> {
        Ok(Self {
            hoax: build_matcher(&HOAX_TAGS)?,
            valid: build_matcher(&VALID_TAGS)?,
            trusted: build_matcher(&[TRUSTED_SOURCE])?,
            policy,
        })
    }

    #[must_use]
    pub fn policy(&self) -> LabelPolicy {
        self.policy
    }

    /// タイトルにラベルを付ける。最初に一致した規則が優先される。
    ///
    /// 1. HOAX タグ → `Hoax`
    /// 2. VALID タグ → `Valid`
    /// 3. `KOMPAS` を含む（方針で有効な場合）→ `Valid`
    /// 4. それ以外 → `Unknown`
    #[must_use]
    pub fn label(&self, title: &str) -> WeakLabel {
        if self.hoax.is_match(title) {
            return WeakLabel::Hoax;
        }
        if self.valid.is_match(title) {
            return WeakLabel::Valid;
        }
        if self.policy.trusted_source_is_valid && self.trusted.is_match(title) {
            return WeakLabel::Valid;
        }
        WeakLabel::Unknown
    }
}

fn build_matcher(patterns: &[&str]) -> Result<AhoCorasick, aho_corasick::BuildError> {
    AhoCorasickBuilder::new()
        .match_kind(MatchKind::LeftmostFirst)
        .ascii_case_insensitive(true)
        .build(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn labeler() -> TitleLabeler {
        TitleLabeler::new(LabelPolicy::default()).expect("labeler should build")
    }

    #[rstest]
    #[case("[SALAH] Video banjir bandang di Jakarta", WeakLabel::Hoax)]
    #[case("[hoax] pesan berantai vaksin", WeakLabel::Hoax)]
    #[case("[Disinformasi] Klaim obat ajaib", WeakLabel::Hoax)]
    #[case("[PENIPUAN] Undian berhadiah mobil", WeakLabel::Hoax)]
    #[case("[FITNAH] Tokoh X ditangkap", WeakLabel::Hoax)]
    #[case("[VALID] Jadwal libur nasional", WeakLabel::Valid)]
    #[case("[klarifikasi] Foto lama beredar lagi", WeakLabel::Valid)]
    #[case("[FAKTA] Gempa di Cianjur", WeakLabel::Valid)]
    #[case("[BENAR] Harga BBM naik", WeakLabel::Valid)]
    #[case("Harga cabai naik - Kompas.com", WeakLabel::Valid)]
    #[case("KOMPAS: laporan ekonomi", WeakLabel::Valid)]
    #[case("Harga cabai naik di pasar", WeakLabel::Unknown)]
    #[case("SALAH tanpa kurung siku", WeakLabel::Unknown)]
    #[case("", WeakLabel::Unknown)]
    fn labels_titles(#[case] title: &str, #[case] expected: WeakLabel) {
        assert_eq!(labeler().label(title), expected);
    }

    #[test]
    fn hoax_tag_wins_over_valid_tag() {
        let labeler = labeler();
        assert_eq!(labeler.label("[VALID] [SALAH] klaim"), WeakLabel::Hoax);
        assert_eq!(labeler.label("[KLARIFIKASI] [HOAX] foto"), WeakLabel::Hoax);
        assert_eq!(labeler.label("[fakta] kompas [penipuan]"), WeakLabel::Hoax);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let labeler = labeler();
        assert_eq!(labeler.label("[hoax] x"), labeler.label("[HOAX] x"));
        assert_eq!(labeler.label("[Valid] x"), labeler.label("[VALID] x"));
        assert_eq!(labeler.label("berita kompas"), WeakLabel::Valid);
    }

    #[test]
    fn trusted_source_rule_can_be_disabled() {
        let labeler = TitleLabeler::new(LabelPolicy {
            trusted_source_is_valid: false,
        })
        .expect("labeler should build");
        assert_eq!(labeler.label("Harga cabai naik - Kompas.com"), WeakLabel::Unknown);
        assert_eq!(labeler.label("[VALID] Kompas"), WeakLabel::Valid);
    }

    #[test]
    fn unknown_has_no_binary_label() {
        assert_eq!(WeakLabel::Unknown.known(), None);
        assert_eq!(WeakLabel::Hoax.known(), Some(Label::Hoax));
        assert_eq!(WeakLabel::Valid.known(), Some(Label::Valid));
    }
}
