//! 語根辞書を併用するインドネシア語の接辞除去ステマー。
//!
//! 各段階の後に語根辞書を引き、既知の語根（または語根 + 派生接尾辞）になった時点で止める。
//! 辞書にない語は母音数（measure）が 2 以下になるまで規則で縮める。除去の順序は
//! 小辞 → 所有代名詞 → 第一接頭辞 → 接尾辞 → 第二接頭辞。

use super::roots::RootWords;

const PARTICLES: [&str; 3] = ["kah", "lah", "pun"];
const POSSESSIVES: [&str; 3] = ["nya", "ku", "mu"];
const DERIVATIONAL_SUFFIXES: [&str; 3] = ["kan", "an", "i"];

const FIRST_ORDER_PREFIXES: [(&str, PrefixKind); 12] = [
    ("meny", PrefixKind::Active),
    ("peny", PrefixKind::Nominal),
    ("meng", PrefixKind::Active),
    ("peng", PrefixKind::Nominal),
    ("mem", PrefixKind::Active),
    ("pem", PrefixKind::Nominal),
    ("men", PrefixKind::Active),
    ("pen", PrefixKind::Nominal),
    ("ter", PrefixKind::Active),
    ("me", PrefixKind::Active),
    ("di", PrefixKind::Active),
    ("ke", PrefixKind::Nominal),
];

/// 除去した接頭辞の種類。接尾辞の除去可否を決める。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrefixKind {
    None,
    /// di-, me-, meng-, men-, mem-, meny-, ter-
    Active,
    /// pe-, per-
    Agentive,
    /// ke-, peng-, pen-, pem-, peny-
    Nominal,
    /// ber-, be-
    Stative,
}

impl PrefixKind {
    fn rank(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Active => 1,
            Self::Agentive => 2,
            Self::Nominal => 3,
            Self::Stative => 4,
        }
    }
}

/// インドネシア語ステマー。語根辞書は読み取り専用なので複数スレッドから共有できる。
#[derive(Debug, Clone, Default)]
pub struct IndonesianStemmer {
    roots: RootWords,
}

struct Word {
    text: String,
    measure: usize,
    prefix: PrefixKind,
    /// 鼻音化した接頭辞を語頭子音に戻した（menulis → tulis など）
    recoded: bool,
}

impl IndonesianStemmer {
    #[must_use]
    pub fn new(roots: RootWords) -> Self {
        Self { roots }
    }

    /// 組み込みの語根辞書で構成する。
    #[must_use]
    pub fn indonesian() -> Self {
        Self::new(RootWords::indonesian())
    }

    #[must_use]
    pub fn roots(&self) -> &RootWords {
        &self.roots
    }

    /// 単語を語幹に縮める。小文字化済みの入力を前提とする。
    #[must_use]
    pub fn stem(&self, word: &str) -> String {
        if let Some(root) = self.lookup(word) {
            return root;
        }
        let measure = word.chars().filter(|c| is_vowel(*c)).count();
        if measure <= 2 {
            return word.to_string();
        }

        let mut word = Word {
            text: word.to_string(),
            measure,
            prefix: PrefixKind::None,
            recoded: false,
        };

        for suffixes in [PARTICLES, POSSESSIVES] {
            if word.measure <= 2 {
                return word.text;
            }
            if strip_suffix_from(&mut word, &suffixes)
                && let Some(root) = self.lookup(&word.text)
            {
                return root;
            }
        }
        if word.measure <= 2 {
            return word.text;
        }

        if self.remove_first_order_prefix(&mut word) {
            if let Some(root) = self.lookup(&word.text) {
                return root;
            }
            if word.measure > 2 {
                remove_suffix(&mut word);
            }
            if word.measure > 2 && !word.recoded && !self.roots.contains(&word.text) {
                self.remove_second_order_prefix(&mut word);
            }
        } else {
            self.remove_second_order_prefix(&mut word);
            if let Some(root) = self.lookup(&word.text) {
                return root;
            }
            if word.measure > 2 {
                remove_suffix(&mut word);
            }
        }

        word.text
    }

    /// 語根そのもの、または語根に派生接尾辞が付いた形なら語根を返す。
    fn lookup(&self, text: &str) -> Option<String> {
        if self.roots.contains(text) {
            return Some(text.to_string());
        }
        DERIVATIONAL_SUFFIXES.iter().find_map(|suffix| {
            text.strip_suffix(suffix)
                .filter(|stem| self.roots.contains(stem))
                .map(str::to_string)
        })
    }

    /// 接頭辞の後に戻す語頭を選ぶ。辞書で確認できた方を優先し、どちらも未知なら `default`。
    fn choose_initial(
        &self,
        rest: &str,
        default: &'static str,
        alternative: &'static str,
    ) -> &'static str {
        if self.lookup(&format!("{default}{rest}")).is_none()
            && self.lookup(&format!("{alternative}{rest}")).is_some()
        {
            alternative
        } else {
            default
        }
    }

    fn remove_first_order_prefix(&self, word: &mut Word) -> bool {
        for (prefix, kind) in FIRST_ORDER_PREFIXES {
            let Some(rest) = word.text.strip_prefix(prefix) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            let before_vowel = starts_with_vowel(rest);
            let initial = match prefix {
                "meny" | "peny" if before_vowel => self.choose_initial(rest, "s", "ny"),
                "meny" | "peny" => continue,
                "meng" | "peng" if before_vowel => self.choose_initial(rest, "", "k"),
                "mem" | "pem" if before_vowel => self.choose_initial(rest, "p", "m"),
                "men" | "pen" if before_vowel => self.choose_initial(rest, "t", "n"),
                "ter" if before_vowel => self.choose_initial(rest, "", "r"),
                _ => "",
            };
            replace_prefix(word, prefix.len(), initial, Some(kind));
            word.recoded = !initial.is_empty();
            return true;
        }
        false
    }

    fn remove_second_order_prefix(&self, word: &mut Word) -> bool {
        let text = word.text.as_str();

        if text.starts_with("belajar") {
            replace_prefix(word, "bel".len(), "", Some(PrefixKind::Stative));
            return true;
        }
        if text.starts_with("pelajar") {
            replace_prefix(word, "pel".len(), "", None);
            return true;
        }

        if let Some(rest) = text.strip_prefix("ber")
            && !rest.is_empty()
        {
            let initial = if starts_with_vowel(rest) {
                self.choose_initial(rest, "", "r")
            } else {
                ""
            };
            replace_prefix(word, 3, initial, Some(PrefixKind::Stative));
            return true;
        }
        // be- only before a consonant followed by `er` (bekerja, beserta)
        if let Some(rest) = text.strip_prefix("be") {
            let mut chars = rest.chars();
            if let Some(first) = chars.next()
                && !is_vowel(first)
                && chars.as_str().starts_with("er")
            {
                replace_prefix(word, 2, "", Some(PrefixKind::Stative));
                return true;
            }
        }
        for prefix in ["per", "pe"] {
            if text.strip_prefix(prefix).is_some_and(|rest| !rest.is_empty()) {
                replace_prefix(word, prefix.len(), "", Some(PrefixKind::Agentive));
                return true;
            }
        }
        false
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn starts_with_vowel(text: &str) -> bool {
    text.chars().next().is_some_and(is_vowel)
}

fn strip_suffix_from(word: &mut Word, suffixes: &[&str]) -> bool {
    for suffix in suffixes {
        if let Some(rest) = word.text.strip_suffix(suffix)
            && !rest.is_empty()
        {
            let keep = rest.len();
            word.text.truncate(keep);
            word.measure -= 1;
            return true;
        }
    }
    false
}

fn replace_prefix(word: &mut Word, prefix_len: usize, replacement: &str, kind: Option<PrefixKind>) {
    word.text.replace_range(..prefix_len, replacement);
    word.measure -= 1;
    if let Some(kind) = kind {
        word.prefix = kind;
    }
}

fn remove_suffix(word: &mut Word) -> bool {
    let prefix = word.prefix;

    let kan_allowed = !matches!(prefix, PrefixKind::Nominal | PrefixKind::Agentive);
    if kan_allowed && strip_suffix_from(word, &["kan"]) {
        return true;
    }

    let an_allowed = prefix != PrefixKind::Active;
    if an_allowed && strip_suffix_from(word, &["an"]) {
        return true;
    }

    let i_allowed = prefix.rank() <= PrefixKind::Agentive.rank()
        && word
            .text
            .strip_suffix('i')
            .is_some_and(|rest| !rest.ends_with('s'));
    if i_allowed && strip_suffix_from(word, &["i"]) {
        return true;
    }

    false
}
