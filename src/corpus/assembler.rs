//! 正規化済み記事に弱ラベルを付けて学習コーパスを組み立てる。
use std::fmt;

use tracing::info;

use super::{LabeledExample, NormalizedArticle};
use crate::classification::{Label, TitleLabeler};
use crate::error::DataError;

/// クラスごとの件数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassDistribution {
    pub hoax: usize,
    pub valid: usize,
}

impl ClassDistribution {
    pub fn record(&mut self, label: Label) {
        match label {
            Label::Hoax => self.hoax += 1,
            Label::Valid => self.valid += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.hoax + self.valid
    }

    #[must_use]
    pub fn count(&self, label: Label) -> usize {
        match label {
            Label::Hoax => self.hoax,
            Label::Valid => self.valid,
        }
    }
}

impl fmt::Display for ClassDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HOAX={} VALID={}", self.hoax, self.valid)
    }
}

/// 学習可能なコーパス。2 クラスとも 1 件以上含む。
#[derive(Debug, Clone)]
pub struct LabeledCorpus {
    pub examples: Vec<LabeledExample>,
    pub distribution: ClassDistribution,
    /// UNKNOWN として捨てた行数。
    pub unlabeled: usize,
}

#[derive(Debug, Clone)]
pub struct CorpusAssembler {
    labeler: TitleLabeler,
}

impl CorpusAssembler {
    #[must_use]
    pub fn new(labeler: TitleLabeler) -> Self {
        Self { labeler }
    }

    /// UNKNOWN 以外の行を入力順に [`LabeledExample`] へ変換する。
    #[must_use]
    pub fn label(&self, articles: &[NormalizedArticle]) -> Vec<LabeledExample> {
        articles
            .iter()
            .filter_map(|article| {
                let label = self.labeler.label(article.title()).known()?;
                Some(LabeledExample::new(article.clean_excerpt.clone(), label))
            })
            .collect()
    }

    /// ソースごとの記事集合を連結してラベル付きコーパスにする。
    ///
    /// # Errors
    /// ラベル付きの行が 0 件なら [`DataError::EmptyCorpus`]、
    /// 1 クラスしか残らなければ [`DataError::SingleClass`]。
    pub fn assemble<'a, I>(&self, sources: I) -> Result<LabeledCorpus, DataError>
    where
        I: IntoIterator<Item = &'a [NormalizedArticle]>,
    {
        let mut examples = Vec::new();
        let mut rows = 0;
        for articles in sources {
            rows += articles.len();
            examples.extend(self.label(articles));
        }

        let mut distribution = ClassDistribution::default();
        for example in &examples {
            distribution.record(example.label);
        }
        let unlabeled = rows - examples.len();

        info!(
            rows,
            hoax = distribution.hoax,
            valid = distribution.valid,
            unlabeled,
            "assembled labeled corpus"
        );

        match (distribution.hoax, distribution.valid) {
            (0, 0) => Err(DataError::EmptyCorpus),
            (0, _) => Err(DataError::SingleClass(Label::Valid)),
            (_, 0) => Err(DataError::SingleClass(Label::Hoax)),
            _ => Ok(LabeledCorpus {
                examples,
                distribution,
                unlabeled,
            }),
        }
    }
}
