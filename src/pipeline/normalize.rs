use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::classification::TextNormalizer;
use crate::corpus::{NormalizedArticle, RawArticle, store};
use crate::error::DataError;
use crate::util::partition::partitioned_map;

/// 正規化を実行したファイル数と記事数。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    pub files: Vec<PathBuf>,
    pub articles: usize,
}

/// 生コーパスのディレクトリを正規化済みディレクトリへ変換する段階。
#[derive(Debug, Clone)]
pub struct CorpusNormalizer {
    normalizer: TextNormalizer,
    workers: NonZeroUsize,
}

impl CorpusNormalizer {
    #[must_use]
    pub fn new(normalizer: TextNormalizer, workers: NonZeroUsize) -> Self {
        Self {
            normalizer,
            workers,
        }
    }

    /// 記事の要約を `workers` 個の連続チャンクで並列に正規化する。出力順は入力順と同じ。
    ///
    /// # Errors
    /// ワーカープールを構築できなかった場合。
    pub fn normalize_batch(&self, articles: &[RawArticle]) -> Result<Vec<NormalizedArticle>> {
        partitioned_map(articles, self.workers, |article| {
            Ok(NormalizedArticle {
                article: article.clone(),
                clean_excerpt: self.normalizer.normalize(&article.excerpt),
            })
        })
    }

    /// `raw_dir` の `*.csv` をそれぞれ正規化し、`clean_dir/<stem>_cleaned.csv` に書き出す。
    ///
    /// # Errors
    /// 入力ファイルが 1 つもない場合、読み込み・書き込みに失敗した場合。
    pub fn run(&self, raw_dir: &Path, clean_dir: &Path) -> Result<NormalizeSummary> {
        let sources = store::list_files(raw_dir, ".csv")?;
        if sources.is_empty() {
            return Err(DataError::NoCorpusFiles(raw_dir.to_path_buf()).into());
        }

        let mut summary = NormalizeSummary::default();
        for source in sources {
            let raw = store::read_raw(&source)?;
            if raw.is_empty() {
                warn!(path = %source.display(), "corpus file has no rows");
            }
            let normalized = self
                .normalize_batch(&raw)
                .with_context(|| format!("failed to normalize {}", source.display()))?;

            let target = clean_dir.join(store::cleaned_file_name(&source));
            store::write_normalized(&target, &normalized)?;
            info!(
                source = %source.display(),
                target = %target.display(),
                articles = normalized.len(),
                workers = self.workers.get(),
                "normalized corpus file"
            );

            summary.articles += normalized.len();
            summary.files.push(target);
        }
        Ok(summary)
    }
}
