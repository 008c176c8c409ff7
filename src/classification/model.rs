//! 学習済みモデル三点セットの永続化と整合性検査。
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use super::{MultinomialNaiveBayes, RandomForest, TfidfVectorizer};
use crate::error::ArtifactError;

const VECTORIZER_FILE: &str = "vectorizer.json";
const NAIVE_BAYES_FILE: &str = "naive_bayes.json";
const RANDOM_FOREST_FILE: &str = "random_forest.json";

/// モデルディレクトリ内の成果物ファイルの配置。
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    dir: PathBuf,
}

impl ModelArtifacts {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn vectorizer(&self) -> PathBuf {
        self.dir.join(VECTORIZER_FILE)
    }

    #[must_use]
    pub fn naive_bayes(&self) -> PathBuf {
        self.dir.join(NAIVE_BAYES_FILE)
    }

    #[must_use]
    pub fn random_forest(&self) -> PathBuf {
        self.dir.join(RANDOM_FOREST_FILE)
    }

    #[must_use]
    pub fn all(&self) -> [PathBuf; 3] {
        [self.vectorizer(), self.naive_bayes(), self.random_forest()]
    }

    /// 存在しない成果物のパス一覧。
    #[must_use]
    pub fn missing(&self) -> Vec<PathBuf> {
        self.all().into_iter().filter(|path| !path.is_file()).collect()
    }
}

/// 同じ学習実行から生まれたベクトライザと 2 つの分類器。
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub vectorizer: TfidfVectorizer,
    pub naive_bayes: MultinomialNaiveBayes,
    pub random_forest: RandomForest,
}

impl TrainedModel {
    /// 3 つの成果物をまとめて書き出す。
    ///
    /// # Errors
    /// ディレクトリ作成・書き込み・シリアライズに失敗した場合。
    pub fn save(&self, artifacts: &ModelArtifacts) -> Result<()> {
        fs::create_dir_all(artifacts.dir()).with_context(|| {
            format!(
                "failed to create model directory {}",
                artifacts.dir().display()
            )
        })?;

        write_json(&artifacts.vectorizer(), &self.vectorizer)?;
        write_json(&artifacts.naive_bayes(), &self.naive_bayes)?;
        write_json(&artifacts.random_forest(), &self.random_forest)?;

        info!(
            dir = %artifacts.dir().display(),
            vocabulary = self.vectorizer.vocab_len(),
            trees = self.random_forest.n_trees(),
            "saved model artifacts"
        );
        Ok(())
    }

    /// 3 つの成果物を読み込む。1 つでも欠けていれば何も読み込まずに失敗する。
    ///
    /// # Errors
    /// 欠落・読み込み失敗・パース失敗・幅の不一致のいずれか。
    pub fn load(artifacts: &ModelArtifacts) -> Result<Self, ArtifactError> {
        let missing = artifacts.missing();
        if !missing.is_empty() {
            return Err(ArtifactError::Missing { paths: missing });
        }

        let model = Self {
            vectorizer: read_json(&artifacts.vectorizer())?,
            naive_bayes: read_json(&artifacts.naive_bayes())?,
            random_forest: read_json(&artifacts.random_forest())?,
        };
        model.validate()?;

        info!(
            dir = %artifacts.dir().display(),
            vocabulary = model.vectorizer.vocab_len(),
            trees = model.random_forest.n_trees(),
            "loaded model artifacts"
        );
        Ok(model)
    }

    /// 3 つの成果物の特徴量幅が一致しているかを確認する。
    ///
    /// # Errors
    /// 幅が一致しない場合、またはフォレストの構造が壊れている場合は
    /// [`ArtifactError::Inconsistent`] を返す。
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let width = self.vectorizer.vocab_len();
        if self.naive_bayes.n_classes() != 2 {
            return Err(ArtifactError::Inconsistent(format!(
                "naive bayes model has {} classes, expected 2",
                self.naive_bayes.n_classes()
            )));
        }
        if self.naive_bayes.n_features() != width {
            return Err(ArtifactError::Inconsistent(format!(
                "vectorizer has {width} features but naive bayes expects {}",
                self.naive_bayes.n_features()
            )));
        }
        if self.random_forest.n_features() != width {
            return Err(ArtifactError::Inconsistent(format!(
                "vectorizer has {width} features but random forest expects {}",
                self.random_forest.n_features()
            )));
        }
        self.random_forest
            .validate()
            .map_err(|error| ArtifactError::Inconsistent(format!("{error:#}")))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create model artifact {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)
        .with_context(|| format!("failed to serialize model artifact {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to write model artifact {}", path.display()))?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}
