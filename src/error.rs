//! コーパス境界・モデル境界で発生する致命的エラー。
use std::path::PathBuf;

use thiserror::Error;

use crate::classification::Label;

/// 入力コーパスに起因するエラー。学習・集計を中断する。
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no corpus files found in {0}")]
    NoCorpusFiles(PathBuf),
    #[error("failed to list corpus directory {path}: {source}")]
    UnreadableDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corpus is empty after dropping unlabeled rows")]
    EmptyCorpus,
    #[error("no terms left to build a vocabulary; every labeled excerpt is empty after normalization")]
    EmptyVocabulary,
    #[error("only one class ({0}) present in the dataset; the model cannot be trained")]
    SingleClass(Label),
    #[error("missing required column `{column}` in {path}")]
    MissingColumn { column: &'static str, path: PathBuf },
    #[error("failed to read corpus file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error(
        "class {label} has only {count} example(s); a stratified split needs at least 2 per class"
    )]
    StratificationInfeasible { label: Label, count: usize },
}

/// モデル成果物（vectorizer / naive bayes / random forest）の読み込みエラー。
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("model artifacts not found ({}); run `hoax-detector train` first", display_paths(.paths))]
    Missing { paths: Vec<PathBuf> },
    #[error("failed to read model artifact {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse model artifact {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("model artifacts do not belong together: {0}; retrain to regenerate all three")]
    Inconsistent(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_artifacts_message_names_files_and_training() {
        let error = ArtifactError::Missing {
            paths: vec![PathBuf::from("model/nb.json"), PathBuf::from("model/rf.json")],
        };
        let message = error.to_string();
        assert!(message.contains("model/nb.json, model/rf.json"));
        assert!(message.contains("train"));
    }

    #[test]
    fn single_class_message_names_label() {
        let message = DataError::SingleClass(Label::Valid).to_string();
        assert!(message.contains("VALID"));
    }
}
