use std::{env, num::NonZeroUsize, path::PathBuf};

use thiserror::Error;

use crate::classification::NgramRange;

/// ログ出力形式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    raw_dir: PathBuf,
    clean_dir: PathBuf,
    model_dir: PathBuf,
    normalize_workers: NonZeroUsize,
    max_features: NonZeroUsize,
    ngram_range: NgramRange,
    test_ratio: f64,
    seed: u64,
    rf_trees: NonZeroUsize,
    rf_threads: Option<NonZeroUsize>,
    nb_alpha: f64,
    kompas_default_valid: bool,
    log_format: LogFormat,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Config {
    /// 環境変数から設定値を読み込み、検証する。
    ///
    /// 未設定の項目はデフォルト値を使う。
    ///
    /// # Errors
    /// 数値・範囲・真偽値のパースに失敗した場合は [`ConfigError`] を返す。
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_dir = parse_path("HOAX_RAW_DIR", "data");
        let clean_dir = parse_path("HOAX_CLEAN_DIR", "data_clean");
        let model_dir = parse_path("HOAX_MODEL_DIR", "model");

        let normalize_workers = parse_non_zero_usize("HOAX_NORMALIZE_WORKERS", 4)?;

        // Feature extraction
        let max_features = parse_non_zero_usize("HOAX_MAX_FEATURES", 5000)?;
        let ngram_range = parse_ngram_range("HOAX_NGRAM_RANGE", "1,2")?;

        // Training
        let test_ratio = parse_ratio("HOAX_TEST_RATIO", 0.2)?;
        let seed = parse_u64("HOAX_SEED", 42)?;
        let rf_trees = parse_non_zero_usize("HOAX_RF_TREES", 300)?;
        let rf_threads = parse_optional_non_zero_usize("HOAX_RF_THREADS")?;
        let nb_alpha = parse_positive_f64("HOAX_NB_ALPHA", 1.0)?;

        let kompas_default_valid = parse_bool("HOAX_KOMPAS_DEFAULT_VALID", true)?;
        let log_format = parse_log_format("HOAX_LOG_FORMAT")?;

        Ok(Self {
            raw_dir,
            clean_dir,
            model_dir,
            normalize_workers,
            max_features,
            ngram_range,
            test_ratio,
            seed,
            rf_trees,
            rf_threads,
            nb_alpha,
            kompas_default_valid,
            log_format,
        })
    }

    /// CLI 引数で n-gram 範囲を上書きする。
    #[must_use]
    pub fn with_ngram_range(mut self, ngram_range: NgramRange) -> Self {
        self.ngram_range = ngram_range;
        self
    }

    #[must_use]
    pub fn raw_dir(&self) -> &PathBuf {
        &self.raw_dir
    }

    #[must_use]
    pub fn clean_dir(&self) -> &PathBuf {
        &self.clean_dir
    }

    #[must_use]
    pub fn model_dir(&self) -> &PathBuf {
        &self.model_dir
    }

    #[must_use]
    pub fn normalize_workers(&self) -> NonZeroUsize {
        self.normalize_workers
    }

    #[must_use]
    pub fn max_features(&self) -> NonZeroUsize {
        self.max_features
    }

    #[must_use]
    pub fn ngram_range(&self) -> NgramRange {
        self.ngram_range
    }

    #[must_use]
    pub fn test_ratio(&self) -> f64 {
        self.test_ratio
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn rf_trees(&self) -> NonZeroUsize {
        self.rf_trees
    }

    #[must_use]
    pub fn rf_threads(&self) -> Option<NonZeroUsize> {
        self.rf_threads
    }

    #[must_use]
    pub fn nb_alpha(&self) -> f64 {
        self.nb_alpha
    }

    #[must_use]
    pub fn kompas_default_valid(&self) -> bool {
        self.kompas_default_valid
    }

    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

fn parse_path(name: &'static str, default: &str) -> PathBuf {
    PathBuf::from(env::var(name).unwrap_or_else(|_| default.to_string()))
}

fn parse_non_zero_usize(name: &'static str, default: usize) -> Result<NonZeroUsize, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    let parsed = raw.parse::<usize>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })?;
    NonZeroUsize::new(parsed).ok_or_else(|| ConfigError::Invalid {
        name,
        source: anyhow::anyhow!("must be greater than zero"),
    })
}

fn parse_optional_non_zero_usize(name: &'static str) -> Result<Option<NonZeroUsize>, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            let parsed = raw.trim().parse::<usize>().map_err(|error| ConfigError::Invalid {
                name,
                source: anyhow::Error::new(error),
            })?;
            NonZeroUsize::new(parsed)
                .map(Some)
                .ok_or_else(|| ConfigError::Invalid {
                    name,
                    source: anyhow::anyhow!("must be greater than zero"),
                })
        }
        _ => Ok(None),
    }
}

fn parse_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<u64>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_f64(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<f64>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_ratio(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    let value = parse_f64(name, default)?;
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("value must be strictly between 0 and 1, got {value}"),
        })
    }
}

fn parse_positive_f64(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    let value = parse_f64(name, default)?;
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("value must be a positive number, got {value}"),
        })
    }
}

fn parse_bool(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("invalid boolean value: {raw}"),
        }),
    }
}

fn parse_ngram_range(name: &'static str, default: &str) -> Result<NgramRange, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    let bounds = raw
        .split(',')
        .map(|part| part.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| ConfigError::Invalid {
            name,
            source: anyhow::Error::new(error),
        })?;
    let [low, high] = bounds[..] else {
        return Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("expected `LOW,HIGH`, got {raw}"),
        });
    };
    NgramRange::new(low, high).map_err(|source| ConfigError::Invalid { name, source })
}

fn parse_log_format(name: &'static str) -> Result<LogFormat, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| "text".to_string());
    match raw.to_lowercase().as_str() {
        "text" | "pretty" | "" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        _ => Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("expected `text` or `json`, got {raw}"),
        }),
    }
}
