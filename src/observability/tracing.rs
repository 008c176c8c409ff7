use std::sync::OnceLock;

use anyhow::{Error, Result};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;

/// 最初の初期化結果。以降の呼び出しはこれを共有する。
static TRACING_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Tracing サブスクライバを一度だけ初期化する。
///
/// フィルタは `RUST_LOG`（未設定時は `info`）で制御する。
/// ログは stderr に出力し、stdout は判定結果の表示に使う。
/// 並行に呼ばれても登録は一度だけ行われ、後続の呼び出しは最初の結果を返す。
///
/// # Errors
/// グローバルサブスクライバの登録に失敗した場合はエラーを返す。
pub fn init(format: LogFormat) -> Result<()> {
    TRACING_INIT
        .get_or_init(|| {
            install(format)?;
            debug!(?format, "tracing initialized");
            Ok(())
        })
        .clone()
        .map_err(Error::msg)
}

fn install(format: LogFormat) -> Result<(), String> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
    .map_err(|e| e.to_string())
}
