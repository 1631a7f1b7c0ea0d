//! ログ初期化

use crate::config::LogConfig;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// RUST_LOG があればそれを、なければ設定のログレベルを使う
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// ログを初期化する
///
/// ファイル出力が有効な場合、返されたガードはプロセス終了まで保持すること。
pub fn init_logging(config: &LogConfig, log_dir: &Path) -> anyhow::Result<Option<WorkerGuard>> {
    let (file_layer, guard) = if config.enable_file_logging {
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("chatroll")
            .filename_suffix("log")
            .max_log_files(config.max_log_files)
            .build(log_dir)?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_falls_back_on_invalid_level() {
        let config = LogConfig {
            log_level: "not a [valid directive".to_string(),
            ..LogConfig::default()
        };
        // パースに失敗してもパニックしない
        let _filter = env_filter(&config);
    }
}
