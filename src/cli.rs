//! コマンドライン引数

use crate::config::AppConfig;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chatroll", version, about = "YouTube live chat name collector")]
pub struct Cli {
    /// 設定ファイルのパス（省略時はXDG設定ディレクトリ）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Webサーバーの待ち受けアドレス (例: 127.0.0.1:5000)
    #[arg(long)]
    pub listen: Option<SocketAddr>,

    /// データディレクトリ
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// ログレベル (trace/debug/info/warn/error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// 現在の設定を設定ファイルに書き出して終了
    #[arg(long)]
    pub init_config: bool,
}

impl Cli {
    /// CLI引数で設定を上書きする
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(listen) = self.listen {
            config.server.listen = listen;
        }
        if let Some(data_dir) = &self.data_dir {
            config.storage.data_dir = data_dir.clone();
        }
        if let Some(log_level) = &self.log_level {
            config.log.log_level = log_level.clone();
        }
    }
}
