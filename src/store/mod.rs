//! 設定値と名前リストの永続化
//!
//! Webハンドラと取り込みループの両方にトレイトとして注入される。
//! 実装はドキュメントごとにロックを持ち、読み込み→変更→書き込みを直列化する。

pub mod file_store;
pub mod json_file;

use crate::api::youtube::VideoId;
use thiserror::Error;

pub use file_store::{JsonFileStore, StorePaths};

/// 永続化エラー
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("File I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Blocking store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// ストア操作をブロッキング用スレッドで実行する
///
/// 非同期ハンドラからファイルI/Oを伴う呼び出しを行うときに使う。
pub async fn run_blocking<T, F>(f: F) -> StoreResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// 対象動画IDの保存先
pub trait VideoIdStore: Send + Sync {
    /// 未設定・削除済みなら `None`
    fn get_video_id(&self) -> Option<VideoId>;

    /// 既存の値を上書きする
    fn set_video_id(&self, video_id: &VideoId) -> StoreResult<()>;

    /// 動画IDだけを削除し、他の設定キーは残す
    fn delete_video_id(&self) -> StoreResult<()>;

    /// 保存値が `expected` のときだけ削除する。削除したら `true`
    ///
    /// 取り込みループが古いIDを消す際、その間に設定された新しいIDを
    /// 巻き込まないために使う。
    fn clear_video_id_if(&self, expected: &VideoId) -> StoreResult<bool>;
}

/// 名前リストとフォールバック用ランダム名プール
pub trait NameListStore: Send + Sync {
    /// 末尾に無条件で追加する（検証は呼び出し側の責任）
    fn add_name(&self, name: &str) -> StoreResult<()>;

    fn get_names(&self) -> Vec<String>;

    /// 完全一致するエントリをすべて削除する。存在しなくてもエラーにしない
    fn remove_name(&self, target: &str) -> StoreResult<()>;

    /// 手動管理されるランダム名プール。毎回読み直す
    fn random_names(&self) -> Vec<String>;
}
