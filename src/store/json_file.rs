//! JSONドキュメントの読み書きヘルパー

use super::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::warn;

/// JSONファイルを読み込む。存在しない・壊れている場合はデフォルト値
pub fn load_json_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return T::default(),
        Err(e) => {
            warn!("⚠️ Failed to read {}: {}, using default", path.display(), e);
            return T::default();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!("⚠️ Malformed JSON in {}: {}, using default", path.display(), e);
        T::default()
    })
}

/// 一時ファイルに書いてからリネームすることで、書きかけの状態を残さない
pub fn save_json<T>(path: &Path, data: &T) -> StoreResult<()>
where
    T: Serialize + ?Sized,
{
    let io_err = |source| StoreError::Io {
        path: path.display().to_string(),
        source,
    };

    let content = serde_json::to_string(data)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    fs::write(tmp_path, content).map_err(io_err)?;
    fs::rename(tmp_path, path).map_err(io_err)?;
    Ok(())
}
