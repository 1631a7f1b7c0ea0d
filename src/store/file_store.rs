//! データディレクトリ配下のJSONファイルによるストア実装

use super::json_file::{load_json_or_default, save_json};
use super::{NameListStore, StoreResult, VideoIdStore};
use crate::api::youtube::VideoId;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const VIDEO_ID_KEY: &str = "video_id";

/// 3つのJSONドキュメントの配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub names: PathBuf,
    pub random_names: PathBuf,
    pub config: PathBuf,
}

impl StorePaths {
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            names: data_dir.join("names.json"),
            random_names: data_dir.join("random_names.json"),
            config: data_dir.join("config.json"),
        }
    }
}

/// JSONファイルストア
///
/// 名前リストと設定はそれぞれ専用のロックで保護される。
/// ランダム名プールは読み取り専用なのでロックしない。
#[derive(Debug)]
pub struct JsonFileStore {
    paths: StorePaths,
    names_lock: Mutex<()>,
    config_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(paths: StorePaths) -> Self {
        Self {
            paths,
            names_lock: Mutex::new(()),
            config_lock: Mutex::new(()),
        }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(StorePaths::in_dir(data_dir))
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    fn load_config(&self) -> Map<String, Value> {
        load_json_or_default(&self.paths.config)
    }
}

impl VideoIdStore for JsonFileStore {
    fn get_video_id(&self) -> Option<VideoId> {
        let _guard = self.config_lock.lock();
        stored_video_id(&self.load_config())
    }

    fn set_video_id(&self, video_id: &VideoId) -> StoreResult<()> {
        let _guard = self.config_lock.lock();
        let mut config = self.load_config();
        config.insert(
            VIDEO_ID_KEY.to_string(),
            Value::String(video_id.as_str().to_string()),
        );
        save_json(&self.paths.config, &config)?;
        info!("🎬 Video ID set: {}", video_id);
        Ok(())
    }

    fn delete_video_id(&self) -> StoreResult<()> {
        let _guard = self.config_lock.lock();
        let mut config = self.load_config();
        if config.remove(VIDEO_ID_KEY).is_some() {
            save_json(&self.paths.config, &config)?;
            info!("🗑️ Video ID cleared");
        }
        Ok(())
    }

    fn clear_video_id_if(&self, expected: &VideoId) -> StoreResult<bool> {
        let _guard = self.config_lock.lock();
        let mut config = self.load_config();
        if stored_video_id(&config).as_ref() != Some(expected) {
            return Ok(false);
        }
        config.remove(VIDEO_ID_KEY);
        save_json(&self.paths.config, &config)?;
        info!("🗑️ Video ID {} cleared", expected);
        Ok(true)
    }
}

fn stored_video_id(config: &Map<String, Value>) -> Option<VideoId> {
    config
        .get(VIDEO_ID_KEY)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(VideoId::from)
}

impl NameListStore for JsonFileStore {
    fn add_name(&self, name: &str) -> StoreResult<()> {
        let _guard = self.names_lock.lock();
        let mut names: Vec<String> = load_json_or_default(&self.paths.names);
        names.push(name.to_string());
        save_json(&self.paths.names, &names)?;
        debug!("➕ Name added: {} (total {})", name, names.len());
        Ok(())
    }

    fn get_names(&self) -> Vec<String> {
        let _guard = self.names_lock.lock();
        load_json_or_default(&self.paths.names)
    }

    fn remove_name(&self, target: &str) -> StoreResult<()> {
        let _guard = self.names_lock.lock();
        let mut names: Vec<String> = load_json_or_default(&self.paths.names);
        let before = names.len();
        names.retain(|name| name != target);
        save_json(&self.paths.names, &names)?;
        debug!("➖ Removed {} entries of {}", before - names.len(), target);
        Ok(())
    }

    fn random_names(&self) -> Vec<String> {
        load_json_or_default(&self.paths.random_names)
    }
}
