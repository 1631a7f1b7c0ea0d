//! コンポーネントの組み立てと起動

use crate::chat::{ChatSessionFactory, YouTubeChatFactory};
use crate::config::AppConfig;
use crate::ingest::NameIngestor;
use crate::store::JsonFileStore;
use crate::web::{self, WebState};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Webサーバーを起動し、動画IDの設定を待ってから取り込みループを永久に回す
pub async fn run(config: AppConfig) -> Result<()> {
    let data_dir = &config.storage.data_dir;
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    info!("📂 Data directory: {}", data_dir.display());

    let store = Arc::new(JsonFileStore::in_dir(data_dir));

    let (addr, server) = web::bind(
        WebState::new(store.clone(), store.clone()),
        config.server.listen,
    )
    .with_context(|| format!("Failed to bind web server to {}", config.server.listen))?;
    tokio::spawn(server);
    info!("🌐 Web server listening on http://{}", addr);

    let factory: Arc<dyn ChatSessionFactory> = Arc::new(
        YouTubeChatFactory::new(&config.youtube.http_settings())
            .context("Failed to build HTTP client")?,
    );
    let ingestor = NameIngestor::new(factory, store.clone(), store, config.ingest.clone());

    let video_id = ingestor.wait_for_video_id().await;
    info!("🎬 Video ID configured: {}", video_id);

    ingestor.run().await;
    Ok(())
}
