pub mod api;
pub mod app;
pub mod chat;
pub mod cli;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod store;
pub mod web;

pub use api::innertube::get_live_chat;

// Re-export the main error types for convenience
pub use api::innertube::FetchError;
pub use chat::ChatError;
pub use ingest::IngestError;
pub use store::StoreError;

pub use api::youtube::VideoId;
pub use chat::{ChatItem, ChatSession, ChatSessionFactory, YouTubeChatFactory};
pub use config::{AppConfig, ConfigManager};
pub use ingest::{IngestConfig, IngestState, NameIngestor};
pub use store::{JsonFileStore, NameListStore, VideoIdStore};
