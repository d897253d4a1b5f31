use crate::config::AppConfig;
use crate::services::storage::LocalDocumentStore;
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &AppConfig) -> anyhow::Result<Arc<LocalDocumentStore>> {
    info!("🗄️  Document store: {}", config.media_root);

    tokio::fs::create_dir_all(&config.media_root).await?;

    Ok(Arc::new(LocalDocumentStore::new(config.media_root.clone())))
}
