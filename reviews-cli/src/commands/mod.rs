//! CLI command implementations

pub mod product;
pub mod review;
pub mod secrets;
pub mod serve;
pub mod shop;

pub use product::ProductArgs;
pub use review::ReviewArgs;
pub use secrets::SecretsArgs;
pub use serve::ServeArgs;
pub use shop::ShopArgs;

use std::sync::Arc;

use anyhow::Context;
use reviews_core::{Config, Secrets, SubmissionHandler, SynthesisCoordinator};
use reviews_db::{Database, SqliteReviewStore};
use reviews_llm::AnthropicClient;

/// Open the configured database, applying the schema
pub(crate) async fn open_store(config: &Config) -> anyhow::Result<Arc<SqliteReviewStore>> {
    let db = Database::connect(&config.database)
        .await
        .with_context(|| format!("Failed to open {}", config.database.path.display()))?;
    db.migrate().await?;
    Ok(Arc::new(SqliteReviewStore::new(db)))
}

/// Wire the submission pipeline to the completion API
pub(crate) fn submission_handler(
    config: &Config,
    store: Arc<SqliteReviewStore>,
) -> anyhow::Result<SubmissionHandler> {
    let secrets = Secrets::load()?;
    let client = AnthropicClient::from_secrets(&config.completion, &secrets)?;

    let coordinator = SynthesisCoordinator::new(store.clone(), Arc::new(client), &config.synthesis);
    Ok(SubmissionHandler::new(store, coordinator, &config.synthesis))
}
