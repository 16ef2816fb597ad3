//! Serve command - Run the HTTP API

use anyhow::Context;
use clap::Args;
use reviews_api::AppState;
use reviews_core::Config;
use tokio::net::TcpListener;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let bind = self.bind.as_deref().unwrap_or(&config.server.bind);

        let store = super::open_store(config).await?;
        let submissions = super::submission_handler(config, store)?;

        let listener = TcpListener::bind(bind)
            .await
            .with_context(|| format!("Failed to bind {}", bind))?;

        tracing::info!(
            bind = %bind,
            model = %config.completion.model,
            summary_period = config.synthesis.summary_period,
            keyword_period = config.synthesis.keyword_period,
            "Starting review server"
        );

        reviews_api::serve(listener, AppState::new(submissions)).await?;
        Ok(())
    }
}
