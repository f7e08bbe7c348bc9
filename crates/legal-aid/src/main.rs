mod advisor;
mod api;
mod classifier;
mod config;
mod document;
mod error;
mod knowledge;
mod model;
mod parser;
mod prompt;
mod render;
mod resources;
mod server;
mod store;
mod templates;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use legal_common::gateway::{self, ModelGateway, Unconfigured};
use legal_common::redis::RedisCache;
use legal_common::retry::Retrying;

use config::Config;
use document::DocumentOutput;
use server::LegalAidServer;
use store::RecordStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting legal-aid MCP server");

    let config = Config::from_env()?;

    let (gateway, llm_configured) = match gateway::connect(config.backend) {
        Ok(gateway) => {
            info!(
                backend = %config.backend,
                model = gateway.model_label(),
                max_tokens = config.generation.max_tokens,
                temperature = config.generation.temperature,
                "model backend configured"
            );
            (gateway, true)
        }
        Err(e) => {
            warn!(error = %e, backend = %config.backend, "model backend unavailable, answers will use fallbacks");
            (Arc::new(Unconfigured::new(e.to_string())) as Arc<dyn ModelGateway>, false)
        }
    };
    let gateway: Arc<dyn ModelGateway> = if llm_configured && config.retry.max_retries > 0 {
        info!(max_retries = config.retry.max_retries, "retrying model requests");
        Arc::new(Retrying::new(gateway, config.retry))
    } else {
        gateway
    };

    let redis = RedisCache::new(config.redis_url.as_deref());
    if redis.is_available().await {
        info!("redis connected");
    } else {
        info!("redis unavailable, running without stored records");
    }
    let store = RecordStore::new(redis, config.record_ttl);

    info!(dir = %config.output_dir.display(), "documents will be written as plain text");
    let output = DocumentOutput::plain_text(config.output_dir.clone());

    let server = LegalAidServer::new(
        gateway,
        config.generation,
        store,
        output,
        config.backend,
        llm_configured,
    );

    info!("MCP server ready, serving on stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;

    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}
