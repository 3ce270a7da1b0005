mod api;
mod jobs;
mod router;
mod state;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use augment_core::Config;
use augment_enrich::OpenAiEmbedder;
use augment_graph::Neo4jClient;
use augment_llm::{OpenAiProvider, Summarizer};

use crate::jobs::JobRegistry;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    augment_core::config::load_dotenv();
    let config = Config::from_env();
    config.log_summary();

    let store = Arc::new(Neo4jClient::new(&config.neo4j, config.run.fetch_limit));

    let provider = OpenAiProvider::from_config(&config.llm)?;
    let summarizer = Arc::new(Summarizer::with_config(Arc::new(provider), &config.llm));

    let embedder = Arc::new(OpenAiEmbedder::from_config(&config.llm, &config.embedding)?);

    let state = Arc::new(AppState {
        registry: JobRegistry::new(),
        store,
        summarizer,
        embedder,
        batch_size: config.run.batch_size,
    });

    let app = router::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
