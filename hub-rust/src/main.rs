use hub_llm::google::{GoogleModel, GoogleModelOptions};
use project_hub::{
    auth::TokenSigner,
    config::load_config,
    routes::{router, AppState},
    store::Store,
    Assistant, BoxedError, ReplyPolicy,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), BoxedError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = load_config()?;

    let client = reqwest::Client::builder()
        .timeout(config.model_timeout)
        .build()?;
    let model = GoogleModel::new(
        config.gemini_model.clone(),
        GoogleModelOptions {
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_base_url.clone(),
            client: Some(client),
            ..Default::default()
        },
    );

    let reply_policy = if config.strict_summary {
        ReplyPolicy::Strict
    } else {
        ReplyPolicy::Lenient
    };
    let assistant = Assistant::builder(Arc::new(model))
        .reply_policy(reply_policy)
        .build();

    let store = Store::open(&config.data_file).await?;
    tracing::info!(path = %store.path().display(), "data file loaded");

    let state = AppState {
        store: Arc::new(store),
        tokens: Arc::new(TokenSigner::new(
            config.jwt_secret.clone(),
            config.token_ttl_secs,
        )),
        assistant: Arc::new(assistant),
        password_hash_rounds: config.password_hash_rounds,
    };

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(
        port = config.port,
        model = %config.gemini_model,
        "server listening on http://localhost:{}",
        config.port
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
