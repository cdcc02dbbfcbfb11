pub mod handlers;
pub mod types;

use crate::{
    Result,
    config::Config,
    credential::{self, SharedCredential},
    generation::{PostGenerator, PromptTemplate},
    llm::create_llm_client,
};
use axum::{
    Router,
    routing::{get, post},
};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/posts", post(handlers::generate))
        .route("/api/posts/regenerate", post(handlers::regenerate))
        .route("/api/posts/latest", get(handlers::latest))
        .route(
            "/api/credential",
            get(handlers::credential_status)
                .put(handlers::activate_credential)
                .delete(handlers::deactivate_credential),
        )
        .route("/health", get(handlers::health))
        .with_state(state)
}

pub async fn build_state(config: &Config) -> Result<AppState> {
    let credential = Arc::new(SharedCredential::new(credential::from_config(&config.llm)));
    let client = create_llm_client(&config.llm, credential.clone())?;

    let template = match &config.prompt.template_path {
        Some(path) => {
            info!("Loading prompt template from {}", path);
            PromptTemplate::from_file(path).await?
        }
        None => PromptTemplate::builtin()?,
    };

    let generator = PostGenerator::new(client, template).with_temperature(config.llm.temperature);

    Ok(AppState::new(generator, credential))
}

pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config).await?;

    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
