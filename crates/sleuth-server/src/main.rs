mod configuration;
mod error;
mod routes;
mod sse;
mod state;

use std::sync::Arc;

use sleuth::backend::HttpChatBackend;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::configuration::Settings;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let settings = Settings::new()?;

    let backend = HttpChatBackend::new(
        settings.backend.url.clone(),
        settings.backend.api_key.clone(),
        settings.backend.model.clone(),
    );
    let state = AppState::new(Arc::new(backend));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(settings.server.socket_addr()?).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
