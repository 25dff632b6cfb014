mod error;
mod routes;

use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = routes::port_from(std::env::var("PORT").ok().as_deref())?;
    let app = routes::app()?;
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(ServerError::Bind)?;

    tracing::info!(%port, "streampay web listening");
    axum::serve(listener, app).await.map_err(ServerError::Serve)
}
