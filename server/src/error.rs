//! Start-up failures of the web host.

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
    #[error("leptos configuration: {0}")]
    LeptosConfig(String),
    #[error("failed to bind listener: {0}")]
    Bind(std::io::Error),
    #[error("server failed: {0}")]
    Serve(std::io::Error),
}
