//! `reqwest` transport for the session store.
//!
//! ERROR HANDLING
//! ==============
//! Connection and body-read failures become `TransportError`; every HTTP
//! status is returned as an `ApiResponse` for the store to interpret.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use serde_json::Value;
use session::api::body_from_text;
use session::config::join_url;
use session::{ApiResponse, AuthApi, TransportError};

pub struct ReqwestAuthApi {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestAuthApi {
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("streampay-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base_url: base_url.to_owned() })
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

#[async_trait::async_trait(?Send)]
impl AuthApi for ReqwestAuthApi {
    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
        bearer: Option<&str>,
    ) -> Result<ApiResponse, TransportError> {
        let request = with_bearer(self.client.get(self.url(path)).query(query), bearer);
        tracing::debug!(path, "GET");
        read_response(request.send().await.map_err(network_error)?).await
    }

    async fn post_json(&self, path: &str, body: &Value, bearer: Option<&str>) -> Result<ApiResponse, TransportError> {
        let request = with_bearer(self.client.post(self.url(path)).json(body), bearer);
        tracing::debug!(path, "POST");
        read_response(request.send().await.map_err(network_error)?).await
    }
}

fn with_bearer(request: reqwest::RequestBuilder, bearer: Option<&str>) -> reqwest::RequestBuilder {
    match bearer {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

fn network_error(err: reqwest::Error) -> TransportError {
    TransportError::Network(describe(&err))
}

/// Flatten an error and its sources into one line.
fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

async fn read_response(response: reqwest::Response) -> Result<ApiResponse, TransportError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|err| TransportError::Decode(describe(&err)))?;
    Ok(ApiResponse::new(status, body_from_text(&text)))
}
