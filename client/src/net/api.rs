//! `gloo-net` transport for the session store.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR): not compiled; the store only exists in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Fetch failures (DNS, CORS, offline) map to `TransportError::Network` and
//! unreadable bodies to `TransportError::Decode`. Any HTTP status, including
//! 401, is a successful exchange and is interpreted by the store.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

#[cfg(feature = "hydrate")]
use session::api::body_from_text;
#[cfg(feature = "hydrate")]
use session::{ApiResponse, AuthApi, TransportError};

#[cfg(any(test, feature = "hydrate"))]
fn bearer_header(token: &str) -> String {
    format!("Bearer {token}")
}

#[cfg(any(test, feature = "hydrate"))]
fn endpoint_url(base_url: &str, path: &str) -> String {
    session::config::join_url(base_url, path)
}

/// Browser HTTP client bound to one backend base URL.
#[cfg(feature = "hydrate")]
pub struct GlooAuthApi {
    base_url: String,
}

#[cfg(feature = "hydrate")]
impl GlooAuthApi {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self { base_url: base_url.to_owned() }
    }
}

#[cfg(feature = "hydrate")]
#[async_trait::async_trait(?Send)]
impl AuthApi for GlooAuthApi {
    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
        bearer: Option<&str>,
    ) -> Result<ApiResponse, TransportError> {
        let url = endpoint_url(&self.base_url, path);
        let mut request = gloo_net::http::Request::get(&url).query(query.iter().copied());
        if let Some(token) = bearer {
            request = request.header("Authorization", &bearer_header(token));
        }
        let response = request.send().await.map_err(network_error)?;
        read_response(response).await
    }

    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, TransportError> {
        let url = endpoint_url(&self.base_url, path);
        let mut request = gloo_net::http::Request::post(&url);
        if let Some(token) = bearer {
            request = request.header("Authorization", &bearer_header(token));
        }
        let response = request
            .json(body)
            .map_err(network_error)?
            .send()
            .await
            .map_err(network_error)?;
        read_response(response).await
    }
}

#[cfg(feature = "hydrate")]
fn network_error(err: gloo_net::Error) -> TransportError {
    TransportError::Network(err.to_string())
}

#[cfg(feature = "hydrate")]
async fn read_response(response: gloo_net::http::Response) -> Result<ApiResponse, TransportError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|err| TransportError::Decode(err.to_string()))?;
    Ok(ApiResponse::new(status, body_from_text(&text)))
}
