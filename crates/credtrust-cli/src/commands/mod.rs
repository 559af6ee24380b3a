pub mod credential_status;
pub mod demo;
pub mod init;
pub mod issue;
pub mod issuers;
pub mod register;
pub mod revoke;
pub mod status;
pub mod verify;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// API endpoint a node listens on with the default config.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9101";

#[derive(Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub kind: Option<String>,
}

/// Turn a non-success response into an error carrying the node's message.
pub async fn failure(action: &str, resp: reqwest::Response) -> anyhow::Error {
    let status = resp.status();
    match resp.json::<ErrorResponse>().await {
        Ok(err) => match err.kind {
            Some(kind) => anyhow::anyhow!("{} failed (HTTP {}, {}): {}", action, status, kind, err.error),
            None => anyhow::anyhow!("{} failed (HTTP {}): {}", action, status, err.error),
        },
        Err(_) => anyhow::anyhow!("{} failed (HTTP {})", action, status),
    }
}

pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    endpoint: &str,
    path: &str,
    action: &str,
) -> anyhow::Result<T> {
    let url = format!("{}{}", endpoint.trim_end_matches('/'), path);
    tracing::debug!(%url, "GET");
    let resp = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("could not reach node at {}", endpoint))?;
    if !resp.status().is_success() {
        return Err(failure(action, resp).await);
    }
    Ok(resp.json().await?)
}

pub async fn post_json<B: Serialize, T: DeserializeOwned>(
    client: &reqwest::Client,
    endpoint: &str,
    path: &str,
    body: &B,
    action: &str,
) -> anyhow::Result<T> {
    let url = format!("{}{}", endpoint.trim_end_matches('/'), path);
    tracing::debug!(%url, "POST");
    let resp = client
        .post(&url)
        .json(body)
        .send()
        .await
        .with_context(|| format!("could not reach node at {}", endpoint))?;
    if !resp.status().is_success() {
        return Err(failure(action, resp).await);
    }
    Ok(resp.json().await?)
}
