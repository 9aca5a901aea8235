//! HTTP move service client

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::reply::{parse_body, RemoteMove};

#[derive(Debug, Serialize)]
struct MoveRequest<'a> {
    fen: &'a str,
    depth: u32,
}

pub struct HttpMoveProvider {
    client: Client,
    url: String,
    depth: u32,
}

impl HttpMoveProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent("Chess3D/1.0")
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Http(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: config.service_url.clone(),
            depth: config.depth,
        })
    }

    /// One POST of `{fen, depth}`; no retries.
    pub async fn request_move(&self, fen: &str) -> Result<RemoteMove, ProviderError> {
        debug!(url = %self.url, fen, depth = self.depth, "Requesting move");

        let resp = self
            .client
            .post(&self.url)
            .json(&MoveRequest { fen, depth: self.depth })
            .send()
            .await?;

        if !resp.status().is_success() {
            warn!(status = %resp.status(), "Move service refused request");
            return Err(ProviderError::Status(resp.status().as_u16()));
        }

        let text = resp.text().await?;
        let mv = parse_body(&text)?;
        debug!(from = %mv.from, to = %mv.to, "Move service replied");
        Ok(mv)
    }
}
