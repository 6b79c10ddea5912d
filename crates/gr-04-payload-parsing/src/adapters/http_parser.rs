//! # HTTP Parser Client
//!
//! `POST {base}/vaa/parser` with the emitter coordinates and hex payload.
//!
//! | Response                  | Result              |
//! |---------------------------|---------------------|
//! | 200 with JSON body        | parsed              |
//! | 400, 404, 422             | `Unparseable`       |
//! | 5xx, other, bad JSON      | `InternalError`     |
//! | connect error / timeout   | `EndpointCallError` |

use crate::domain::entities::ParseResponse;
use crate::domain::errors::ParserError;
use crate::ports::outbound::PayloadParser;
use reqwest::StatusCode;
use serde::Serialize;
use shared_types::{ChainId, EmitterAddress};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParseRequest {
    emitter_chain_id: u16,
    emitter_address: String,
    sequence: String,
    payload: String,
}

#[derive(Debug, Clone)]
pub struct HttpPayloadParser {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPayloadParser {
    /// Client for the service at `base_url`; every call gives up after
    /// `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ParserError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ParserError::InternalError(format!("building HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/vaa/parser", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl PayloadParser for HttpPayloadParser {
    async fn parse(
        &self,
        chain: ChainId,
        emitter_address: &EmitterAddress,
        sequence: u64,
        payload: &[u8],
    ) -> Result<ParseResponse, ParserError> {
        let request = ParseRequest {
            emitter_chain_id: chain.0,
            emitter_address: emitter_address.to_hex(),
            sequence: sequence.to_string(),
            payload: hex::encode(payload),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ParserError::EndpointCallError(e.to_string()))?;

        let status = response.status();
        debug!(chain = %chain, sequence, status = status.as_u16(), "Parser responded");

        match status {
            StatusCode::OK => response
                .json::<ParseResponse>()
                .await
                .map_err(|e| ParserError::InternalError(format!("invalid parser response: {e}"))),
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
                let body = response.text().await.unwrap_or_default();
                Err(ParserError::Unparseable(format!("{status}: {body}")))
            }
            _ => Err(ParserError::InternalError(format!("parser returned {status}"))),
        }
    }
}
