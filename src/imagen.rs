//! Generation Client - wraps the Imagen predict endpoint
//!
//! One POST per word: a single prompt with fixed sampling parameters, a
//! JSON response carrying one base64 image payload. Retry policy belongs
//! to the pipeline; this module only classifies a single call's outcome.

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const IMAGEN_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/imagen-3.0-generate-001:predict";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest error-body excerpt kept in failure reasons.
const ERROR_BODY_LIMIT: usize = 200;

/// Why a single generation call failed.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("response carried no image payload")]
    MissingPayload,

    #[error("image payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// The injectable generation capability. The pipeline is written against
/// this trait so tests can drive it with a deterministic stub.
#[async_trait]
pub trait ImageGenerator {
    /// Submit one prompt and return the raw image bytes.
    async fn generate(&self, prompt: &str, word: &str) -> Result<Vec<u8>, GenerateError>;
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<Instance<'a>>,
    parameters: Parameters<'a>,
}

#[derive(Debug, Serialize)]
struct Instance<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters<'a> {
    sample_count: u32,
    aspect_ratio: &'a str,
    safety_filter_level: &'a str,
    person_generation: &'a str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

/// The payload key differs between API revisions; either is accepted.
#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: Option<String>,
    image: Option<String>,
}

/// HTTP client for the Imagen endpoint.
pub struct ImagenClient {
    client: Client,
    api_key: String,
}

impl ImagenClient {
    pub fn new(api_key: String) -> Result<Self, GenerateError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl ImageGenerator for ImagenClient {
    async fn generate(&self, prompt: &str, word: &str) -> Result<Vec<u8>, GenerateError> {
        tracing::debug!("requesting image for '{}'", word);

        let request = PredictRequest {
            instances: vec![Instance { prompt }],
            parameters: Parameters {
                sample_count: 1,
                aspect_ratio: "1:1",
                safety_filter_level: "block_only_high",
                person_generation: "allow_adult",
            },
        };

        let response = self
            .client
            .post(IMAGEN_API_URL)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Api {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let parsed: PredictResponse = response.json().await?;
        let payload = parsed
            .predictions
            .into_iter()
            .next()
            .and_then(|p| p.bytes_base64_encoded.or(p.image))
            .ok_or(GenerateError::MissingPayload)?;

        Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
    }
}
