//! HTTP client for an external face-detection/encoding service.
//!
//! The service receives `{"image_base64": "..."}` and answers with
//! `{"descriptor": [f32; N]}` or `{"descriptor": null}` when no face was found.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use domain::models::FaceDescriptor;
use domain::services::{FaceEncoder, FaceEncoderError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::FaceConfig;

#[derive(Debug, Serialize)]
struct EncodeRequest {
    image_base64: String,
}

#[derive(Debug, Deserialize)]
struct EncodeResponse {
    descriptor: Option<Vec<f32>>,
}

/// Face encoder backed by a remote HTTP service.
pub struct RemoteFaceEncoder {
    client: Client,
    url: String,
    descriptor_length: usize,
    timeout_ms: u64,
}

impl RemoteFaceEncoder {
    pub fn new(config: &FaceConfig) -> Result<Self, FaceEncoderError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.encoder_timeout_ms))
            .build()
            .map_err(|e| FaceEncoderError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            url: config.encoder_url.clone(),
            descriptor_length: config.descriptor_length,
            timeout_ms: config.encoder_timeout_ms,
        })
    }

    fn parse(&self, response: EncodeResponse) -> Result<Option<FaceDescriptor>, FaceEncoderError> {
        match response.descriptor {
            None => Ok(None),
            Some(values) => FaceDescriptor::new(values, self.descriptor_length)
                .map(Some)
                .map_err(|e| FaceEncoderError::InvalidResponse(e.to_string())),
        }
    }
}

#[async_trait]
impl FaceEncoder for RemoteFaceEncoder {
    async fn encode(&self, image: &[u8]) -> Result<Option<FaceDescriptor>, FaceEncoderError> {
        let body = EncodeRequest {
            image_base64: STANDARD.encode(image),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FaceEncoderError::Unavailable(format!("timeout after {}ms", self.timeout_ms))
                } else {
                    FaceEncoderError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Face encoder returned an error status");
            return Err(FaceEncoderError::Unavailable(format!("status {}", status)));
        }

        let parsed: EncodeResponse = response
            .json()
            .await
            .map_err(|e| FaceEncoderError::InvalidResponse(e.to_string()))?;

        let descriptor = self.parse(parsed)?;
        debug!(face_detected = descriptor.is_some(), "Face encoder responded");
        Ok(descriptor)
    }
}
