//! Face-encoder collaborator that turns an image into a descriptor.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::FaceDescriptor;

#[derive(Debug, Error)]
pub enum FaceEncoderError {
    #[error("Face encoder unavailable: {0}")]
    Unavailable(String),

    #[error("Face encoder returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Detects a face in an image and encodes it.
#[async_trait]
pub trait FaceEncoder: Send + Sync {
    /// Returns `Ok(None)` when no face was detected in the image.
    async fn encode(&self, image: &[u8]) -> Result<Option<FaceDescriptor>, FaceEncoderError>;
}
