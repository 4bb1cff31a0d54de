use thiserror::Error;

use crate::gemini::GeminiError;
use crate::retry::PolicyError;

/// Failures of the image node, from input validation to response decoding.
///
/// [`Rejected`](NodeError::Rejected) and [`Unavailable`](NodeError::Unavailable)
/// are kept apart: the first means the API refused the request, the second
/// that it never answered usefully within the retry budget.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("API key must not be empty")]
    MissingApiKey,

    #[error("a prompt or at least one input image is required")]
    EmptyInput,

    #[error("at most {max} input images are supported, got {count}")]
    TooManyImages { count: usize, max: usize },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("invalid image tensor: {width}x{height} with {len} values")]
    TensorShape { width: u32, height: u32, len: usize },

    #[error("failed to build API client: {0}")]
    Client(#[source] GeminiError),

    #[error("request rejected on attempt {attempt}: {source}")]
    Rejected { attempt: u32, source: GeminiError },

    #[error("service unavailable after {attempts} attempts; last error: {last}")]
    Unavailable { attempts: u32, last: String },

    #[error("response contained no content parts: {0}")]
    NoContent(String),

    #[error("response contained text but no image")]
    NoImage,

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid base64 image data: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("invalid retry settings: {0}")]
    Policy(#[from] PolicyError),
}

impl NodeError {
    /// True when the retry budget ran out rather than the request being refused.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, NodeError::Unavailable { .. })
    }
}
