//! The Gemini image-generation node.
//!
//! [`GeminiImageNode::generate_observed`] turns the node's inputs into a
//! `generateContent` request, runs it under the bounded retry controller and
//! converts the reply back into an [`ImageTensor`] plus the response text.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use super::error::NodeError;
use super::options::{AspectRatio, ImageSize};
use super::tensor::ImageTensor;
use crate::gemini::client::{API_BASE_URL, DEFAULT_MODEL};
use crate::gemini::{
    Content, ContentGenerator, GeminiClient, GeminiError, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, ImageConfig, Part,
};
use crate::retry::{AttemptOutcome, RetryController, RetryError, RetryPolicy};

pub const MAX_INPUT_IMAGES: usize = 14;
pub const TIMEOUT_SECONDS_RANGE: RangeInclusive<u64> = 10..=600;
pub const RETRY_TIMES_RANGE: RangeInclusive<u32> = 1..=20;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
pub const DEFAULT_RETRY_TIMES: u32 = 6;
pub const DEFAULT_PROMPT: &str = "Describe your image...";
const MAX_OUTPUT_TOKENS: u32 = 2048;
const RESPONSE_MODALITIES: [&str; 2] = ["IMAGE", "TEXT"];

/// Per-invocation inputs, as wired in the host graph.
#[derive(Debug, Clone)]
pub struct ImageNodeInputs {
    pub api_key: String,
    pub prompt: String,
    pub image_size: ImageSize,
    pub aspect_ratio: AspectRatio,
    pub timeout_seconds: u64,
    pub retry_times: u32,
    /// Connected `image_01`..`image_14` slots, in slot order.
    pub images: Vec<ImageTensor>,
}

impl ImageNodeInputs {
    pub fn new(api_key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            prompt: prompt.into(),
            image_size: ImageSize::default(),
            aspect_ratio: AspectRatio::default(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            retry_times: DEFAULT_RETRY_TIMES,
            images: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        if !TIMEOUT_SECONDS_RANGE.contains(&self.timeout_seconds) {
            return Err(NodeError::OutOfRange {
                field: "timeout_seconds",
                value: self.timeout_seconds,
                min: *TIMEOUT_SECONDS_RANGE.start(),
                max: *TIMEOUT_SECONDS_RANGE.end(),
            });
        }
        if !RETRY_TIMES_RANGE.contains(&self.retry_times) {
            return Err(NodeError::OutOfRange {
                field: "retry_times",
                value: u64::from(self.retry_times),
                min: u64::from(*RETRY_TIMES_RANGE.start()),
                max: u64::from(*RETRY_TIMES_RANGE.end()),
            });
        }
        if self.images.len() > MAX_INPUT_IMAGES {
            return Err(NodeError::TooManyImages {
                count: self.images.len(),
                max: MAX_INPUT_IMAGES,
            });
        }
        Ok(())
    }
}

/// The node's `(IMAGE, STRING)` result.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOutput {
    pub image: ImageTensor,
    pub text: String,
}

/// Settings that come from configuration rather than the graph.
#[derive(Debug, Clone)]
pub struct NodeSettings {
    pub base_url: String,
    pub model: String,
    pub retry_backoff: Duration,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            retry_backoff: crate::retry::DEFAULT_RETRY_BACKOFF,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeminiImageNode {
    settings: NodeSettings,
}

impl GeminiImageNode {
    pub const CLASS_TYPE: &'static str = "Gemini3ImageNode";
    pub const DISPLAY_NAME: &'static str = "Gemini 3 Pro Image Preview (API Key)";
    pub const CATEGORY: &'static str = "Gemini3";

    pub fn new(settings: NodeSettings) -> Self {
        Self { settings }
    }

    /// Builds a client from the inputs' API key and runs the generation,
    /// reporting each attempt as `(attempt, max_attempts, outcome)`.
    pub async fn generate_observed<O>(&self, inputs: &ImageNodeInputs, observe: O) -> Result<NodeOutput, NodeError>
    where
        O: FnMut(u32, u32, &AttemptOutcome<GenerateContentResponse, GeminiError>),
    {
        let api_key = inputs.api_key.trim();
        if api_key.is_empty() {
            return Err(NodeError::MissingApiKey);
        }
        let client = GeminiClient::with_base_url(
            api_key.to_string(),
            self.settings.base_url.clone(),
            self.settings.model.clone(),
        )
        .map_err(NodeError::Client)?;

        self.generate_with(Arc::new(client), inputs, observe).await
    }

    pub async fn generate_with<C, O>(
        &self,
        client: Arc<C>,
        inputs: &ImageNodeInputs,
        mut observe: O,
    ) -> Result<NodeOutput, NodeError>
    where
        C: ContentGenerator,
        O: FnMut(u32, u32, &AttemptOutcome<GenerateContentResponse, GeminiError>),
    {
        inputs.validate()?;
        let request = Arc::new(build_request(inputs)?);
        let policy = RetryPolicy::new(inputs.retry_times, Duration::from_secs(inputs.timeout_seconds))?
            .with_backoff(self.settings.retry_backoff);
        let max_attempts = policy.max_attempts();
        let backoff_ms = policy.retry_backoff().as_millis() as u64;
        let mut controller = RetryController::new(policy).observe(
            |attempt: u32, outcome: &AttemptOutcome<GenerateContentResponse, GeminiError>| {
                observe(attempt, max_attempts, outcome)
            },
        );

        let span = info_span!(
            "generate",
            request_id = %Uuid::new_v4(),
            images = inputs.images.len(),
            size = %inputs.image_size,
            aspect = %inputs.aspect_ratio,
        );

        async move {
            info!(max_attempts, timeout_s = inputs.timeout_seconds, backoff_ms, "requesting image");
            let work = |token: CancellationToken| {
                let client = Arc::clone(&client);
                let request = Arc::clone(&request);
                async move {
                    tokio::select! {
                        result = client.generate_content(&request) => result,
                        () = token.cancelled() => Err(GeminiError::Cancelled),
                    }
                }
            };

            let response = controller.execute_retryable(work).await.map_err(|err| {
                info!(attempts = err.attempts(), exhausted = err.is_exhausted(), error = %err, "generation failed");
                match err {
                    RetryError::Fatal { attempt, cause } => NodeError::Rejected { attempt, source: cause },
                    RetryError::Exhausted { attempts, last } => NodeError::Unavailable {
                        attempts,
                        last: last.to_string(),
                    },
                }
            })?;

            let output = parse_response(&response)?;
            info!(
                width = output.image.width(),
                height = output.image.height(),
                text_len = output.text.len(),
                "image generated"
            );
            Ok::<_, NodeError>(output)
        }
        .instrument(span)
        .await
    }
}

fn build_request(inputs: &ImageNodeInputs) -> Result<GenerateContentRequest, NodeError> {
    let mut parts = Vec::with_capacity(inputs.images.len() + 1);
    for image in &inputs.images {
        parts.push(Part::png(&image.to_png()?));
    }
    if !inputs.prompt.trim().is_empty() {
        parts.push(Part::text(inputs.prompt.clone()));
    }
    if parts.is_empty() {
        return Err(NodeError::EmptyInput);
    }

    Ok(GenerateContentRequest {
        contents: vec![Content::user(parts)],
        generation_config: GenerationConfig {
            response_modalities: RESPONSE_MODALITIES.iter().map(|m| m.to_string()).collect(),
            max_output_tokens: MAX_OUTPUT_TOKENS,
            image_config: ImageConfig {
                image_size: inputs.image_size.to_string(),
                aspect_ratio: inputs.aspect_ratio.api_value(),
            },
        },
    })
}

/// Takes the last inline image and joins every text part, one per line.
fn parse_response(response: &GenerateContentResponse) -> Result<NodeOutput, NodeError> {
    let parts = response.parts();
    if parts.is_empty() {
        return Err(NodeError::NoContent(serde_json::to_string(response).unwrap_or_default()));
    }

    let mut image = None;
    let mut text = String::new();
    for part in parts {
        if let Some(blob) = &part.inline_data {
            image = Some(ImageTensor::decode(&blob.decode()?)?);
        }
        if let Some(t) = part.text.as_deref().filter(|t| !t.is_empty()) {
            text.push_str(t);
            text.push('\n');
        }
    }

    let image = image.ok_or(NodeError::NoImage)?;
    Ok(NodeOutput {
        image,
        text: text.trim().to_string(),
    })
}
