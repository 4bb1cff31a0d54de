//! Descriptors the host uses to list and wire nodes.
//!
//! Mirrors the host's class/display-name mappings: each node advertises its
//! class type, menu category, entry function, return types and inputs.

use serde::Serialize;

use super::image_node::{
    DEFAULT_PROMPT, DEFAULT_RETRY_TIMES, DEFAULT_TIMEOUT_SECONDS, GeminiImageNode, MAX_INPUT_IMAGES,
    RETRY_TIMES_RANGE, TIMEOUT_SECONDS_RANGE,
};
use super::options::{AspectRatio, ImageSize};

/// Widget type and constraints of one node input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum InputKind {
    String { default: String, multiline: bool },
    Int { default: u64, min: u64, max: u64 },
    #[serde(rename = "COMBO")]
    Choice { options: Vec<String>, default: String },
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: InputKind,
}

impl InputSpec {
    fn new(name: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeDescriptor {
    pub class_type: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    pub function: &'static str,
    pub return_types: Vec<&'static str>,
    pub required: Vec<InputSpec>,
    pub optional: Vec<InputSpec>,
}

/// Every node this crate provides.
pub fn registered_nodes() -> Vec<NodeDescriptor> {
    vec![gemini_image_node()]
}

pub fn find(class_type: &str) -> Option<NodeDescriptor> {
    registered_nodes().into_iter().find(|n| n.class_type == class_type)
}

fn gemini_image_node() -> NodeDescriptor {
    let required = vec![
        InputSpec::new(
            "api_key",
            InputKind::String {
                default: String::new(),
                multiline: false,
            },
        ),
        InputSpec::new(
            "prompt",
            InputKind::String {
                default: DEFAULT_PROMPT.to_string(),
                multiline: true,
            },
        ),
        InputSpec::new(
            "image_size",
            InputKind::Choice {
                options: ImageSize::ALL.iter().map(ToString::to_string).collect(),
                default: ImageSize::default().to_string(),
            },
        ),
        InputSpec::new(
            "aspect_ratio",
            InputKind::Choice {
                options: AspectRatio::choices(),
                default: AspectRatio::default().to_string(),
            },
        ),
        InputSpec::new(
            "timeout_seconds",
            InputKind::Int {
                default: DEFAULT_TIMEOUT_SECONDS,
                min: *TIMEOUT_SECONDS_RANGE.start(),
                max: *TIMEOUT_SECONDS_RANGE.end(),
            },
        ),
        InputSpec::new(
            "retry_times",
            InputKind::Int {
                default: u64::from(DEFAULT_RETRY_TIMES),
                min: u64::from(*RETRY_TIMES_RANGE.start()),
                max: u64::from(*RETRY_TIMES_RANGE.end()),
            },
        ),
    ];

    let optional = (1..=MAX_INPUT_IMAGES)
        .map(|i| InputSpec::new(format!("image_{i:02}"), InputKind::Image))
        .collect();

    NodeDescriptor {
        class_type: GeminiImageNode::CLASS_TYPE,
        display_name: GeminiImageNode::DISPLAY_NAME,
        category: GeminiImageNode::CATEGORY,
        function: "generate",
        return_types: vec!["IMAGE", "STRING"],
        required,
        optional,
    }
}
