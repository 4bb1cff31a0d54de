mod error;
mod image_node;
mod options;
pub mod registry;
mod tensor;

pub use error::NodeError;
pub use image_node::{GeminiImageNode, ImageNodeInputs, NodeOutput, NodeSettings};
pub use options::{AspectRatio, ImageSize};
pub use tensor::ImageTensor;
