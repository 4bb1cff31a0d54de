//! Subcommand handlers.

use std::fs;

use tracing::debug;

use crate::cli::{ImageArgs, SopArgs};
use crate::config::PebbleConfig;
use crate::error::PebbleError;
use crate::node::{GeminiImageNode, ImageNodeInputs, ImageTensor, registry};
use crate::sop::{self, OutputTarget, SopFields, TemplateKind};
use crate::ui::GenerationProgress;

pub fn render_sop(args: SopArgs, config: &PebbleConfig) -> Result<(), PebbleError> {
    let kind = TemplateKind::from_mvp_flag(args.mvp);
    let templates_dir = args.templates_dir.as_deref().or(config.templates_dir.as_deref());
    let template = sop::load_template(kind, templates_dir)?;

    let mut fields = SopFields::new(args.title);
    let overrides = [
        (&mut fields.doc_id, args.doc_id),
        (&mut fields.version, args.doc_version),
        (&mut fields.date, args.date),
        (&mut fields.owner, args.owner),
        (&mut fields.reviewer, args.reviewer),
        (&mut fields.approver, args.approver),
    ];
    for (field, value) in overrides {
        if let Some(value) = value {
            *field = value;
        }
    }
    let rendered = sop::render(&template, &fields);

    OutputTarget::parse(&args.output).write(&rendered)?;
    Ok(())
}

pub async fn generate_image(args: ImageArgs, config: &PebbleConfig) -> Result<(), PebbleError> {
    let mut images = Vec::with_capacity(args.images.len());
    for path in &args.images {
        let bytes = fs::read(path).map_err(|source| PebbleError::Input {
            path: path.clone(),
            source,
        })?;
        let tensor = ImageTensor::decode(&bytes)?;
        debug!(path = %path.display(), shape = ?tensor.shape(), "loaded input image");
        images.push(tensor);
    }

    let api_key = args.api_key.unwrap_or_else(|| config.api_key.clone());
    let mut inputs = ImageNodeInputs::new(api_key, args.prompt);
    inputs.image_size = args.image_size;
    inputs.aspect_ratio = args.aspect_ratio;
    inputs.timeout_seconds = args.timeout_seconds.unwrap_or(config.timeout_seconds);
    inputs.retry_times = args.retry_times.unwrap_or(config.retry_times);
    inputs.images = images;

    let node = GeminiImageNode::new(config.node_settings());
    let progress = GenerationProgress::start(&inputs.prompt);
    let result = node
        .generate_observed(&inputs, |attempt, max, outcome| progress.attempt(attempt, max, outcome))
        .await;

    let output = match result {
        Ok(output) => output,
        Err(err) => {
            progress.abandon();
            return Err(err.into());
        }
    };

    let png = output.image.to_png()?;
    fs::write(&args.output, png).map_err(|source| PebbleError::Output {
        path: args.output.clone(),
        source,
    })?;
    progress.complete(&args.output, &output);
    if !output.text.is_empty() {
        println!("{}", output.text);
    }
    Ok(())
}

/// Prints every registered node, or only `class_type` when given.
pub fn list_nodes(class_type: Option<&str>) -> Result<(), PebbleError> {
    let json = match class_type {
        Some(name) => {
            let node = registry::find(name).ok_or_else(|| PebbleError::UnknownNode(name.to_string()))?;
            serde_json::to_string_pretty(&node)?
        }
        None => serde_json::to_string_pretty(&registry::registered_nodes())?,
    };
    println!("{json}");
    Ok(())
}
