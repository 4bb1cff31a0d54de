//! SOP document rendering from static templates.
//!
//! Provides [`SopFields`] (the seven placeholder values), [`TemplateKind`]
//! (full or MVP layout) and [`render`], which substitutes `{{key}}`
//! placeholders. Templates come from a directory on disk when one is
//! configured, otherwise from the copies built into the binary.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub const DEFAULT_DOC_ID: &str = "SOP-000";
pub const DEFAULT_VERSION: &str = "v1.0";
pub const UNASSIGNED: &str = "Unassigned";

const BUILTIN_FULL: &str = include_str!("../assets/sop-template.md");
const BUILTIN_MVP: &str = include_str!("../assets/sop-mvp.md");

#[derive(Debug, Error)]
pub enum SopError {
    #[error("template file not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("failed to read template {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: std::io::Error },
}

/// Which template layout to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Full,
    Mvp,
}

impl TemplateKind {
    pub fn from_mvp_flag(mvp: bool) -> Self {
        if mvp { TemplateKind::Mvp } else { TemplateKind::Full }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            TemplateKind::Full => "sop-template.md",
            TemplateKind::Mvp => "sop-mvp.md",
        }
    }

    fn builtin(&self) -> &'static str {
        match self {
            TemplateKind::Full => BUILTIN_FULL,
            TemplateKind::Mvp => BUILTIN_MVP,
        }
    }
}

/// Values substituted into the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SopFields {
    pub title: String,
    pub doc_id: String,
    pub version: String,
    pub date: String,
    pub owner: String,
    pub reviewer: String,
    pub approver: String,
}

impl SopFields {
    /// Fields with every default applied; the date is today's local date.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            doc_id: DEFAULT_DOC_ID.to_string(),
            version: DEFAULT_VERSION.to_string(),
            date: today(),
            owner: UNASSIGNED.to_string(),
            reviewer: UNASSIGNED.to_string(),
            approver: UNASSIGNED.to_string(),
        }
    }

    /// `(placeholder, value)` pairs in substitution order.
    pub fn pairs(&self) -> [(&'static str, &str); 7] {
        [
            ("title", self.title.as_str()),
            ("doc_id", self.doc_id.as_str()),
            ("version", self.version.as_str()),
            ("date", self.date.as_str()),
            ("owner", self.owner.as_str()),
            ("reviewer", self.reviewer.as_str()),
            ("approver", self.approver.as_str()),
        ]
    }
}

pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Loads the template text for `kind`.
///
/// With `dir` set the file must exist there; otherwise the built-in copy is used.
pub fn load_template(kind: TemplateKind, dir: Option<&Path>) -> Result<String, SopError> {
    let Some(dir) = dir else {
        return Ok(kind.builtin().to_string());
    };

    let path = dir.join(kind.file_name());
    if !path.exists() {
        return Err(SopError::TemplateNotFound(path));
    }
    debug!(path = %path.display(), "loading template");
    fs::read_to_string(&path).map_err(|source| SopError::Read { path, source })
}

/// Replaces each `{{key}}` with its field value, one field at a time.
/// Unknown placeholders are left as they are.
pub fn render(template: &str, fields: &SopFields) -> String {
    fields
        .pairs()
        .iter()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{{{key}}}}}"), value)
        })
}

/// Where the rendered document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// `-` means standard output; anything else is a file path.
    pub fn parse(value: &str) -> Self {
        if value == "-" {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(PathBuf::from(value))
        }
    }

    pub fn write(&self, rendered: &str) -> Result<(), SopError> {
        match self {
            OutputTarget::Stdout => {
                println!("{rendered}");
                Ok(())
            }
            OutputTarget::File(path) => fs::write(path, rendered).map_err(|source| SopError::Write {
                path: path.clone(),
                source,
            }),
        }
    }
}
