//! Errors and non-fatal diagnostics

use pixfade_dom::{DomError, NodeId};
use pixfade_html::HtmlError;

/// Descriptor rejected at the data-model boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("Image dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    #[error("Unknown layout: {0}")]
    UnknownLayout(String),
}

/// Statically rendered markup that cannot be hydrated
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HydrationError {
    #[error("Node {0} is not an image wrapper")]
    NotAWrapper(NodeId),

    #[error("Image wrapper {0} has no placeholder")]
    MissingPlaceholder(NodeId),

    #[error("Image wrapper {0} has no main image")]
    MissingMainImage(NodeId),

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Crate-level error
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Invalid image descriptor: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("HTML error: {0}")]
    Html(#[from] HtmlError),

    #[error("Hydration failed: {0}")]
    Hydration(#[from] HydrationError),
}

/// Non-fatal problems reported to the caller instead of failing the render
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error("[pixfade] Missing image prop")]
    MissingImage,

    #[error("[pixfade] Invalid wrapper tag {0:?}, falling back to the default")]
    InvalidWrapperTag(String),

    #[error("[pixfade] Skipping image wrapper: {0}")]
    MalformedMarkup(HydrationError),
}
