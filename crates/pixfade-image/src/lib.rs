//! pixfade Image
//!
//! Responsive, layout-stable images:
//! - Layout calculation (fixed, fluid, constrained)
//! - Responsive source sets
//! - Placeholder with opacity cross-fade
//! - Lazy loading driven by intersection observation
//! - Hydration of statically rendered markup

mod descriptor;
mod error;

pub mod config;
pub mod hydrate;
pub mod layout;
pub mod main_image;
pub mod placeholder;
pub mod render;
pub mod runtime;
pub mod sources;
pub mod state;
pub mod style;

pub use config::{Easing, FadeTransition, HydrationConfig, RenderConfig, RenderMode};
pub use descriptor::{Dimensions, ImageDescriptor, ImageSet, Layout, Sizing, SourceCandidate};
pub use error::{DescriptorError, Diagnostic, HydrationError, ImageError};
pub use hydrate::{HydratedImage, HydrationTargets, NeverComplete, ResourceProbe, locate_targets};
pub use layout::{WrapperGeometry, compute_wrapper_style};
pub use render::{Alt, ImageProps, Rendered, RenderedHtml, render, render_to_string};
pub use runtime::ImageRuntime;
pub use sources::normalize_srcset;
pub use state::{LoadHandle, LoadMachine, LoadOutcome, LoadPolicy, LoadState, Transition};
pub use style::Style;

/// Marker attributes identifying structural nodes for hydration
pub mod markers {
    /// Outer wrapper
    pub const WRAPPER: &str = "data-image-wrapper";
    pub const PLACEHOLDER: &str = "data-placeholder-image";
    /// Main image rendered on the server and not yet hydrated
    pub const SERVER_RENDERED: &str = "data-image-ssr";
    pub const MAIN_IMAGE: &str = "data-main-image";
    /// Inert fallback `src` while the image is idle
    pub const DEFERRED_SRC: &str = "data-src";
    pub const DEFERRED_SRCSET: &str = "data-srcset";
}
