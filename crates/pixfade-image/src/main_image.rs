//! Main image rendering

use pixfade_dom::{DomError, DomTree, NodeId};

use crate::config::RenderMode;
use crate::markers;
use crate::sources::SourceSet;
use crate::state::{LoadPolicy, LoadState};
use crate::style::Style;
use crate::ImageDescriptor;

/// Attributes the renderer owns; caller extras may not replace them
const RESERVED_ATTRS: &[&str] = &[
    "alt",
    "decoding",
    "loading",
    "sizes",
    "src",
    "srcset",
    "style",
    markers::SERVER_RENDERED,
    markers::MAIN_IMAGE,
    markers::DEFERRED_SRC,
    markers::DEFERRED_SRCSET,
];

/// Per-render inputs of the main image
#[derive(Debug, Clone, Copy)]
pub struct MainImageOptions<'a> {
    pub alt: &'a str,
    pub loading: LoadPolicy,
    pub state: LoadState,
    pub mode: RenderMode,
    pub extra_attrs: &'a [(String, String)],
}

pub fn main_image_style(loaded: bool) -> Style {
    Style::new().with("opacity", if loaded { "1" } else { "0" })
}

/// Render the main image into `parent`, returning the `<img>`
///
/// While `Idle` the fallback goes into `data-src`/`data-srcset` so no
/// request starts. `<source>` elements are emitted as-is; the `loading`
/// attribute on the `<img>` governs them.
pub fn render_main_image(
    tree: &mut DomTree,
    parent: NodeId,
    image: &ImageDescriptor,
    opts: MainImageOptions<'_>,
) -> Result<NodeId, DomError> {
    let sizes = image.sizes.as_deref().filter(|s| !s.is_empty());
    let set = SourceSet::build(&image.images);

    let container = if set.has_sources() {
        let picture = tree.create_element("picture");
        for source in &set.sources {
            source.render(tree, picture)?;
        }
        tree.append_child(parent, picture)?;
        picture
    } else {
        parent
    };

    let img = tree.create_element("img");
    tree.set_attr(img, "alt", opts.alt)?;
    if opts.mode == RenderMode::Server {
        tree.set_attr(img, markers::SERVER_RENDERED, "")?;
    }
    tree.set_attr(img, markers::MAIN_IMAGE, "")?;
    tree.set_attr(img, "decoding", "async")?;
    tree.set_attr(img, "loading", opts.loading.as_str())?;
    if let Some(sizes) = sizes {
        tree.set_attr(img, "sizes", sizes)?;
    }
    tree.set_attr(img, "style", main_image_style(opts.state.is_loaded()).to_css())?;

    match &set.fallback {
        Some(fallback) => fallback.apply(tree, img, opts.state == LoadState::Idle)?,
        None => tracing::debug!("No fallback, omitting request attributes"),
    }

    for (name, value) in opts.extra_attrs {
        if RESERVED_ATTRS.contains(&name.as_str()) {
            tracing::debug!(attr = %name, "Ignoring reserved attribute override");
            continue;
        }
        tree.set_attr(img, name, value.as_str())?;
    }

    tree.append_child(container, img)?;
    Ok(img)
}
