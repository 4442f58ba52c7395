//! Placeholder rendering
//!
//! The placeholder sits in the same box as the main image and fades out
//! once the main image has loaded. It is decorative and never deferred.

use pixfade_dom::{DomError, DomTree, NodeId};

use crate::config::FadeTransition;
use crate::layout::compute_wrapper_style;
use crate::markers;
use crate::sources::SourceSet;
use crate::style::Style;
use crate::{ImageDescriptor, Sizing};

/// Inline style of the placeholder
///
/// Order is `opacity, transition, box geometry, background-color, position`.
pub fn placeholder_style(
    sizing: Sizing,
    background_color: Option<&str>,
    loaded: bool,
    fade: &FadeTransition,
) -> Style {
    let mut style = Style::new()
        .with("opacity", if loaded { "0" } else { "1" })
        .with("transition", fade.to_css());

    compute_wrapper_style(sizing).apply_box(&mut style);

    if let Some(color) = background_color.filter(|c| !c.is_empty()) {
        style.set("background-color", color);
    }
    style.set("position", "relative");
    style
}

/// Render the placeholder into `parent`, returning the marked node
///
/// With low-res content the marked node is an `<img>` (inside a
/// `<picture>` when there are sources). Without it, a bare `<div>` paints
/// the background color.
pub fn render_placeholder(
    tree: &mut DomTree,
    parent: NodeId,
    image: &ImageDescriptor,
    loaded: bool,
    fade: &FadeTransition,
) -> Result<NodeId, DomError> {
    let sources = image
        .placeholder
        .as_ref()
        .map(|set| SourceSet::build(set))
        .unwrap_or_default();
    let style = placeholder_style(
        image.sizing,
        image.background_color.as_deref(),
        loaded,
        fade,
    );

    if sources.is_empty() {
        let div = tree.create_element("div");
        mark(tree, div, &style)?;
        tree.append_child(parent, div)?;
        return Ok(div);
    }

    let container = if sources.has_sources() {
        let picture = tree.create_element("picture");
        for source in &sources.sources {
            source.render(tree, picture)?;
        }
        tree.append_child(parent, picture)?;
        picture
    } else {
        parent
    };

    let img = tree.create_element("img");
    mark(tree, img, &style)?;
    tree.set_attr(img, "alt", "")?;
    tree.set_attr(img, "decoding", "async")?;
    if let Some(fallback) = &sources.fallback {
        fallback.apply(tree, img, false)?;
    }
    tree.append_child(container, img)?;
    Ok(img)
}

fn mark(tree: &mut DomTree, node: NodeId, style: &Style) -> Result<(), DomError> {
    tree.set_attr(node, "aria-hidden", "true")?;
    tree.set_attr(node, markers::PLACEHOLDER, "")?;
    tree.set_attr(node, "style", style.to_css())
}
