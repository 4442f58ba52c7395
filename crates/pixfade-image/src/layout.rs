//! Layout calculation
//!
//! Maps a [`Sizing`] to the wrapper's inline geometry and to the sizer
//! node that reserves the image box before any pixels arrive:
//!
//! - `fixed` → literal `width`/`height` on the wrapper, no sizer
//! - `fluid` → bare wrapper, sizer reserves aspect ratio with `padding-top`
//! - `constrained` → `inline-block` wrapper, sizer caps `max-width`

use pixfade_dom::{DomError, DomTree, NodeId};

use crate::Sizing;
use crate::style::Style;

/// Class every wrapper carries
pub const WRAPPER_CLASS: &str = "image-wrapper";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    InlineBlock,
}

impl Display {
    pub fn as_css(&self) -> &'static str {
        match self {
            Display::Block => "block",
            Display::InlineBlock => "inline-block",
        }
    }
}

/// Wrapper box derived from sizing; `position` is always `relative`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapperGeometry {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub display: Option<Display>,
}

impl WrapperGeometry {
    pub const POSITION: &'static str = "relative";

    /// `position`, then the box properties
    pub fn to_style(&self) -> Style {
        let mut style = Style::new().with("position", Self::POSITION);
        self.apply_box(&mut style);
        style
    }

    /// Only the size/display properties, in `width, height, display` order
    pub fn apply_box(&self, style: &mut Style) {
        if let Some(width) = self.width {
            style.set("width", px(width));
        }
        if let Some(height) = self.height {
            style.set("height", px(height));
        }
        if let Some(display) = self.display {
            style.set("display", display.as_css());
        }
    }
}

fn px(value: u32) -> String {
    format!("{value}px")
}

/// Compute the wrapper geometry for a sizing. Pure.
pub fn compute_wrapper_style(sizing: Sizing) -> WrapperGeometry {
    match sizing {
        Sizing::Fixed(dims) => WrapperGeometry {
            width: Some(dims.width()),
            height: Some(dims.height()),
            display: None,
        },
        Sizing::Fluid(_) => WrapperGeometry {
            width: None,
            height: None,
            display: None,
        },
        Sizing::Constrained(_) => WrapperGeometry {
            width: None,
            height: None,
            display: Some(Display::InlineBlock),
        },
    }
}

/// Class and style of the wrapper element, caller overrides applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperProps {
    pub class_name: String,
    pub style: Style,
}

pub fn wrapper_props(sizing: Sizing, class_name: Option<&str>, overrides: &Style) -> WrapperProps {
    let mut style = compute_wrapper_style(sizing).to_style();
    style.merge(overrides);

    let class_name = match class_name.map(str::trim).filter(|c| !c.is_empty()) {
        Some(extra) => format!("{WRAPPER_CLASS} {extra}"),
        None => WRAPPER_CLASS.to_string(),
    };

    WrapperProps { class_name, style }
}

/// Sibling node that reserves space ahead of the placeholder
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutSizer {
    None,
    /// `padding-top` percentage reserving the aspect ratio
    AspectRatio { padding_top: f64 },
    /// Width cap holding an invisible box of intrinsic size
    MaxWidth { width: u32, height: u32 },
}

pub fn layout_sizer(sizing: Sizing) -> LayoutSizer {
    match sizing {
        Sizing::Fixed(_) => LayoutSizer::None,
        Sizing::Fluid(dims) => LayoutSizer::AspectRatio {
            padding_top: dims.height_percent(),
        },
        Sizing::Constrained(dims) => LayoutSizer::MaxWidth {
            width: dims.width(),
            height: dims.height(),
        },
    }
}

impl LayoutSizer {
    /// Append the sizer to `parent`, if this layout has one
    pub fn render(&self, tree: &mut DomTree, parent: NodeId) -> Result<Option<NodeId>, DomError> {
        match *self {
            LayoutSizer::None => Ok(None),
            LayoutSizer::AspectRatio { padding_top } => {
                let div = tree.create_element("div");
                tree.set_attr(div, "aria-hidden", "true")?;
                tree.set_attr(
                    div,
                    "style",
                    Style::new().with("padding-top", format!("{padding_top}%")).to_css(),
                )?;
                tree.append_child(parent, div)?;
                Ok(Some(div))
            }
            LayoutSizer::MaxWidth { width, height } => {
                let div = tree.create_element("div");
                tree.set_attr(
                    div,
                    "style",
                    Style::new()
                        .with("max-width", px(width))
                        .with("display", Display::Block.as_css())
                        .to_css(),
                )?;

                let img = tree.create_element("img");
                tree.set_attr(img, "alt", "")?;
                tree.set_attr(img, "role", "presentation")?;
                tree.set_attr(img, "aria-hidden", "true")?;
                tree.set_attr(img, "src", sizer_svg(width, height))?;
                tree.set_attr(
                    img,
                    "style",
                    Style::new()
                        .with("max-width", "100%")
                        .with("display", Display::Block.as_css())
                        .with("position", "static")
                        .to_css(),
                )?;

                tree.append_child(div, img)?;
                tree.append_child(parent, div)?;
                Ok(Some(div))
            }
        }
    }
}

/// Empty inline SVG with the intrinsic size, so `max-width: 100%` scales it
fn sizer_svg(width: u32, height: u32) -> String {
    format!(
        "data:image/svg+xml;charset=utf-8,%3Csvg height='{height}' width='{width}' \
         xmlns='http://www.w3.org/2000/svg' version='1.1'%3E%3C/svg%3E"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Layout;

    fn sizing(layout: Layout, w: u32, h: u32) -> Sizing {
        Sizing::new(layout, w, h).unwrap()
    }

    #[test]
    fn test_fixed_wrapper_style() {
        for (w, h) in [(100, 100), (1, 3000), (640, 480)] {
            let style = compute_wrapper_style(sizing(Layout::Fixed, w, h)).to_style();
            assert_eq!(
                style.to_css(),
                format!("position: relative; width: {w}px; height: {h}px;")
            );
        }
    }

    #[test]
    fn test_constrained_wrapper_style() {
        let style = compute_wrapper_style(sizing(Layout::Constrained, 800, 600)).to_style();
        assert_eq!(style.to_css(), "position: relative; display: inline-block;");
        assert!(style.get("width").is_none());
        assert!(style.get("height").is_none());
    }

    #[test]
    fn test_fluid_wrapper_style() {
        let style = compute_wrapper_style(sizing(Layout::Fluid, 800, 600)).to_style();
        assert_eq!(style.to_css(), "position: relative;");
    }

    #[test]
    fn test_compute_is_deterministic() {
        let s = sizing(Layout::Fixed, 320, 240);
        assert_eq!(compute_wrapper_style(s), compute_wrapper_style(s));
    }

    #[test]
    fn test_wrapper_props_merge_class_and_style() {
        let overrides = Style::new().with("width", "50%").with("margin", "auto");
        let props = wrapper_props(sizing(Layout::Fixed, 100, 80), Some(" hero "), &overrides);

        assert_eq!(props.class_name, "image-wrapper hero");
        assert_eq!(
            props.style.to_css(),
            "position: relative; width: 50%; height: 80px; margin: auto;"
        );

        let props = wrapper_props(sizing(Layout::Fluid, 100, 80), None, &Style::new());
        assert_eq!(props.class_name, "image-wrapper");
    }

    #[test]
    fn test_sizer_per_layout() {
        assert_eq!(layout_sizer(sizing(Layout::Fixed, 10, 10)), LayoutSizer::None);
        assert_eq!(
            layout_sizer(sizing(Layout::Fluid, 200, 100)),
            LayoutSizer::AspectRatio { padding_top: 50.0 }
        );
        assert_eq!(
            layout_sizer(sizing(Layout::Constrained, 200, 100)),
            LayoutSizer::MaxWidth { width: 200, height: 100 }
        );
    }

    #[test]
    fn test_render_fluid_sizer() {
        let mut tree = DomTree::new();
        let root = tree.root();
        let id = layout_sizer(sizing(Layout::Fluid, 400, 100))
            .render(&mut tree, root)
            .unwrap()
            .unwrap();
        assert_eq!(
            tree.outer_html(id),
            r#"<div aria-hidden="true" style="padding-top: 25%;"></div>"#
        );
    }

    #[test]
    fn test_render_constrained_sizer() {
        let mut tree = DomTree::new();
        let root = tree.root();
        let id = layout_sizer(sizing(Layout::Constrained, 300, 200))
            .render(&mut tree, root)
            .unwrap()
            .unwrap();

        assert_eq!(tree.get_attr(id, "style"), Some("max-width: 300px; display: block;"));
        let (img, _) = tree.children(id).next().unwrap();
        assert_eq!(tree.get_attr(img, "role"), Some("presentation"));
        assert_eq!(
            tree.get_attr(img, "style"),
            Some("max-width: 100%; display: block; position: static;")
        );
        assert!(tree.get_attr(img, "src").unwrap().contains("height='200' width='300'"));
    }

    #[test]
    fn test_render_fixed_has_no_sizer() {
        let mut tree = DomTree::new();
        let root = tree.root();
        let rendered = layout_sizer(sizing(Layout::Fixed, 1, 1)).render(&mut tree, root).unwrap();
        assert!(rendered.is_none());
        assert!(tree.is_empty());
    }
}
