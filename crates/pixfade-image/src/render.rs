//! Render entry point
//!
//! Assembles the full image structure:
//!
//! ```text
//! <wrapper data-image-wrapper class="image-wrapper ..." style="...">
//!   [layout sizer]
//!   placeholder
//!   main image
//! </wrapper>
//! ```

use pixfade_dom::{DomTree, NodeId};

use crate::config::RenderConfig;
use crate::hydrate::HydrationTargets;
use crate::layout::{layout_sizer, wrapper_props};
use crate::main_image::{MainImageOptions, render_main_image};
use crate::markers;
use crate::placeholder::render_placeholder;
use crate::state::{LoadPolicy, LoadState};
use crate::style::Style;
use crate::{Diagnostic, ImageDescriptor, ImageError};

/// Elements that cannot hold the image structure
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose content the HTML parser does not read back as the same
/// subtree: raw text, RCDATA, template contents, or children moved out by
/// implied end tags and foster parenting
const UNPARSEABLE_TAGS: &[&str] = &[
    "script", "style", "textarea", "title", "xmp", "iframe", "noembed", "noframes",
    "noscript", "plaintext", "template", "p", "table", "caption", "colgroup", "tbody",
    "thead", "tfoot", "tr", "td", "th", "select", "option", "optgroup", "html", "head",
    "body", "frameset",
];

/// Alternative text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Alt {
    Text(String),
    /// Purely decorative image, rendered as `alt=""`
    #[default]
    Decorative,
}

impl Alt {
    pub fn as_str(&self) -> &str {
        match self {
            Alt::Text(text) => text,
            Alt::Decorative => "",
        }
    }
}

impl From<&str> for Alt {
    fn from(text: &str) -> Self {
        Alt::Text(text.to_string())
    }
}

impl From<String> for Alt {
    fn from(text: String) -> Self {
        Alt::Text(text)
    }
}

/// Per-image render input
#[derive(Debug, Clone, Default)]
pub struct ImageProps {
    pub image: Option<ImageDescriptor>,
    pub alt: Alt,
    pub loading: LoadPolicy,
    pub class_name: Option<String>,
    pub style: Style,
    /// Wrapper tag override
    pub as_tag: Option<String>,
    /// Passed through to the main `<img>`
    pub attrs: Vec<(String, String)>,
}

impl ImageProps {
    pub fn new(image: ImageDescriptor) -> Self {
        Self {
            image: Some(image),
            ..Default::default()
        }
    }

    pub fn with_alt(mut self, alt: impl Into<Alt>) -> Self {
        self.alt = alt.into();
        self
    }

    pub fn decorative(mut self) -> Self {
        self.alt = Alt::Decorative;
        self
    }

    pub fn with_loading(mut self, loading: LoadPolicy) -> Self {
        self.loading = loading;
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.as_tag = Some(tag.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }
}

/// Result of rendering into a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// `None` when nothing was rendered
    pub targets: Option<HydrationTargets>,
    /// Initial load state the markup was produced for
    pub state: LoadState,
    pub diagnostics: Vec<Diagnostic>,
}

impl Rendered {
    fn nothing(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            targets: None,
            state: LoadState::Idle,
            diagnostics,
        }
    }

    /// The wrapper element
    pub fn root(&self) -> Option<NodeId> {
        self.targets.map(|t| t.wrapper)
    }
}

/// Result of rendering to a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedHtml {
    /// Empty when nothing was rendered
    pub html: String,
    pub diagnostics: Vec<Diagnostic>,
}

fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    let well_formed = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !well_formed {
        return false;
    }
    let lower = tag.to_ascii_lowercase();
    !VOID_TAGS.contains(&lower.as_str()) && !UNPARSEABLE_TAGS.contains(&lower.as_str())
}

fn warn(diagnostic: Diagnostic) -> Diagnostic {
    tracing::warn!("{diagnostic}");
    diagnostic
}

/// Render an image into `parent`
///
/// A missing descriptor renders nothing and reports a single
/// [`Diagnostic::MissingImage`].
pub fn render(
    tree: &mut DomTree,
    parent: NodeId,
    props: &ImageProps,
    config: &RenderConfig,
) -> Result<Rendered, ImageError> {
    let mut diagnostics = Vec::new();

    let Some(image) = &props.image else {
        diagnostics.push(warn(Diagnostic::MissingImage));
        return Ok(Rendered::nothing(diagnostics));
    };

    let tag = match props.as_tag.as_deref() {
        Some(tag) if is_valid_tag(tag) => tag,
        Some(tag) => {
            diagnostics.push(warn(Diagnostic::InvalidWrapperTag(tag.to_string())));
            config.default_wrapper_tag.as_str()
        }
        None => config.default_wrapper_tag.as_str(),
    };

    let state = LoadState::initial(props.loading);
    let wrapper_attrs = wrapper_props(image.sizing, props.class_name.as_deref(), &props.style);

    let wrapper = tree.create_element(tag);
    tree.set_attr(wrapper, markers::WRAPPER, "")?;
    tree.set_attr(wrapper, "class", wrapper_attrs.class_name)?;
    tree.set_attr(wrapper, "style", wrapper_attrs.style.to_css())?;

    layout_sizer(image.sizing).render(tree, wrapper)?;
    let placeholder = render_placeholder(tree, wrapper, image, state.is_loaded(), &config.fade)?;
    let main_image = render_main_image(
        tree,
        wrapper,
        image,
        MainImageOptions {
            alt: props.alt.as_str(),
            loading: props.loading,
            state,
            mode: config.mode,
            extra_attrs: &props.attrs,
        },
    )?;

    tree.append_child(parent, wrapper)?;

    tracing::debug!(
        layout = %image.layout(),
        width = image.width(),
        height = image.height(),
        ?state,
        "Rendered image"
    );

    Ok(Rendered {
        targets: Some(HydrationTargets {
            wrapper,
            placeholder,
            main_image,
        }),
        state,
        diagnostics,
    })
}

/// Render an image to standalone markup
pub fn render_to_string(props: &ImageProps, config: &RenderConfig) -> Result<RenderedHtml, ImageError> {
    let mut tree = DomTree::new();
    let root = tree.root();
    let rendered = render(&mut tree, root, props, config)?;
    let html = rendered
        .root()
        .map(|wrapper| tree.outer_html(wrapper))
        .unwrap_or_default();
    Ok(RenderedHtml {
        html,
        diagnostics: rendered.diagnostics,
    })
}
