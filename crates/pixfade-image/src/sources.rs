//! Source set building
//!
//! Turns an [`ImageSet`] into attributes ready to emit on `<source>` and
//! `<img>` elements. Declaration order is kept: browsers pick the first
//! `<source>` whose media query matches.

use pixfade_dom::{DomError, DomTree, NodeId};

use crate::ImageSet;
use crate::markers;

/// Remove the line breaks multi-candidate srcsets are often authored with
///
/// Candidates are already comma separated, so nothing else changes.
pub fn normalize_srcset(srcset: &str) -> String {
    srcset.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

/// Attributes of one `<source>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAttrs {
    pub mime_type: Option<String>,
    pub media: Option<String>,
    pub srcset: String,
    pub sizes: Option<String>,
}

impl SourceAttrs {
    pub fn render(&self, tree: &mut DomTree, parent: NodeId) -> Result<NodeId, DomError> {
        let source = tree.create_element("source");
        if let Some(mime_type) = &self.mime_type {
            tree.set_attr(source, "type", mime_type.as_str())?;
        }
        if let Some(media) = &self.media {
            tree.set_attr(source, "media", media.as_str())?;
        }
        tree.set_attr(source, "srcset", self.srcset.as_str())?;
        if let Some(sizes) = &self.sizes {
            tree.set_attr(source, "sizes", sizes.as_str())?;
        }
        tree.append_child(parent, source)?;
        Ok(source)
    }
}

/// Request-triggering attributes of the `<img>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackAttrs {
    pub src: Option<String>,
    pub srcset: Option<String>,
}

impl FallbackAttrs {
    /// Write `src`/`srcset`, or their inert `data-` twins when `deferred`
    pub fn apply(&self, tree: &mut DomTree, img: NodeId, deferred: bool) -> Result<(), DomError> {
        let (src_attr, srcset_attr) = if deferred {
            (markers::DEFERRED_SRC, markers::DEFERRED_SRCSET)
        } else {
            ("src", "srcset")
        };
        if let Some(src) = &self.src {
            tree.set_attr(img, src_attr, src.as_str())?;
        }
        if let Some(srcset) = &self.srcset {
            tree.set_attr(img, srcset_attr, srcset.as_str())?;
        }
        Ok(())
    }
}

/// Render-ready image set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    pub fallback: Option<FallbackAttrs>,
    pub sources: Vec<SourceAttrs>,
}

impl SourceSet {
    /// Normalize an image set. A source only carries its own `sizes`;
    /// the descriptor-level value belongs to the `<img>`.
    pub fn build(set: &ImageSet) -> Self {
        let fallback = set.fallback.as_ref().and_then(|f| {
            let src = non_empty(f.src.as_ref());
            let srcset = non_empty(f.src_set.as_ref()).map(|s| normalize_srcset(&s));
            (src.is_some() || srcset.is_some()).then_some(FallbackAttrs { src, srcset })
        });

        let sources = set
            .sources
            .iter()
            .enumerate()
            .filter_map(|(idx, source)| {
                let Some(srcset) = non_empty(source.src_set.as_ref()) else {
                    tracing::debug!(index = idx, "Skipping source without srcSet");
                    return None;
                };
                Some(SourceAttrs {
                    mime_type: non_empty(source.mime_type.as_ref()),
                    media: non_empty(source.media.as_ref()),
                    srcset: normalize_srcset(&srcset),
                    sizes: non_empty(source.sizes.as_ref()),
                })
            })
            .collect();

        Self { fallback, sources }
    }

    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }

    /// Nothing at all to show
    pub fn is_empty(&self) -> bool {
        self.fallback.is_none() && self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceCandidate;

    const MULTILINE: &str = "icon32px.png 32w,\nicon64px.png 64w,\nicon-retina.png 2x,\nicon-ultra.png 3x,\nicon.svg";

    #[test]
    fn test_normalize_keeps_every_candidate() {
        let normalized = normalize_srcset(MULTILINE);
        assert_eq!(
            normalized,
            "icon32px.png 32w,icon64px.png 64w,icon-retina.png 2x,icon-ultra.png 3x,icon.svg"
        );

        let before: Vec<_> = MULTILINE.split(',').map(str::trim).collect();
        let after: Vec<_> = normalized.split(',').collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_normalize_crlf() {
        assert_eq!(normalize_srcset("a 1x,\r\nb 2x"), "a 1x,b 2x");
        assert_eq!(normalize_srcset("a 1x"), "a 1x");
    }

    #[test]
    fn test_no_fallback() {
        let set = SourceSet::build(&ImageSet::new());
        assert!(set.fallback.is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn test_fallback_src_only() {
        let set = SourceSet::build(&ImageSet::new().with_fallback(SourceCandidate::src("x.jpg")));
        assert_eq!(
            set.fallback,
            Some(FallbackAttrs {
                src: Some("x.jpg".into()),
                srcset: None
            })
        );
    }

    #[test]
    fn test_empty_fallback_strings_are_absent() {
        let fallback = SourceCandidate::src("").with_src_set("");
        let set = SourceSet::build(&ImageSet::new().with_fallback(fallback));
        assert!(set.fallback.is_none());
    }

    #[test]
    fn test_sources_keep_order_and_own_sizes() {
        let images = ImageSet::new()
            .with_source(
                SourceCandidate::src_set("big.avif 1600w")
                    .with_type("image/avif")
                    .with_media("(min-width: 800px)"),
            )
            .with_source(SourceCandidate::default().with_media("ignored"))
            .with_source(SourceCandidate::src_set("small.webp 400w,\nsmall2.webp 800w").with_sizes("50vw"));

        let set = SourceSet::build(&images);

        assert_eq!(set.sources.len(), 2);
        assert_eq!(set.sources[0].media.as_deref(), Some("(min-width: 800px)"));
        assert_eq!(set.sources[0].sizes, None);
        assert_eq!(set.sources[1].srcset, "small.webp 400w,small2.webp 800w");
        assert_eq!(set.sources[1].sizes.as_deref(), Some("50vw"));
    }

    #[test]
    fn test_render_source() {
        let mut tree = DomTree::new();
        let root = tree.root();
        let attrs = SourceAttrs {
            mime_type: Some("image/webp".into()),
            media: Some("some-media".into()),
            srcset: "a 32w,b 64w".into(),
            sizes: None,
        };
        let id = attrs.render(&mut tree, root).unwrap();
        assert_eq!(
            tree.outer_html(id),
            r#"<source type="image/webp" media="some-media" srcset="a 32w,b 64w">"#
        );
    }

    #[test]
    fn test_apply_fallback_deferred() {
        let mut tree = DomTree::new();
        let img = tree.create_element("img");
        let fallback = FallbackAttrs {
            src: Some("x.jpg".into()),
            srcset: Some("x.jpg 1x".into()),
        };

        fallback.apply(&mut tree, img, true).unwrap();
        assert_eq!(tree.get_attr(img, "data-src"), Some("x.jpg"));
        assert_eq!(tree.get_attr(img, "data-srcset"), Some("x.jpg 1x"));
        assert!(!tree.has_attr(img, "src"));
        assert!(!tree.has_attr(img, "srcset"));
    }
}
