//! Image descriptors
//!
//! The immutable metadata an external pipeline computes for every image:
//! intrinsic size, layout mode, responsive candidates and a placeholder.
//! Descriptors arrive as JSON and are validated here, once, into a
//! [`Sizing`] variant so the rest of the crate never re-checks them.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DescriptorError, ImageError};

/// Layout mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Literal pixel box, never resizes
    Fixed,
    /// Fills the container width, keeps aspect ratio
    Fluid,
    /// Shrinks with the container, never grows past intrinsic width
    Constrained,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Fixed => "fixed",
            Layout::Fluid => "fluid",
            Layout::Constrained => "constrained",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(Layout::Fixed),
            "fluid" => Ok(Layout::Fluid),
            "constrained" => Ok(Layout::Constrained),
            other => Err(DescriptorError::UnknownLayout(other.to_string())),
        }
    }
}

/// Intrinsic pixel size, both sides positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: NonZeroU32,
    height: NonZeroU32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Result<Self, DescriptorError> {
        match (NonZeroU32::new(width), NonZeroU32::new(height)) {
            (Some(width), Some(height)) => Ok(Self { width, height }),
            _ => Err(DescriptorError::ZeroDimension { width, height }),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height.get()
    }

    /// Height as a percentage of width
    pub fn height_percent(&self) -> f64 {
        f64::from(self.height()) / f64::from(self.width()) * 100.0
    }
}

/// Layout mode together with the dimensions it applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sizing {
    Fixed(Dimensions),
    Fluid(Dimensions),
    Constrained(Dimensions),
}

impl Sizing {
    pub fn new(layout: Layout, width: u32, height: u32) -> Result<Self, DescriptorError> {
        let dims = Dimensions::new(width, height)?;
        Ok(match layout {
            Layout::Fixed => Sizing::Fixed(dims),
            Layout::Fluid => Sizing::Fluid(dims),
            Layout::Constrained => Sizing::Constrained(dims),
        })
    }

    pub fn layout(&self) -> Layout {
        match self {
            Sizing::Fixed(_) => Layout::Fixed,
            Sizing::Fluid(_) => Layout::Fluid,
            Sizing::Constrained(_) => Layout::Constrained,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        match *self {
            Sizing::Fixed(d) | Sizing::Fluid(d) | Sizing::Constrained(d) => d,
        }
    }

    pub fn width(&self) -> u32 {
        self.dimensions().width()
    }

    pub fn height(&self) -> u32 {
        self.dimensions().height()
    }
}

/// One responsive candidate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCandidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// May contain newlines between candidates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,
    /// MIME type, e.g. `image/webp`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl SourceCandidate {
    /// Candidate with only a `src`
    pub fn src(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Default::default()
        }
    }

    /// Candidate with only a `srcSet`
    pub fn src_set(src_set: impl Into<String>) -> Self {
        Self {
            src_set: Some(src_set.into()),
            ..Default::default()
        }
    }

    pub fn with_src_set(mut self, src_set: impl Into<String>) -> Self {
        self.src_set = Some(src_set.into());
        self
    }

    pub fn with_media(mut self, media: impl Into<String>) -> Self {
        self.media = Some(media.into());
        self
    }

    pub fn with_sizes(mut self, sizes: impl Into<String>) -> Self {
        self.sizes = Some(sizes.into());
        self
    }

    pub fn with_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Fallback plus ordered alternates. `sources` order is selection priority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<SourceCandidate>,
    #[serde(default)]
    pub sources: Vec<SourceCandidate>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback(mut self, fallback: SourceCandidate) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_source(mut self, source: SourceCandidate) -> Self {
        self.sources.push(source);
        self
    }
}

/// Validated image metadata
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawImageDescriptor")]
pub struct ImageDescriptor {
    pub sizing: Sizing,
    pub images: ImageSet,
    pub placeholder: Option<ImageSet>,
    pub sizes: Option<String>,
    pub background_color: Option<String>,
}

impl ImageDescriptor {
    pub fn new(sizing: Sizing, images: ImageSet) -> Self {
        Self {
            sizing,
            images,
            placeholder: None,
            sizes: None,
            background_color: None,
        }
    }

    /// Parse and validate a descriptor from JSON
    pub fn from_json(json: &str) -> Result<Self, ImageError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_placeholder(mut self, placeholder: ImageSet) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn with_sizes(mut self, sizes: impl Into<String>) -> Self {
        self.sizes = Some(sizes.into());
        self
    }

    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    pub fn layout(&self) -> Layout {
        self.sizing.layout()
    }

    pub fn width(&self) -> u32 {
        self.sizing.width()
    }

    pub fn height(&self) -> u32 {
        self.sizing.height()
    }
}

/// Wire shape, before validation
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawImageDescriptor {
    width: u32,
    height: u32,
    layout: Layout,
    images: ImageSet,
    #[serde(default)]
    placeholder: Option<ImageSet>,
    #[serde(default)]
    sizes: Option<String>,
    #[serde(default)]
    background_color: Option<String>,
}

impl TryFrom<RawImageDescriptor> for ImageDescriptor {
    type Error = DescriptorError;

    fn try_from(raw: RawImageDescriptor) -> Result<Self, Self::Error> {
        Ok(Self {
            sizing: Sizing::new(raw.layout, raw.width, raw.height)?,
            images: raw.images,
            placeholder: raw.placeholder,
            sizes: raw.sizes,
            background_color: raw.background_color,
        })
    }
}
