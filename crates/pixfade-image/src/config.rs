//! Render and hydration configuration

use serde::Deserialize;

use crate::ImageError;

/// Where the markup is produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Static render; the main image is marked for later hydration
    #[default]
    Server,
    /// Rendered directly into a live tree and attached right away
    Client,
}

/// CSS easing function for the cross-fade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    pub fn as_css(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::Ease => "ease",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
        }
    }
}

/// Placeholder fade-out once the main image has loaded
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FadeTransition {
    pub duration_ms: u32,
    pub easing: Easing,
}

impl Default for FadeTransition {
    fn default() -> Self {
        Self {
            duration_ms: 500,
            easing: Easing::Linear,
        }
    }
}

impl FadeTransition {
    /// Value of the `transition` property
    pub fn to_css(&self) -> String {
        format!("opacity {}ms {}", self.duration_ms, self.easing.as_css())
    }
}

/// Render configuration, resolved once per render call
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub mode: RenderMode,
    pub fade: FadeTransition,
    /// Wrapper element when the caller does not override it
    pub default_wrapper_tag: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::Server,
            fade: FadeTransition::default(),
            default_wrapper_tag: "div".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn client() -> Self {
        Self {
            mode: RenderMode::Client,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ImageError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Hydration configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HydrationConfig {
    /// Pre-load margin around the viewport, in px
    pub root_margin: f64,
    /// Host defers `loading="lazy"` images on its own
    pub native_lazy_loading: bool,
}

impl Default for HydrationConfig {
    fn default() -> Self {
        Self {
            root_margin: 200.0,
            native_lazy_loading: false,
        }
    }
}

impl HydrationConfig {
    pub fn from_json(json: &str) -> Result<Self, ImageError> {
        Ok(serde_json::from_str(json)?)
    }
}
