//! factpost
//!
//! Square social-post compositor. Takes a background template, a headline
//! ("fact") and a brand name, and draws a wrapped headline band, an accent tag
//! and a brand mark over the background, returning a PNG.
//!
//! # Pipeline
//!
//! - **Glyph metrics** ([`fonts`]): font resolution and string measurement
//! - **Wrapping** ([`rendering::wrap`]): greedy, word-granular line breaking
//! - **Layout** ([`rendering::layout`]): band, line, tag and brand geometry
//! - **Composition** ([`rendering::raster`]): background fit, band fill,
//!   shadowed text, PNG encoding
//! - **Builder** ([`PostBuilder`]): runs the whole pipeline for one request
//!
//! # Example
//!
//! ```no_run
//! use factpost::{PostBuilder, PostConfig, RenderRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let builder = PostBuilder::new(PostConfig::default())?;
//! let request = RenderRequest {
//!     fact: "Octopuses have three hearts and blue blood".to_string(),
//!     ..Default::default()
//! };
//! let background = std::fs::read("templates/general/ocean.png")?;
//! let post = builder.build_with_background(&request, &background)?;
//! println!("{}", &post.to_data_url()[..40]);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub mod builder;
pub mod error;
pub mod fonts;
pub mod rendering;
pub mod sources;

// Async render service backed by worker threads
#[cfg(feature = "service")]
pub mod async_api;

pub use builder::{PostBuilder, RenderRequest};
pub use error::{Element, Error, Result};
pub use rendering::layout::{LayoutPlan, PositionHints};
pub use rendering::paint::Palette;
pub use rendering::RenderedPost;
pub use sources::Topic;

#[cfg(feature = "service")]
pub use async_api::RenderService;

/// Canvas dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1080,
        }
    }
}

/// Horizontal anchoring of the brand mark
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandAnchor {
    #[default]
    Center,
    Right,
}

/// What to do when the headline band does not fit on the canvas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Fail the render with `Error::LayoutOverflow`
    #[default]
    Reject,
    /// Drop trailing headline lines until the band fits
    Clamp,
}

/// Configuration for the post builder
///
/// Defaults reproduce the classic 1080x1080 layout: a black band at 190/255
/// opacity starting 24px from the top, an 84px white headline wrapped to 92%
/// of the canvas width, a red "VIRAL" tag at half the headline size and a
/// 36px brand mark 40px above the bottom edge.
///
/// # Examples
///
/// ```
/// let cfg = factpost::PostConfig::default();
/// assert_eq!(cfg.max_text_width(), 993);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    pub canvas: CanvasSize,
    /// Headline wrap width as a fraction of canvas width
    pub max_width_ratio: f32,
    /// Fixed band offset from the top edge
    pub band_top: u32,
    /// Padding above and below the headline lines inside the band
    pub band_padding: u32,
    /// Accent label; empty disables the tag
    pub tag_text: String,
    pub tag_top: u32,
    /// Tag size relative to headline size
    pub tag_size_ratio: f32,
    pub brand_margin: u32,
    pub brand_anchor: BrandAnchor,
    /// Drop-shadow offset in pixels, applied on both axes
    pub shadow_offset: i32,
    pub palette: Palette,
    pub headline_size: f32,
    pub brand_size: f32,
    /// Brand used when a request does not carry one
    pub default_brand: String,
    /// Uppercase headline and brand before layout
    pub uppercase: bool,
    pub overflow: OverflowPolicy,
    /// Fonts tried in order at startup; the first one that loads wins
    pub font_candidates: Vec<PathBuf>,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::default(),
            max_width_ratio: 0.92,
            band_top: 24,
            band_padding: 24,
            tag_text: "VIRAL".to_string(),
            tag_top: 8,
            tag_size_ratio: 0.5,
            brand_margin: 40,
            brand_anchor: BrandAnchor::default(),
            shadow_offset: 2,
            palette: Palette::default(),
            headline_size: 84.0,
            brand_size: 36.0,
            default_brand: "FACTS".to_string(),
            uppercase: true,
            overflow: OverflowPolicy::default(),
            font_candidates: fonts::default_font_candidates(),
        }
    }
}

impl PostConfig {
    /// Load a JSON config; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Maximum rendered width of one headline line.
    pub fn max_text_width(&self) -> u32 {
        (self.canvas.width as f32 * self.max_width_ratio) as u32
    }

    pub fn validate(&self) -> Result<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(Error::Config("canvas must be non-empty".into()));
        }
        if !(self.max_width_ratio > 0.0 && self.max_width_ratio <= 1.0) {
            return Err(Error::Config(format!(
                "max_width_ratio {} must be in (0, 1]",
                self.max_width_ratio
            )));
        }
        for (name, size) in [
            ("headline_size", self.headline_size),
            ("brand_size", self.brand_size),
            ("tag_size_ratio", self.tag_size_ratio),
        ] {
            if !(size.is_finite() && size > 0.0) {
                return Err(Error::Config(format!("{} must be positive, got {}", name, size)));
            }
        }
        if self.band_top + 2 * self.band_padding > self.canvas.height {
            return Err(Error::Config(format!(
                "band_top {} plus padding {} exceeds canvas height {}",
                self.band_top,
                2 * self.band_padding,
                self.canvas.height
            )));
        }
        if self.brand_margin >= self.canvas.height || self.brand_margin >= self.canvas.width {
            return Err(Error::Config("brand_margin exceeds canvas".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PostConfig::default();
        assert_eq!(config.canvas.width, 1080);
        assert_eq!(config.canvas.height, 1080);
        assert_eq!(config.max_text_width(), 993);
        assert!(config.uppercase);
        config.validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = PostConfig::from_json(r#"{"tag_text": "NEW", "brand_anchor": "right"}"#).unwrap();
        assert_eq!(cfg.tag_text, "NEW");
        assert_eq!(cfg.brand_anchor, BrandAnchor::Right);
        assert_eq!(cfg.headline_size, 84.0);
        assert_eq!(cfg.palette, Palette::default());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = PostConfig::from_json(r#"{"max_width_ratio": 1.5}"#).unwrap_err();
        assert_eq!(err.kind(), "config");
        let err = PostConfig::from_json(r#"{"headline_size": -1}"#).unwrap_err();
        assert_eq!(err.kind(), "config");
        let err = PostConfig::from_json(r#"{"canvas": {"width": 100, "height": 40}}"#).unwrap_err();
        assert_eq!(err.kind(), "config");
    }
}
