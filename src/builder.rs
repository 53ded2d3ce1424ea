//! Request-level entry point: metrics, wrapping, layout and composition for one post

use std::path::PathBuf;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::fonts::{resolve_face, ElementFonts, FontFace};
use crate::rendering::layout::{Label, LayoutEngine, LayoutPlan, PositionHints};
use crate::rendering::raster;
use crate::rendering::wrap::wrap_text;
use crate::rendering::RenderedPost;
use crate::sources::{TemplateStore, Topic};
use crate::{Error, PostConfig, Result};

/// One post request. Field names follow the JSON wire format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub topic: Topic,
    /// Headline text; may be empty
    #[serde(default)]
    pub fact: String,
    /// Brand mark; `None` uses the configured default
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default, rename = "textSize")]
    pub headline_size: Option<f32>,
    #[serde(default, rename = "brandSize")]
    pub brand_size: Option<f32>,
    #[serde(flatten)]
    pub position: PositionHints,
    /// Background file; when absent the template store is asked
    #[serde(default)]
    pub background: Option<PathBuf>,
}

/// Runs the post pipeline. Holds no per-request state, so one builder can
/// serve concurrent renders.
pub struct PostBuilder {
    config: PostConfig,
    face: FontFace,
    layout: LayoutEngine,
    templates: Option<Box<dyn TemplateStore>>,
}

impl PostBuilder {
    /// Validate `config` and resolve its font candidates.
    pub fn new(config: PostConfig) -> Result<Self> {
        config.validate()?;
        let face = resolve_face(&config.font_candidates)?;
        Self::with_face(config, face)
    }

    /// Use an already loaded face instead of `config.font_candidates`.
    pub fn with_face(config: PostConfig, face: FontFace) -> Result<Self> {
        config.validate()?;
        let layout = LayoutEngine::new(&config);
        Ok(Self {
            config,
            face,
            layout,
            templates: None,
        })
    }

    pub fn with_templates(mut self, store: impl TemplateStore + 'static) -> Self {
        self.templates = Some(Box::new(store));
        self
    }

    pub fn config(&self) -> &PostConfig {
        &self.config
    }

    pub fn face(&self) -> &FontFace {
        &self.face
    }

    /// Font specs for the request's sizes.
    pub fn fonts_for(&self, request: &RenderRequest) -> Result<ElementFonts> {
        let headline = request.headline_size.unwrap_or(self.config.headline_size);
        let brand = request.brand_size.unwrap_or(self.config.brand_size);
        // No glyph taller than the canvas is ever rasterized.
        let max_size = self.config.canvas.height as f32;
        for (name, size) in [("textSize", headline), ("brandSize", brand)] {
            if !(size.is_finite() && size > 0.0 && size <= max_size) {
                return Err(Error::Config(format!(
                    "{} must be in (0, {}], got {}",
                    name, max_size, size
                )));
            }
        }
        let tag = (headline * self.config.tag_size_ratio).floor().max(1.0);

        Ok(ElementFonts {
            headline: self.face.at(headline),
            tag: self.face.at(tag),
            brand: self.face.at(brand),
        })
    }

    fn normalize(&self, text: &str) -> String {
        let text = text.trim();
        if self.config.uppercase {
            text.to_uppercase()
        } else {
            text.to_string()
        }
    }

    /// Wrap and lay out the request without drawing anything.
    pub fn plan(&self, request: &RenderRequest) -> Result<(LayoutPlan, ElementFonts)> {
        let fonts = self.fonts_for(request)?;
        let fact = self.normalize(&request.fact);
        let brand = self.normalize(request.brand.as_deref().unwrap_or(&self.config.default_brand));

        let max_width = self.config.max_text_width();
        let wrapped = wrap_text(&fact, &fonts.headline, max_width);
        let overflowing = wrapped.overflowing(&fonts.headline, max_width);
        if !overflowing.is_empty() {
            debug!("Headline line(s) {:?} exceed {}px and overflow", overflowing, max_width);
        }

        let plan = self.layout.layout(
            &wrapped,
            &fonts.headline,
            Some(Label::new(&self.config.tag_text, &fonts.tag)),
            Some(Label::new(&brand, &fonts.brand)),
            request.position,
        )?;
        Ok((plan, fonts))
    }

    /// Render over explicitly supplied background bytes.
    pub fn build_with_background(&self, request: &RenderRequest, background: &[u8]) -> Result<RenderedPost> {
        let (plan, fonts) = self.plan(request)?;
        let post = raster::render(
            background,
            &plan,
            &fonts,
            &self.config.palette,
            self.config.shadow_offset,
        )?;
        info!(
            "Rendered {}x{} post: {} headline line(s), {} bytes",
            post.width,
            post.height,
            plan.lines.len(),
            post.png_data.len()
        );
        Ok(post)
    }

    /// Render using `request.background`, or the template store when unset.
    pub fn build(&self, request: &RenderRequest) -> Result<RenderedPost> {
        let background = match (&request.background, &self.templates) {
            (Some(path), _) => std::fs::read(path)?,
            (None, Some(store)) => store.background(request.topic, request.fact.as_bytes())?,
            (None, None) => {
                return Err(Error::Template(
                    "request has no background and no template store is configured".into(),
                ))
            }
        };
        self.build_with_background(request, &background)
    }
}
