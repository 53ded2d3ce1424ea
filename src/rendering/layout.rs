/// Pixel geometry for the headline band, tag and brand mark
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::Element;
use crate::fonts::{TextBox, TextMeasure};
use crate::rendering::wrap::WrappedText;
use crate::{BrandAnchor, CanvasSize, Error, OverflowPolicy, PostConfig, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// One string placed on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextPlacement {
    pub text: String,
    /// Draw origin: left pen position, top of the ascent line
    pub origin: Point,
    pub baseline: i32,
    /// Ink box relative to `origin`
    pub ink: TextBox,
}

impl TextPlacement {
    fn new(text: &str, origin: Point, ink: TextBox, ascent: u32) -> Self {
        Self {
            text: text.to_string(),
            origin,
            baseline: origin.y + ascent as i32,
            ink,
        }
    }

    /// Ink rectangle in canvas coordinates.
    pub fn ink_rect(&self) -> Rect {
        Rect {
            x: self.origin.x + self.ink.left,
            y: self.origin.y + self.ink.top,
            width: self.ink.width,
            height: self.ink.height,
        }
    }
}

/// Computed geometry of one post. Never mutated after `LayoutEngine::layout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutPlan {
    pub canvas: CanvasSize,
    /// Full-width translucent band behind the headline
    pub band: Rect,
    pub line_height: u32,
    pub lines: Vec<TextPlacement>,
    pub tag: Option<TextPlacement>,
    pub brand: Option<TextPlacement>,
    /// Trailing headline lines dropped by `OverflowPolicy::Clamp`
    pub dropped_lines: usize,
}

/// Optional placement overrides, always percentages in 0-100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionHints {
    /// Horizontal center of the headline lines, percent of canvas width
    #[serde(default, rename = "textX")]
    pub text_x: Option<f32>,
    /// Top edge of the band, percent of canvas height
    #[serde(default, rename = "textY")]
    pub text_y: Option<f32>,
}

impl PositionHints {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("textX", self.text_x), ("textY", self.text_y)] {
            if let Some(v) = value {
                if !(0.0..=100.0).contains(&v) {
                    return Err(Error::InvalidPosition { name, value: v });
                }
            }
        }
        Ok(())
    }
}

/// A short label and the metrics it is measured with.
#[derive(Clone, Copy)]
pub struct Label<'a> {
    pub text: &'a str,
    pub metrics: &'a dyn TextMeasure,
}

impl<'a> Label<'a> {
    pub fn new(text: &'a str, metrics: &'a dyn TextMeasure) -> Self {
        Self { text, metrics }
    }
}

/// Turns wrapped lines and font metrics into a `LayoutPlan`.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    canvas: CanvasSize,
    band_top: u32,
    band_padding: u32,
    tag_top: u32,
    brand_margin: u32,
    brand_anchor: BrandAnchor,
    overflow: OverflowPolicy,
}

impl LayoutEngine {
    pub fn new(config: &PostConfig) -> Self {
        Self {
            canvas: config.canvas,
            band_top: config.band_top,
            band_padding: config.band_padding,
            tag_top: config.tag_top,
            brand_margin: config.brand_margin,
            brand_anchor: config.brand_anchor,
            overflow: config.overflow,
        }
    }

    pub fn layout(
        &self,
        wrapped: &WrappedText,
        headline: &dyn TextMeasure,
        tag: Option<Label<'_>>,
        brand: Option<Label<'_>>,
        hints: PositionHints,
    ) -> Result<LayoutPlan> {
        hints.validate()?;

        let width = self.canvas.width;
        let height = self.canvas.height;
        let line_height = headline.line_height();

        // Brand is placed first: the band must end above its ink.
        let brand = match brand.and_then(|b| self.place_brand(b)) {
            Some(placed) => self.keep_in_bounds(placed, Element::Brand, height)?,
            None => None,
        };
        let floor = brand
            .as_ref()
            .map(|b| b.ink_rect().y.clamp(0, height as i32) as u32)
            .unwrap_or(height);

        // Lines that draw nothing (zero-width or format characters only) take no room.
        let mut lines: Vec<(&str, TextBox)> = wrapped
            .lines()
            .iter()
            .map(|line| (line.as_str(), headline.measure(line)))
            .filter(|(line, ink)| {
                let visible = has_ink(ink);
                if !visible {
                    debug!("Skipping headline line {:?} with no ink", line);
                }
                visible
            })
            .collect();
        let band_height = |n: usize| {
            line_height
                .saturating_mul(n as u32)
                .saturating_add(self.band_padding.saturating_mul(2))
        };

        let desired_top = match hints.text_y {
            Some(pct) => percent_of(height, pct),
            None => self.band_top,
        };
        // A hinted band may move up as far as the top edge to clear the floor.
        let highest_top = if hints.text_y.is_some() { 0 } else { desired_top };

        let mut dropped_lines = 0;
        let required = highest_top.saturating_add(band_height(lines.len()));
        if required > floor {
            match self.overflow {
                OverflowPolicy::Reject => {
                    return Err(Error::LayoutOverflow {
                        element: Element::Band,
                        lines: lines.len(),
                        required,
                        available: floor,
                    });
                }
                OverflowPolicy::Clamp => {
                    let room = floor.saturating_sub(desired_top.saturating_add(band_height(0)));
                    let fit = ((room / line_height.max(1)) as usize).min(lines.len());
                    dropped_lines = lines.len() - fit;
                    warn!(
                        "Headline needs {}px but only {}px are available; dropping {} line(s)",
                        required, floor, dropped_lines
                    );
                    lines.truncate(fit);
                }
            }
        }
        let band_top = desired_top.min(floor.saturating_sub(band_height(lines.len())));

        let band = Rect {
            x: 0,
            y: band_top as i32,
            width,
            height: band_height(lines.len()),
        };

        let span = match hints.text_x {
            Some(pct) => (width as f32 * pct / 50.0).round() as i64,
            None => width as i64,
        };
        let text_top = band.y + self.band_padding as i32;
        let lines = lines
            .iter()
            .enumerate()
            .map(|(i, (line, ink))| {
                let mut x = (span - ink.width as i64).div_euclid(2);
                if ink.width <= width {
                    x = x.clamp(0, (width - ink.width) as i64);
                }
                let origin = Point {
                    x: x as i32 - ink.left,
                    y: text_top + (i as u32 * line_height) as i32,
                };
                TextPlacement::new(line, origin, *ink, headline.ascent())
            })
            .collect::<Vec<_>>();

        let tag = match tag.and_then(|t| self.place_tag(t)) {
            Some(placed) => self.keep_in_bounds(placed, Element::Tag, floor)?,
            None => None,
        };

        debug!(
            "Layout: {} line(s), line height {}, band {}..{}",
            lines.len(),
            line_height,
            band.y,
            band.bottom()
        );

        Ok(LayoutPlan {
            canvas: self.canvas,
            band,
            line_height,
            lines,
            tag,
            brand,
            dropped_lines,
        })
    }

    fn place_tag(&self, tag: Label<'_>) -> Option<TextPlacement> {
        let ink = tag.metrics.measure(tag.text);
        if tag.text.trim().is_empty() || !has_ink(&ink) {
            return None;
        }
        let origin = Point {
            x: centered(self.canvas.width, ink.width) - ink.left,
            y: self.tag_top as i32,
        };
        Some(TextPlacement::new(tag.text, origin, ink, tag.metrics.ascent()))
    }

    fn place_brand(&self, brand: Label<'_>) -> Option<TextPlacement> {
        let ink = brand.metrics.measure(brand.text);
        if brand.text.trim().is_empty() || !has_ink(&ink) {
            return None;
        }
        let ink_x = match self.brand_anchor {
            BrandAnchor::Center => centered(self.canvas.width, ink.width),
            BrandAnchor::Right => {
                self.canvas.width as i32 - self.brand_margin as i32 - ink.width as i32
            }
        };
        let ink_bottom = self.canvas.height as i32 - self.brand_margin as i32;
        let origin = Point {
            x: ink_x - ink.left,
            y: ink_bottom - ink.height as i32 - ink.top,
        };
        Some(TextPlacement::new(brand.text, origin, ink, brand.metrics.ascent()))
    }

    /// Check a label's ink against the canvas width and `0..bottom`. Under
    /// `OverflowPolicy::Clamp` a label that does not fit is dropped.
    fn keep_in_bounds(
        &self,
        placed: TextPlacement,
        element: Element,
        bottom: u32,
    ) -> Result<Option<TextPlacement>> {
        let ink = placed.ink_rect();
        let (required, available) = if ink.x < 0 || ink.x + ink.width as i32 > self.canvas.width as i32 {
            (ink.width, self.canvas.width)
        } else if ink.y < 0 || ink.bottom() > bottom as i32 {
            (ink.bottom().max(ink.height as i32) as u32, bottom)
        } else {
            return Ok(Some(placed));
        };

        match self.overflow {
            OverflowPolicy::Reject => Err(Error::LayoutOverflow {
                element,
                lines: 0,
                required,
                available,
            }),
            OverflowPolicy::Clamp => {
                warn!(
                    "Dropping {} {:?}: needs {}px but only {}px are available",
                    element, placed.text, required, available
                );
                Ok(None)
            }
        }
    }
}

fn has_ink(ink: &TextBox) -> bool {
    ink.width > 0 && ink.height > 0
}

fn centered(outer: u32, inner: u32) -> i32 {
    (outer as i32 - inner as i32).div_euclid(2)
}

fn percent_of(total: u32, pct: f32) -> u32 {
    (total as f32 * pct / 100.0).round() as u32
}
