//! Font resolution and glyph metrics.
//!
//! A [`FontFace`] is a parsed font resource shared read-only between renders.
//! A [`FontSpec`] pins a face to one pixel size and answers measurement
//! queries from the exact glyph layout the rasterizer later draws, so a width
//! reported here is the width that ends up on the canvas.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use rusttype::{point, Font, PositionedGlyph, Scale};
use serde::Serialize;

use crate::{Error, Result};

/// Faces loaded from disk, keyed by path. Written only on first load of a path.
static FACE_CACHE: Lazy<RwLock<HashMap<PathBuf, FontFace>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Ink bounding box of a string, relative to the draw origin (top of the
/// ascent line, left edge of the pen).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextBox {
    pub width: u32,
    pub height: u32,
    /// Horizontal offset from the origin to the first inked column
    pub left: i32,
    /// Vertical offset from the origin to the first inked row
    pub top: i32,
}

/// Measurement queries the wrapper and layout engine need from a font.
pub trait TextMeasure {
    /// Ink bounding box of `text` drawn at the origin.
    fn measure(&self, text: &str) -> TextBox;

    /// Uniform line advance (ascent to descent span), fixed per font size.
    fn line_height(&self) -> u32;

    /// Distance from the draw origin to the baseline.
    fn ascent(&self) -> u32;
}

/// A parsed font resource. Cloning is cheap.
#[derive(Clone)]
pub struct FontFace {
    font: Arc<Font<'static>>,
    source: String,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace").field("source", &self.source).finish()
    }
}

impl FontFace {
    /// Parse a face from raw TrueType/OpenType bytes.
    pub fn from_bytes(bytes: Vec<u8>, source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let font = Font::try_from_vec(bytes).ok_or_else(|| Error::FontLoad {
            tried: vec![source.clone()],
            reason: "not a TrueType/OpenType font".into(),
        })?;
        Ok(Self {
            font: Arc::new(font),
            source,
        })
    }

    /// Read and parse a face from disk, bypassing the process cache.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| Error::FontLoad {
            tried: vec![path.display().to_string()],
            reason: e.to_string(),
        })?;
        Self::from_bytes(bytes, path.display().to_string())
    }

    /// Like [`FontFace::load`], but reuses a face already loaded by this process.
    pub fn load_cached(path: &Path) -> Result<Self> {
        if let Some(face) = FACE_CACHE
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
        {
            return Ok(face.clone());
        }

        let face = Self::load(path)?;
        FACE_CACHE
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.to_path_buf())
            .or_insert_with(|| face.clone());
        Ok(face)
    }

    /// Where the face was loaded from (a path, or a caller-supplied label).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Pin this face to a pixel size.
    pub fn at(&self, size: f32) -> FontSpec {
        FontSpec::new(self.clone(), size)
    }
}

/// Resolve the first usable face from a prioritized candidate list.
///
/// Called once at startup; the engine never probes the filesystem itself.
pub fn resolve_face(candidates: &[PathBuf]) -> Result<FontFace> {
    let mut tried = Vec::new();
    let mut reason = String::from("no font candidates configured");

    for path in candidates {
        match FontFace::load_cached(path) {
            Ok(face) => {
                if !tried.is_empty() {
                    warn!(
                        "Using fallback font {} after {} unusable candidate(s): {:?}",
                        path.display(),
                        tried.len(),
                        tried
                    );
                }
                info!("Resolved font {}", face.source());
                return Ok(face);
            }
            Err(e) => {
                debug!("Font candidate {} rejected: {}", path.display(), e);
                tried.push(path.display().to_string());
                reason = e.to_string();
            }
        }
    }

    Err(Error::FontLoad { tried, reason })
}

/// Candidates tried when the configuration does not name any: the bundled
/// font first, then common system locations of a bold sans.
pub fn default_font_candidates() -> Vec<PathBuf> {
    [
        "assets/fonts/Arial-Bold.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
        "/Library/Fonts/Arial Bold.ttf",
        "C:\\Windows\\Fonts\\arialbd.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

/// A face at a fixed pixel size. Immutable once built.
#[derive(Debug, Clone)]
pub struct FontSpec {
    face: FontFace,
    size: f32,
    ascent: u32,
    line_height: u32,
}

impl FontSpec {
    fn new(face: FontFace, size: f32) -> Self {
        let v = face.font.v_metrics(Scale::uniform(size));
        Self {
            face,
            size,
            ascent: v.ascent.round().max(0.0) as u32,
            line_height: (v.ascent - v.descent).ceil().max(1.0) as u32,
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn face(&self) -> &FontFace {
        &self.face
    }

    /// Glyphs of `text` positioned for a draw origin at `(x, y)`.
    pub(crate) fn glyphs_at(&self, text: &str, x: i32, y: i32) -> Vec<PositionedGlyph<'static>> {
        let start = point(x as f32, (y + self.ascent as i32) as f32);
        self.face
            .font
            .layout(text, Scale::uniform(self.size), start)
            .collect()
    }
}

impl TextMeasure for FontSpec {
    fn measure(&self, text: &str) -> TextBox {
        let mut bounds: Option<(i32, i32, i32, i32)> = None;
        for glyph in self.glyphs_at(text, 0, 0) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                bounds = Some(match bounds {
                    None => (bb.min.x, bb.min.y, bb.max.x, bb.max.y),
                    Some((x0, y0, x1, y1)) => (
                        x0.min(bb.min.x),
                        y0.min(bb.min.y),
                        x1.max(bb.max.x),
                        y1.max(bb.max.y),
                    ),
                });
            }
        }

        match bounds {
            Some((x0, y0, x1, y1)) => TextBox {
                width: (x1 - x0) as u32,
                height: (y1 - y0) as u32,
                left: x0,
                top: y0,
            },
            None => TextBox::default(),
        }
    }

    fn line_height(&self) -> u32 {
        self.line_height
    }

    fn ascent(&self) -> u32 {
        self.ascent
    }
}

/// Fixed-advance metrics: every char is `advance` pixels wide and fills the
/// whole line box. Useful for layout previews without a font resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonospaceMetrics {
    pub advance: u32,
    pub line_height: u32,
}

impl MonospaceMetrics {
    pub fn new(advance: u32, line_height: u32) -> Self {
        Self {
            advance,
            line_height,
        }
    }
}

impl TextMeasure for MonospaceMetrics {
    fn measure(&self, text: &str) -> TextBox {
        let chars = text.chars().count() as u32;
        if chars == 0 {
            return TextBox::default();
        }
        TextBox {
            width: chars * self.advance,
            height: self.line_height,
            left: 0,
            top: 0,
        }
    }

    fn line_height(&self) -> u32 {
        self.line_height
    }

    fn ascent(&self) -> u32 {
        self.line_height
    }
}

/// Which text element a font or paint command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextRole {
    Tag,
    Headline,
    Brand,
}

/// The three independent font sizes used by one render.
#[derive(Debug, Clone)]
pub struct ElementFonts {
    pub headline: FontSpec,
    pub tag: FontSpec,
    pub brand: FontSpec,
}

impl ElementFonts {
    pub fn get(&self, role: TextRole) -> &FontSpec {
        match role {
            TextRole::Tag => &self.tag,
            TextRole::Headline => &self.headline,
            TextRole::Brand => &self.brand,
        }
    }
}
