//! Error types for the post compositor

use std::fmt;

use thiserror::Error;

/// Result type alias for compositor operations
pub type Result<T> = std::result::Result<T, Error>;

/// The drawing element a composition failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Band,
    Tag,
    /// Headline line, zero-based.
    Headline(usize),
    Brand,
    Encode,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Band => f.write_str("band"),
            Element::Tag => f.write_str("tag"),
            Element::Headline(i) => write!(f, "headline line {}", i),
            Element::Brand => f.write_str("brand"),
            Element::Encode => f.write_str("encoder"),
        }
    }
}

/// Errors that can occur while building a post
#[derive(Error, Debug)]
pub enum Error {
    /// No font candidate could be opened or parsed
    #[error("Failed to load font (tried {tried:?}): {reason}")]
    FontLoad { tried: Vec<String>, reason: String },

    /// Background bytes are not a decodable raster
    #[error("Failed to decode background image: {0}")]
    ImageDecode(String),

    /// An element does not fit on the canvas. `required` and `available` are
    /// extents in pixels along the axis that overflowed; for the band that is
    /// the space above the brand. `lines` is the headline line count, zero
    /// for the tag and brand.
    #[error("Layout overflow at {element}: needs {required}px but only {available}px are available")]
    LayoutOverflow {
        element: Element,
        lines: usize,
        required: u32,
        available: u32,
    },

    /// A drawing or encoding stage failed
    #[error("Composition failed at {element}: {reason}")]
    Composition { element: Element, reason: String },

    /// A position hint is not a 0-100 percentage
    #[error("Position {name}={value} is outside 0-100")]
    InvalidPosition { name: &'static str, value: f32 },

    /// Template lookup failed
    #[error("Template error: {0}")]
    Template(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The render service has shut down
    #[error("Render service unavailable: {0}")]
    Service(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn composition(element: Element, reason: impl Into<String>) -> Self {
        Error::Composition {
            element,
            reason: reason.into(),
        }
    }

    /// Stable, machine-readable name used in structured failure responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::FontLoad { .. } => "font_load",
            Error::ImageDecode(_) => "image_decode",
            Error::LayoutOverflow { .. } => "layout_overflow",
            Error::Composition { .. } => "composition",
            Error::InvalidPosition { .. } => "invalid_position",
            Error::Template(_) => "template",
            Error::Config(_) => "config",
            Error::Service(_) => "service",
            Error::Io(_) => "io",
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageDecode(err.to_string())
    }
}
