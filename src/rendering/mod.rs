//! Text layout and composition engine

pub mod layout;
pub mod paint;
pub mod raster;
pub mod wrap;

use base64::Engine as Base64Engine;
use sha2::{Digest, Sha256};

/// A finished post: a PNG of exactly `width` x `height` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPost {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl RenderedPost {
    /// Self-describing `data:image/png;base64,...` string.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png_data)
        )
    }

    /// Hex SHA-256 of the encoded PNG.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.png_data))
    }
}
