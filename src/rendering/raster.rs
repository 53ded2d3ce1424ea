/// Canvas compositor: background resampling, band fill, glyph drawing, PNG encoding

use std::io::Cursor;

use image::imageops::FilterType;
use image::{ImageFormat, Rgba, RgbaImage};
use log::debug;

use crate::error::Element;
use crate::fonts::{ElementFonts, FontSpec, TextMeasure};
use crate::rendering::layout::LayoutPlan;
use crate::rendering::paint::{display_list, PaintCommand, Palette};
use crate::rendering::RenderedPost;
use crate::{CanvasSize, Error, Result};

/// Owns the canvas of exactly one render.
pub struct Compositor {
    canvas: RgbaImage,
}

impl Compositor {
    /// Decode `background` and force-fit it to `size`, ignoring aspect ratio.
    pub fn with_background(background: &[u8], size: CanvasSize) -> Result<Self> {
        let decoded = image::load_from_memory(background)?;
        debug!(
            "Resampling {}x{} background to {}x{}",
            decoded.width(),
            decoded.height(),
            size.width,
            size.height
        );
        let canvas = image::imageops::resize(&decoded.to_rgba8(), size.width, size.height, FilterType::Triangle);
        Ok(Self { canvas })
    }

    /// A canvas filled with one color.
    pub fn blank(size: CanvasSize, rgba: Rgba<u8>) -> Self {
        Self {
            canvas: RgbaImage::from_pixel(size.width, size.height, rgba),
        }
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_canvas(self) -> RgbaImage {
        self.canvas
    }

    /// Alpha-blend a rectangle, clipped to the canvas.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, rgba: Rgba<u8>) {
        let x0 = x.max(0) as u32;
        let y0 = y.max(0) as u32;
        let x1 = (x as i64 + width as i64).clamp(0, self.canvas.width() as i64) as u32;
        let y1 = (y as i64 + height as i64).clamp(0, self.canvas.height() as i64) as u32;
        let coverage = rgba.0[3] as f32 / 255.0;
        for py in y0..y1 {
            for px in x0..x1 {
                blend(self.canvas.get_pixel_mut(px, py), rgba, coverage);
            }
        }
    }

    /// Draw `text` with its origin (pen left, ascent top) at `(x, y)`.
    /// Returns the number of canvas pixels touched.
    pub fn draw_text(&mut self, font: &FontSpec, x: i32, y: i32, text: &str, rgba: Rgba<u8>) -> usize {
        let (w, h) = (self.canvas.width() as i32, self.canvas.height() as i32);
        let alpha = rgba.0[3] as f32 / 255.0;
        let mut touched = 0;

        for glyph in font.glyphs_at(text, x, y) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, v| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 || px >= w || py >= h || v <= 0.0 {
                    return;
                }
                blend(self.canvas.get_pixel_mut(px as u32, py as u32), rgba, v * alpha);
                touched += 1;
            });
        }
        touched
    }

    /// Apply paint commands in order. Text with no ink is skipped; text whose
    /// ink lands entirely off the canvas is a composition error.
    pub fn execute(&mut self, commands: &[PaintCommand], fonts: &ElementFonts) -> Result<()> {
        for cmd in commands {
            match cmd {
                PaintCommand::SolidRect {
                    x,
                    y,
                    width,
                    height,
                    rgba,
                    ..
                } => self.fill_rect(*x, *y, *width, *height, *rgba),
                PaintCommand::Text {
                    x,
                    y,
                    text,
                    role,
                    rgba,
                    element,
                } => {
                    let font = fonts.get(*role);
                    let touched = self.draw_text(font, *x, *y, text, *rgba);
                    if touched > 0 {
                        continue;
                    }
                    let ink = font.measure(text);
                    if ink.width == 0 || ink.height == 0 {
                        debug!("Nothing to draw for {:?} at {}", text, element);
                    } else {
                        return Err(Error::composition(
                            *element,
                            format!("{:?} at ({}, {}) left no ink on the canvas", text, x, y),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Serialize the canvas as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.canvas
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| Error::composition(Element::Encode, e.to_string()))?;
        Ok(buf)
    }
}

fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: f32) {
    let a = coverage.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let inv = 1.0 - a;
    for c in 0..3 {
        dst.0[c] = (src.0[c] as f32 * a + dst.0[c] as f32 * inv).round() as u8;
    }
    dst.0[3] = (255.0 * a + dst.0[3] as f32 * inv).round() as u8;
}

/// Composite `plan` over `background` and encode the result.
///
/// Pure: the output depends only on the arguments.
pub fn render(
    background: &[u8],
    plan: &LayoutPlan,
    fonts: &ElementFonts,
    palette: &Palette,
    shadow_offset: i32,
) -> Result<RenderedPost> {
    let commands = display_list(plan, palette, shadow_offset)?;
    let mut compositor = Compositor::with_background(background, plan.canvas)?;
    compositor.execute(&commands, fonts)?;
    let png_data = compositor.encode_png()?;
    Ok(RenderedPost {
        width: plan.canvas.width,
        height: plan.canvas.height,
        png_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_of(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        buf
    }

    #[test]
    fn background_is_force_fit() {
        let wide = RgbaImage::from_pixel(300, 100, Rgba([10, 20, 30, 255]));
        let size = CanvasSize { width: 64, height: 64 };
        let c = Compositor::with_background(&png_of(&wide), size).unwrap();
        assert_eq!(c.canvas().dimensions(), (64, 64));
        assert_eq!(*c.canvas().get_pixel(10, 10), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn undecodable_background_is_image_decode_error() {
        let err = Compositor::with_background(b"definitely not an image", CanvasSize::default())
            .err()
            .unwrap();
        assert_eq!(err.kind(), "image_decode");
    }

    #[test]
    fn fill_rect_blends_and_clips() {
        let size = CanvasSize { width: 10, height: 10 };
        let mut c = Compositor::blank(size, Rgba([200, 200, 200, 255]));
        c.fill_rect(-5, 8, 100, 100, Rgba([0, 0, 0, 190]));
        let inside = c.canvas().get_pixel(3, 9);
        let outside = c.canvas().get_pixel(3, 7);
        assert_eq!(*outside, Rgba([200, 200, 200, 255]));
        assert!(inside.0[0] < 60);
        assert_eq!(inside.0[3], 255);
    }

    fn system_fonts() -> Option<ElementFonts> {
        let face = crate::fonts::resolve_face(&crate::fonts::default_font_candidates()).ok()?;
        Some(ElementFonts {
            headline: face.at(84.0),
            tag: face.at(42.0),
            brand: face.at(36.0),
        })
    }

    fn text_at(x: i32, y: i32, text: &str) -> PaintCommand {
        PaintCommand::Text {
            x,
            y,
            text: text.to_string(),
            role: crate::fonts::TextRole::Headline,
            rgba: Rgba([255, 255, 255, 255]),
            element: Element::Headline(0),
        }
    }

    #[test]
    fn zero_width_text_draws_nothing_without_error() {
        let Some(fonts) = system_fonts() else {
            println!("No system font available; skipping");
            return;
        };
        let mut c = Compositor::blank(CanvasSize::default(), Rgba([9, 9, 9, 255]));
        c.execute(&[text_at(500, 50, "\u{200B}"), text_at(500, 50, "\u{2060}\u{200D}")], &fonts)
            .unwrap();
        if fonts.headline.measure("\u{200B}\u{2060}\u{200D}") == Default::default() {
            assert!(c.canvas().pixels().all(|p| *p == Rgba([9, 9, 9, 255])));
        }
    }

    #[test]
    fn visible_text_off_canvas_is_composition_error() {
        let Some(fonts) = system_fonts() else {
            println!("No system font available; skipping");
            return;
        };
        let mut c = Compositor::blank(CanvasSize::default(), Rgba([0, 0, 0, 255]));
        let err = c.execute(&[text_at(5000, 50, "HELLO")], &fonts).unwrap_err();
        assert!(matches!(
            err,
            Error::Composition {
                element: Element::Headline(0),
                ..
            }
        ));
    }

    #[test]
    fn encodes_png_signature() {
        let c = Compositor::blank(CanvasSize { width: 4, height: 4 }, Rgba([0, 0, 0, 255]));
        let png = c.encode_png().unwrap();
        assert_eq!(&png[0..8], b"\x89PNG\r\n\x1a\n");
    }
}
