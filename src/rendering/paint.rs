/// Paint command list derived from a layout plan
use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::error::Element;
use crate::fonts::TextRole;
use crate::rendering::layout::{LayoutPlan, Point, TextPlacement};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// Alpha-blended rectangle
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: Rgba<u8>,
        element: Element,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        role: TextRole,
        rgba: Rgba<u8>,
        element: Element,
    },
}

/// Overlay colors as `#RRGGBB` or `#RRGGBBAA` hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub band: String,
    pub shadow: String,
    pub headline: String,
    pub tag: String,
    pub brand: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            band: "#000000BE".to_string(),
            shadow: "#000000".to_string(),
            headline: "#FFFFFF".to_string(),
            tag: "#FF0000".to_string(),
            brand: "#FFFFFF".to_string(),
        }
    }
}

/// Parse `#RRGGBB` or `#RRGGBBAA`.
pub fn parse_color(s: &str) -> Option<Rgba<u8>> {
    let s = s.trim().trim_start_matches('#');
    if s.len() != 6 && s.len() != 8 {
        return None;
    }
    let bytes = hex::decode(s).ok()?;
    let alpha = bytes.get(3).copied().unwrap_or(255);
    Some(Rgba([bytes[0], bytes[1], bytes[2], alpha]))
}

fn color_for(hex: &str, element: Element) -> Result<Rgba<u8>> {
    parse_color(hex).ok_or_else(|| Error::composition(element, format!("invalid color {:?}", hex)))
}

/// Build the ordered paint list for `plan`: band first, then tag, headline
/// lines and brand, each as a shadow copy followed by the primary copy.
pub fn display_list(plan: &LayoutPlan, palette: &Palette, shadow_offset: i32) -> Result<Vec<PaintCommand>> {
    let mut cmds = Vec::with_capacity(2 * plan.lines.len() + 5);

    cmds.push(PaintCommand::SolidRect {
        x: plan.band.x,
        y: plan.band.y,
        width: plan.band.width,
        height: plan.band.height,
        rgba: color_for(&palette.band, Element::Band)?,
        element: Element::Band,
    });

    let mut texts: Vec<(&TextPlacement, TextRole, Element, &str)> = Vec::new();
    if let Some(tag) = &plan.tag {
        texts.push((tag, TextRole::Tag, Element::Tag, palette.tag.as_str()));
    }
    for (i, line) in plan.lines.iter().enumerate() {
        texts.push((line, TextRole::Headline, Element::Headline(i), palette.headline.as_str()));
    }
    if let Some(brand) = &plan.brand {
        texts.push((brand, TextRole::Brand, Element::Brand, palette.brand.as_str()));
    }

    for (placement, role, element, primary) in texts {
        let shadow = color_for(&palette.shadow, element)?;
        let primary = color_for(primary, element)?;
        push_shadowed(&mut cmds, placement, role, element, shadow, primary, shadow_offset);
    }

    Ok(cmds)
}

// Shadow must be painted before the primary copy or it covers the glyphs.
fn push_shadowed(
    cmds: &mut Vec<PaintCommand>,
    placement: &TextPlacement,
    role: TextRole,
    element: Element,
    shadow: Rgba<u8>,
    primary: Rgba<u8>,
    offset: i32,
) {
    let Point { x, y } = placement.origin;
    cmds.push(PaintCommand::Text {
        x: x + offset,
        y: y + offset,
        text: placement.text.clone(),
        role,
        rgba: shadow,
        element,
    });
    cmds.push(PaintCommand::Text {
        x,
        y,
        text: placement.text.clone(),
        role,
        rgba: primary,
        element,
    });
}
