// src/tint.rs

//! Re-tinted copies of the glyph atlas, one per foreground colour.
//!
//! Entries are keyed by the packed colour value and are never evicted: the
//! palette a simulation draws with is small and fixed, so the cache stays
//! bounded by the number of distinct colours actually used.

use crate::atlas::GlyphAtlas;
use crate::color::{PackedColor, Rgba};
use crate::surface::Image;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How an opaque atlas pixel is recoloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TintMode {
    /// Every non-transparent pixel becomes exactly the tint colour; alpha is kept.
    #[default]
    Mask,
    /// Pixel colour is multiplied by the tint colour; alpha is kept. Identical
    /// to `Mask` for a pure white atlas.
    Multiply,
}

pub struct TintCache {
    atlas: GlyphAtlas,
    mode: TintMode,
    entries: HashMap<PackedColor, Image>,
    generated: usize,
}

impl TintCache {
    pub fn new(atlas: GlyphAtlas, mode: TintMode) -> Self {
        Self {
            atlas,
            mode,
            entries: HashMap::new(),
            generated: 0,
        }
    }

    /// The untinted base atlas.
    pub fn atlas(&self) -> &GlyphAtlas {
        &self.atlas
    }

    /// Returns the atlas tinted to `color`, building it on first request.
    pub fn tinted(&mut self, color: PackedColor) -> &Image {
        let base = self.atlas.image();
        let mode = self.mode;
        let generated = &mut self.generated;
        self.entries.entry(color).or_insert_with(|| {
            debug!("TintCache: building atlas tinted to {}", color);
            *generated += 1;
            tint_image(base, color, mode)
        })
    }

    #[cfg(test)]
    pub fn contains(&self, color: PackedColor) -> bool {
        self.entries.contains_key(&color)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of tinted atlases built so far. Equals `len()` since entries
    /// are never evicted; exposed so callers can observe cache hits.
    pub fn generated(&self) -> usize {
        self.generated
    }
}

fn tint_image(base: &Image, color: PackedColor, mode: TintMode) -> Image {
    let fill = color.to_rgba();
    let pixels = base
        .pixels()
        .iter()
        .map(|px| match (px.a, mode) {
            (0, _) => Rgba::TRANSPARENT,
            (a, TintMode::Mask) => Rgba::new(fill.r, fill.g, fill.b, a),
            (a, TintMode::Multiply) => Rgba::new(
                multiply(px.r, fill.r),
                multiply(px.g, fill.g),
                multiply(px.b, fill.b),
                a,
            ),
        })
        .collect();
    Image::from_pixels(base.width(), base.height(), pixels)
        .unwrap_or_else(|_| Image::new(base.width(), base.height()))
}

fn multiply(a: u8, b: u8) -> u8 {
    ((a as u16 * b as u16 + 127) / 255) as u8
}
