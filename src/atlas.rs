// src/atlas.rs

//! The glyph atlas: a single bitmap holding every glyph in a fixed-column grid
//! of `glyph_width x glyph_height` cells. Glyph index `i` lives at atlas cell
//! `(i mod columns, i div columns)`.

use crate::surface::{Image, Rect};
use anyhow::{bail, Context, Result};
use log::info;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct GlyphAtlas {
    image: Image,
    glyph_width: u32,
    glyph_height: u32,
    columns: u32,
    rows: u32,
}

impl GlyphAtlas {
    /// Loads the atlas bitmap from disk. Any decoding failure is fatal to
    /// startup, so the error carries the path for the operator.
    pub fn load(path: &Path, glyph_width: u32, glyph_height: u32) -> Result<Self> {
        let decoded = image::open(path)
            .with_context(|| format!("Failed to decode glyph atlas '{}'", path.display()))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        let image = Image::from_rgba_bytes(width, height, decoded.as_raw())?;
        let atlas = Self::from_image(image, glyph_width, glyph_height)
            .with_context(|| format!("Invalid glyph atlas '{}'", path.display()))?;
        info!(
            "GlyphAtlas: loaded '{}' ({}x{} px, {}x{} glyphs of {}x{})",
            path.display(),
            width,
            height,
            atlas.columns,
            atlas.rows,
            glyph_width,
            glyph_height
        );
        Ok(atlas)
    }

    /// Wraps an in-memory bitmap, validating that it divides into whole glyphs.
    pub fn from_image(image: Image, glyph_width: u32, glyph_height: u32) -> Result<Self> {
        if glyph_width == 0 || glyph_height == 0 {
            bail!("glyph size must be non-zero, got {}x{}", glyph_width, glyph_height);
        }
        if image.width() < glyph_width || image.height() < glyph_height {
            bail!(
                "atlas {}x{} is smaller than a single {}x{} glyph",
                image.width(),
                image.height(),
                glyph_width,
                glyph_height
            );
        }
        if image.width() % glyph_width != 0 || image.height() % glyph_height != 0 {
            bail!(
                "atlas {}x{} is not a whole multiple of the {}x{} glyph size",
                image.width(),
                image.height(),
                glyph_width,
                glyph_height
            );
        }
        Ok(Self {
            columns: image.width() / glyph_width,
            rows: image.height() / glyph_height,
            image,
            glyph_width,
            glyph_height,
        })
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn glyph_width(&self) -> u32 {
        self.glyph_width
    }

    pub fn glyph_height(&self) -> u32 {
        self.glyph_height
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Source rectangle of `glyph_index`, or `None` if its row lies past the
    /// bottom of the atlas.
    pub fn source_rect(&self, glyph_index: u32) -> Option<Rect> {
        let col = glyph_index % self.columns;
        let row = glyph_index / self.columns;
        if row >= self.rows {
            return None;
        }
        Some(Rect::new(
            col * self.glyph_width,
            row * self.glyph_height,
            self.glyph_width,
            self.glyph_height,
        ))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::GlyphAtlas;
    use crate::color::Rgba;
    use crate::surface::Image;

    /// White checkerboard atlas: a pixel is opaque when `(x + y)` is even.
    pub(crate) fn checker_atlas(
        columns: u32,
        rows: u32,
        glyph_width: u32,
        glyph_height: u32,
    ) -> GlyphAtlas {
        let width = columns * glyph_width;
        let height = rows * glyph_height;
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| {
                if (x + y) % 2 == 0 {
                    Rgba::opaque(255, 255, 255)
                } else {
                    Rgba::TRANSPARENT
                }
            })
            .collect();
        let image = Image::from_pixels(width, height, pixels).unwrap();
        GlyphAtlas::from_image(image, glyph_width, glyph_height).unwrap()
    }
}
