// src/surface.rs

//! The pixel side of the host: the `TerminalSurface` geometry established by
//! `initTerm`, the `Image` buffer shared by atlases and surfaces, and the
//! `Canvas` drawing trait the compositor renders through.
//!
//! `PixelSurface` is the software implementation of `Canvas`. Tests substitute
//! recording canvases to observe the exact sequence of draw calls.

use crate::color::{PackedColor, Rgba};
use anyhow::{bail, Result};

/// A rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Grid geometry of the current terminal surface.
///
/// Created (or replaced) once per `initTerm` call. The backing pixel surface
/// is always `width_cells * glyph_width` by `height_cells * glyph_height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSurface {
    pub width_cells: u32,
    pub height_cells: u32,
    pub glyph_width: u32,
    pub glyph_height: u32,
}

impl TerminalSurface {
    pub fn new(width_cells: u32, height_cells: u32, glyph_width: u32, glyph_height: u32) -> Self {
        Self {
            width_cells,
            height_cells,
            glyph_width,
            glyph_height,
        }
    }

    pub fn pixel_width(&self) -> u32 {
        self.width_cells.saturating_mul(self.glyph_width)
    }

    pub fn pixel_height(&self) -> u32 {
        self.height_cells.saturating_mul(self.glyph_height)
    }

    pub fn cell_count(&self) -> usize {
        self.width_cells as usize * self.height_cells as usize
    }

    /// Destination rectangle of the cell at grid position `(x, y)`.
    pub fn cell_rect(&self, x: u32, y: u32) -> Rect {
        Rect::new(
            x * self.glyph_width,
            y * self.glyph_height,
            self.glyph_width,
            self.glyph_height,
        )
    }
}

/// A straight-alpha RGBA image stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Image {
    /// Creates a fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            bail!(
                "image of {}x{} needs {} pixels, got {}",
                width,
                height,
                expected,
                pixels.len()
            );
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Builds an image from tightly packed RGBA8 bytes.
    pub fn from_rgba_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 4 != 0 {
            bail!("RGBA byte length {} is not a multiple of 4", bytes.len());
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|px| Rgba::new(px[0], px[1], px[2], px[3]))
            .collect();
        Self::from_pixels(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|px| px.to_bytes()).collect()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Drawing primitives the grid compositor needs from a destination surface.
pub trait Canvas {
    /// Resets every pixel to fully transparent.
    fn clear(&mut self);

    /// Fills `rect` with an opaque colour. Parts outside the canvas are clipped.
    fn fill_rect(&mut self, rect: Rect, color: PackedColor);

    /// Composites the `src` region of `image` at `(dst_x, dst_y)` with
    /// source-over blending. Parts outside either image are clipped.
    fn draw_image(&mut self, image: &Image, src: Rect, dst_x: u32, dst_y: u32);
}

/// Software RGBA surface backing the terminal.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    image: Image,
}

impl PixelSurface {
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            image: Image::new(width_px, height_px),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width
    }

    pub fn height(&self) -> u32 {
        self.image.height
    }

    pub fn image(&self) -> &Image {
        &self.image
    }
}

impl Canvas for PixelSurface {
    fn clear(&mut self) {
        self.image.pixels.fill(Rgba::TRANSPARENT);
    }

    fn fill_rect(&mut self, rect: Rect, color: PackedColor) {
        let rgba = color.to_rgba();
        let x_end = rect.x.saturating_add(rect.width).min(self.image.width);
        let y_end = rect.y.saturating_add(rect.height).min(self.image.height);
        for y in rect.y..y_end {
            let row_start = self.image.index(rect.x.min(x_end), y);
            let row_end = self.image.index(x_end, y);
            self.image.pixels[row_start..row_end].fill(rgba);
        }
    }

    fn draw_image(&mut self, image: &Image, src: Rect, dst_x: u32, dst_y: u32) {
        let width = src
            .width
            .min(image.width.saturating_sub(src.x))
            .min(self.image.width.saturating_sub(dst_x));
        let height = src
            .height
            .min(image.height.saturating_sub(src.y))
            .min(self.image.height.saturating_sub(dst_y));

        for row in 0..height {
            for col in 0..width {
                let src_px = image.pixels[image.index(src.x + col, src.y + row)];
                if src_px.a == 0 {
                    continue;
                }
                let dst_idx = self.image.index(dst_x + col, dst_y + row);
                let dst_px = self.image.pixels[dst_idx];
                self.image.pixels[dst_idx] = src_px.over(dst_px);
            }
        }
    }
}
