// src/compositor.rs

//! The grid compositor: turns the module's packed cell buffer into pixels.
//!
//! The cell buffer is a row-major array of `(glyph, foreground, background)`
//! triples of little-endian 32-bit integers living in module memory. A
//! `CellView` over it is built fresh for every flush and borrows the memory
//! slice of that one call, so it cannot be kept past it.
//!
//! Every flush clears the whole surface and redraws every cell; there is no
//! dirty tracking.

use crate::color::PackedColor;
use crate::module::{region, RegionError};
use crate::surface::{Canvas, TerminalSurface};
use crate::tint::TintCache;
use log::{debug, trace, warn};

/// Number of 32-bit elements per cell.
pub const CELL_STRIDE: usize = 3;

const ELEMENT_BYTES: usize = 4;

/// One grid cell as written by the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRecord {
    pub glyph: i32,
    pub fg: PackedColor,
    /// `None` when the raw background element is `<= 0`.
    pub bg: Option<PackedColor>,
}

/// Read-only view of the cell elements for the duration of one flush.
#[derive(Debug, Clone, Copy)]
pub struct CellView<'mem> {
    bytes: &'mem [u8],
}

impl<'mem> CellView<'mem> {
    /// Borrows `length` elements at `pointer` from `memory`.
    pub fn new(memory: &'mem [u8], pointer: u32, length: u32) -> Result<Self, RegionError> {
        let byte_len = (length as usize).saturating_mul(ELEMENT_BYTES);
        let bytes = region(memory, pointer, byte_len)?;
        Ok(Self { bytes })
    }

    /// Length in 32-bit elements.
    pub fn len(&self) -> usize {
        self.bytes.len() / ELEMENT_BYTES
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn element(&self, index: usize) -> Option<i32> {
        let start = index.checked_mul(ELEMENT_BYTES)?;
        let raw = self.bytes.get(start..start + ELEMENT_BYTES)?;
        Some(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    /// The cell at row-major `index`, or `None` if any of its three elements
    /// lies past the end of the view.
    pub fn cell(&self, index: usize) -> Option<CellRecord> {
        let base = index.checked_mul(CELL_STRIDE)?;
        let raw_bg = self.element(base + 2)?;
        Some(CellRecord {
            glyph: self.element(base)?,
            fg: PackedColor::from_cell_value(self.element(base + 1)?),
            // Fill is decided on the raw value; masking comes after.
            bg: (raw_bg > 0).then(|| PackedColor::from_cell_value(raw_bg)),
        })
    }
}

pub struct GridCompositor {
    whitespace_glyph: i32,
}

impl GridCompositor {
    pub fn new(whitespace_glyph: u32) -> Self {
        Self {
            whitespace_glyph: whitespace_glyph as i32,
        }
    }

    /// Glyphs that are never blitted: index 0, the whitespace glyph, and
    /// negative indices.
    fn is_blank(&self, glyph: i32) -> bool {
        glyph <= 0 || glyph == self.whitespace_glyph
    }

    /// Repaints `canvas` from `cells`.
    ///
    /// A view whose length disagrees with the surface is tolerated: cells
    /// whose elements are all present are drawn, the rest are skipped.
    /// A glyph whose atlas row does not exist is skipped; its background is
    /// still filled.
    pub fn flush(
        &self,
        canvas: &mut dyn Canvas,
        tints: &mut TintCache,
        surface: &TerminalSurface,
        cells: &CellView<'_>,
    ) {
        canvas.clear();

        let expected = surface.cell_count() * CELL_STRIDE;
        if cells.len() != expected {
            warn!(
                "GridCompositor: cell buffer has {} elements, expected {} for {}x{}. Drawing complete cells only.",
                cells.len(),
                expected,
                surface.width_cells,
                surface.height_cells
            );
        }

        let mut fills = 0usize;
        let mut blits = 0usize;

        'rows: for y in 0..surface.height_cells {
            for x in 0..surface.width_cells {
                let index = y as usize * surface.width_cells as usize + x as usize;
                let Some(cell) = cells.cell(index) else {
                    break 'rows;
                };
                let dst = surface.cell_rect(x, y);

                if let Some(bg) = cell.bg {
                    canvas.fill_rect(dst, bg);
                    fills += 1;
                }

                if self.is_blank(cell.glyph) {
                    continue;
                }

                let Some(src) = tints.atlas().source_rect(cell.glyph as u32) else {
                    debug!(
                        "GridCompositor: glyph {} at ({}, {}) is outside the atlas. Skipping.",
                        cell.glyph, x, y
                    );
                    continue;
                };
                let tinted = tints.tinted(cell.fg);
                canvas.draw_image(tinted, src, dst.x, dst.y);
                blits += 1;
            }
        }

        trace!(
            "GridCompositor: flushed {}x{} cells ({} fills, {} blits)",
            surface.width_cells,
            surface.height_cells,
            fills,
            blits
        );
    }
}

#[cfg(test)]
mod tests;
