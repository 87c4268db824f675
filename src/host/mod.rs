// src/host/mod.rs

//! Host-side state behind the module's imports.
//!
//! `HostContext` owns the tint cache, the current terminal surface and its
//! backing pixels, and the viewport layout. It implements `HostImports`, so
//! the module's `initTerm`, `flushTerm` and log calls land here.

pub mod log_bridge;


use crate::compositor::{CellView, GridCompositor};
use crate::module::HostImports;
use crate::surface::{PixelSurface, TerminalSurface};
use crate::tint::TintCache;
use crate::viewport::ViewportLayout;
use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};
use log_bridge::LogChannel;
use std::path::Path;

/// Largest backing surface edge, in pixels, `initTerm` will allocate.
pub const MAX_SURFACE_EDGE_PX: u32 = 16_384;

/// Values `HostContext` takes from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostSettings {
    pub whitespace_glyph: u32,
    pub max_scale: f64,
}

pub struct HostContext {
    tints: TintCache,
    compositor: GridCompositor,
    surface: Option<TerminalSurface>,
    canvas: PixelSurface,
    viewport: (u32, u32),
    layout: Option<ViewportLayout>,
    max_scale: f64,
    flushes: u64,
}

impl HostContext {
    pub fn new(tints: TintCache, settings: HostSettings, viewport: (u32, u32)) -> Self {
        Self {
            tints,
            compositor: GridCompositor::new(settings.whitespace_glyph),
            surface: None,
            canvas: PixelSurface::new(0, 0),
            viewport,
            layout: None,
            max_scale: settings.max_scale,
            flushes: 0,
        }
    }

    /// The current terminal surface, once the module has called `initTerm`.
    pub fn surface(&self) -> Option<&TerminalSurface> {
        self.surface.as_ref()
    }

    pub fn layout(&self) -> Option<&ViewportLayout> {
        self.layout.as_ref()
    }

    pub fn canvas(&self) -> &PixelSurface {
        &self.canvas
    }

    pub fn tint_cache(&self) -> &TintCache {
        &self.tints
    }

    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Records a new viewport size and refits the surface into it.
    pub fn resize_viewport(&mut self, width_px: u32, height_px: u32) {
        self.viewport = (width_px, height_px);
        self.refit();
    }

    /// Writes the backing surface to `path` as PNG.
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        let image = self.canvas.image();
        let buffer = image::RgbaImage::from_raw(image.width(), image.height(), image.to_rgba_bytes())
            .ok_or_else(|| anyhow!("surface pixel buffer does not match its size"))?;
        buffer
            .save(path)
            .with_context(|| format!("Failed to write snapshot '{}'", path.display()))?;
        info!(
            "HostContext: wrote {}x{} snapshot to '{}'",
            image.width(),
            image.height(),
            path.display()
        );
        Ok(())
    }

    fn refit(&mut self) {
        self.layout = self.surface.as_ref().map(|surface| {
            ViewportLayout::fit(self.viewport.0, self.viewport.1, surface, self.max_scale)
        });
    }
}

impl HostImports for HostContext {
    fn print(&mut self, memory: &[u8], pointer: u32, length: u32, level: u32) {
        log_bridge::forward(memory, pointer, length, level);
    }

    fn print_error(&mut self, memory: &[u8], pointer: u32, length: u32) {
        log_bridge::forward_to(memory, pointer, length, LogChannel::Error);
    }

    fn init_term(&mut self, width_cells: u32, height_cells: u32) {
        let atlas = self.tints.atlas();
        let (glyph_width, glyph_height) = (atlas.glyph_width(), atlas.glyph_height());
        let width_px = width_cells.checked_mul(glyph_width);
        let height_px = height_cells.checked_mul(glyph_height);
        let (width_px, height_px) = match (width_px, height_px) {
            (Some(w), Some(h)) if w <= MAX_SURFACE_EDGE_PX && h <= MAX_SURFACE_EDGE_PX => (w, h),
            _ => {
                error!(
                    "initTerm: {}x{} cells does not fit a {}px surface. Keeping the current surface.",
                    width_cells, height_cells, MAX_SURFACE_EDGE_PX
                );
                return;
            }
        };
        if width_cells == 0 || height_cells == 0 {
            warn!("initTerm: empty terminal of {}x{} cells", width_cells, height_cells);
        }

        let surface = TerminalSurface::new(width_cells, height_cells, glyph_width, glyph_height);
        self.surface = Some(surface);
        self.canvas = PixelSurface::new(width_px, height_px);
        self.refit();
        info!(
            "initTerm: {}x{} cells, {}x{} px surface, scale {:.3}",
            width_cells,
            height_cells,
            width_px,
            height_px,
            self.layout.map_or(0.0, |layout| layout.scale)
        );
    }

    fn flush_term(&mut self, memory: &[u8], pointer: u32, length: u32) {
        let Some(surface) = self.surface.as_ref() else {
            warn!("flushTerm: called before initTerm. Ignoring.");
            return;
        };
        let cells = match CellView::new(memory, pointer, length) {
            Ok(cells) => cells,
            Err(e) => {
                error!("flushTerm: {}. Skipping flush.", e);
                return;
            }
        };
        self.compositor
            .flush(&mut self.canvas, &mut self.tints, surface, &cells);
        self.flushes += 1;
    }
}
