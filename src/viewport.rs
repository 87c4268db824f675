// src/viewport.rs

//! Fitting the terminal surface into the viewport, and mapping device
//! coordinates back into grid cells.
//!
//! The scale is uniform on both axes and bounded by a configured maximum. The
//! scaled surface is centred in the viewport.

use crate::surface::TerminalSurface;

/// `min(viewport_w / surface_w, viewport_h / surface_h, max_scale)`.
pub fn compute_scale(
    viewport_width: f64,
    viewport_height: f64,
    surface_width: f64,
    surface_height: f64,
    max_scale: f64,
) -> f64 {
    let scale_x = viewport_width / surface_width;
    let scale_y = viewport_height / surface_height;
    scale_x.min(scale_y).min(max_scale)
}

/// Where the scaled surface sits in the viewport. Recomputed, never
/// persisted, whenever the viewport or the surface changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportLayout {
    pub scale: f64,
    /// On-screen top-left of the surface, in device pixels.
    pub origin_x: f64,
    pub origin_y: f64,
    /// On-screen size of the surface, in device pixels.
    pub display_width: f64,
    pub display_height: f64,
    glyph_width: u32,
    glyph_height: u32,
}

impl ViewportLayout {
    pub fn fit(
        viewport_width: u32,
        viewport_height: u32,
        surface: &TerminalSurface,
        max_scale: f64,
    ) -> Self {
        let surface_width = surface.pixel_width() as f64;
        let surface_height = surface.pixel_height() as f64;
        let scale = compute_scale(
            viewport_width as f64,
            viewport_height as f64,
            surface_width,
            surface_height,
            max_scale,
        );
        let display_width = surface_width * scale;
        let display_height = surface_height * scale;
        Self {
            scale,
            origin_x: (viewport_width as f64 - display_width) / 2.0,
            origin_y: (viewport_height as f64 - display_height) / 2.0,
            display_width,
            display_height,
            glyph_width: surface.glyph_width,
            glyph_height: surface.glyph_height,
        }
    }

    /// Converts a device-space point into a grid cell.
    ///
    /// Points outside the surface map to out-of-range cells; they are legal
    /// and returned as-is. A degenerate (zero) scale saturates instead of
    /// panicking.
    pub fn screen_to_grid(&self, device_x: f64, device_y: f64) -> (i32, i32) {
        let local_x = (device_x - self.origin_x) / self.scale;
        let local_y = (device_y - self.origin_y) / self.scale;
        let grid_x = (local_x / self.glyph_width as f64).floor();
        let grid_y = (local_y / self.glyph_height as f64).floor();
        (grid_x as i32, grid_y as i32)
    }

    /// Device-space centre of the cell at `(grid_x, grid_y)`.
    pub fn grid_to_screen_center(&self, grid_x: i32, grid_y: i32) -> (f64, f64) {
        let local_x = (grid_x as f64 + 0.5) * self.glyph_width as f64;
        let local_y = (grid_y as f64 + 0.5) * self.glyph_height as f64;
        (
            self.origin_x + local_x * self.scale,
            self.origin_y + local_y * self.scale,
        )
    }
}
