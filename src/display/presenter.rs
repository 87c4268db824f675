// src/display/presenter.rs
//! Turns the terminal-sized canvas into a window-sized frame.
//!
//! Nearest-neighbour sampling keeps glyph edges crisp at any scale. Window
//! pixels outside the scaled surface, and transparent canvas pixels, show the
//! clear colour.

use crate::color::{PackedColor, Rgba};
use crate::surface::Image;
use crate::viewport::ViewportLayout;

pub const BYTES_PER_PIXEL: usize = 4;

/// Fills `framebuffer` (BGRX, `width_px * height_px * 4` bytes) with `image`
/// placed according to `layout`.
///
/// With no layout only the clear colour is drawn.
pub fn compose_frame(
    framebuffer: &mut [u8],
    width_px: u32,
    height_px: u32,
    image: &Image,
    layout: Option<&ViewportLayout>,
    clear_color: PackedColor,
) {
    let clear = clear_color.to_rgba();
    let clear_bytes = to_bgrx(clear);
    for pixel in framebuffer.chunks_exact_mut(BYTES_PER_PIXEL) {
        pixel.copy_from_slice(&clear_bytes);
    }

    let Some(layout) = layout else {
        return;
    };
    if layout.scale <= 0.0 || image.width() == 0 || image.height() == 0 {
        return;
    }

    let columns: Vec<Option<u32>> = (0..width_px)
        .map(|px| sample_index(px, layout.origin_x, layout.scale, image.width()))
        .collect();
    let stride = width_px as usize * BYTES_PER_PIXEL;

    for py in 0..height_px {
        let Some(sy) = sample_index(py, layout.origin_y, layout.scale, image.height()) else {
            continue;
        };
        let row_start = py as usize * stride;
        let Some(row) = framebuffer.get_mut(row_start..row_start + stride) else {
            break;
        };
        for (px, column) in columns.iter().enumerate() {
            let Some(sx) = *column else {
                continue;
            };
            if let Some(source) = image.pixel(sx, sy) {
                let offset = px * BYTES_PER_PIXEL;
                row[offset..offset + BYTES_PER_PIXEL]
                    .copy_from_slice(&to_bgrx(source.over(clear)));
            }
        }
    }
}

/// Source coordinate sampled by the centre of device pixel `device`.
fn sample_index(device: u32, origin: f64, scale: f64, extent: u32) -> Option<u32> {
    let source = ((device as f64 + 0.5 - origin) / scale).floor();
    (source >= 0.0 && source < extent as f64).then_some(source as u32)
}

fn to_bgrx(color: Rgba) -> [u8; 4] {
    [color.b, color.g, color.r, 0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::TerminalSurface;
    use test_log::test;

    fn pixel_at(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * width + x) as usize) * BYTES_PER_PIXEL;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn solid_image(width: u32, height: u32, color: Rgba) -> Image {
        Image::from_pixels(width, height, vec![color; (width * height) as usize])
            .expect("valid image")
    }

    #[test]
    fn it_should_fill_with_the_clear_colour_without_a_layout() {
        let mut frame = vec![0xAA; 4 * 3 * BYTES_PER_PIXEL];
        let image = solid_image(2, 2, Rgba::opaque(255, 0, 0));

        compose_frame(&mut frame, 4, 3, &image, None, PackedColor::new(0x102030));

        for chunk in frame.chunks_exact(BYTES_PER_PIXEL) {
            assert_eq!(chunk, &[0x30, 0x20, 0x10, 0]);
        }
    }

    #[test]
    fn it_should_upscale_with_nearest_neighbour_and_letterbox() {
        // 1x1 cell of 2x2 px into a 6x4 window: scale 2, origin (1, 0).
        let surface = TerminalSurface::new(1, 1, 2, 2);
        let layout = ViewportLayout::fit(6, 4, &surface, 8.0);
        assert_eq!(layout.scale, 2.0);
        assert_eq!(layout.origin_x, 1.0);

        let mut pixels = vec![Rgba::opaque(255, 0, 0); 4];
        pixels[1] = Rgba::opaque(0, 0, 255);
        let image = Image::from_pixels(2, 2, pixels).expect("valid image");
        let mut frame = vec![0; 6 * 4 * BYTES_PER_PIXEL];

        compose_frame(&mut frame, 6, 4, &image, Some(&layout), PackedColor::BLACK);

        assert_eq!(pixel_at(&frame, 6, 0, 0), [0, 0, 0, 0]);
        assert_eq!(pixel_at(&frame, 6, 1, 0), [0, 0, 255, 0]);
        assert_eq!(pixel_at(&frame, 6, 2, 1), [0, 0, 255, 0]);
        assert_eq!(pixel_at(&frame, 6, 3, 0), [255, 0, 0, 0]);
        assert_eq!(pixel_at(&frame, 6, 4, 1), [255, 0, 0, 0]);
        assert_eq!(pixel_at(&frame, 6, 5, 3), [0, 0, 0, 0]);
    }

    #[test]
    fn it_should_show_the_clear_colour_through_transparent_pixels() {
        let surface = TerminalSurface::new(1, 1, 1, 1);
        let layout = ViewportLayout::fit(1, 1, &surface, 8.0);
        let image = solid_image(1, 1, Rgba::TRANSPARENT);
        let mut frame = vec![0; BYTES_PER_PIXEL];

        compose_frame(
            &mut frame,
            1,
            1,
            &image,
            Some(&layout),
            PackedColor::new(0x00FF00),
        );

        assert_eq!(frame, vec![0, 255, 0, 0]);
    }
}
