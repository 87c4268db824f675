// src/compositor/tests.rs

use super::*;
use crate::atlas::test_support::checker_atlas;
use crate::color::Rgba;
use crate::surface::{Image, PixelSurface, Rect};
use crate::tint::TintMode;
use test_log::test;

// --- RecordingCanvas Definition ---
#[derive(Debug, Clone, PartialEq)]
enum CanvasCall {
    Clear,
    FillRect { rect: Rect, color: PackedColor },
    DrawImage { src: Rect, dst_x: u32, dst_y: u32 },
}

#[derive(Default)]
struct RecordingCanvas {
    calls: Vec<CanvasCall>,
}

impl RecordingCanvas {
    fn fills(&self) -> Vec<&CanvasCall> {
        self.calls
            .iter()
            .filter(|call| matches!(call, CanvasCall::FillRect { .. }))
            .collect()
    }

    fn blits(&self) -> Vec<&CanvasCall> {
        self.calls
            .iter()
            .filter(|call| matches!(call, CanvasCall::DrawImage { .. }))
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self) {
        self.calls.push(CanvasCall::Clear);
    }

    fn fill_rect(&mut self, rect: Rect, color: PackedColor) {
        self.calls.push(CanvasCall::FillRect { rect, color });
    }

    fn draw_image(&mut self, _image: &Image, src: Rect, dst_x: u32, dst_y: u32) {
        self.calls.push(CanvasCall::DrawImage { src, dst_x, dst_y });
    }
}

// --- Helpers ---

const GLYPH: u32 = 6;
const SPACE: i32 = 32;

fn encode(cells: &[(i32, u32, u32)]) -> Vec<u8> {
    cells
        .iter()
        .flat_map(|&(glyph, fg, bg)| [glyph, fg as i32, bg as i32])
        .flat_map(i32::to_le_bytes)
        .collect()
}

fn tints() -> TintCache {
    TintCache::new(checker_atlas(16, 16, GLYPH, GLYPH), TintMode::Mask)
}

fn flush_recorded(width: u32, height: u32, memory: &[u8], length: u32) -> (RecordingCanvas, TintCache) {
    let mut canvas = RecordingCanvas::default();
    let mut tints = tints();
    let surface = TerminalSurface::new(width, height, GLYPH, GLYPH);
    let view = CellView::new(memory, 0, length).unwrap();
    GridCompositor::new(SPACE as u32).flush(&mut canvas, &mut tints, &surface, &view);
    (canvas, tints)
}

// --- CellView ---

#[test]
fn it_should_decode_cells_as_little_endian_triples() {
    let memory = encode(&[(65, 0xFFFFFF, 0x000001), (7, 0x123456, 0)]);
    let view = CellView::new(&memory, 0, 6).unwrap();

    assert_eq!(view.len(), 6);
    assert_eq!(
        view.cell(1),
        Some(CellRecord {
            glyph: 7,
            fg: PackedColor::new(0x123456),
            bg: None,
        })
    );
    assert_eq!(view.cell(2), None);
}

#[test]
fn it_should_read_the_view_at_an_offset_into_memory() {
    let mut memory = vec![0xAAu8; 8];
    memory.extend(encode(&[(9, 1, 2)]));
    let view = CellView::new(&memory, 8, 3).unwrap();
    assert_eq!(view.cell(0).map(|c| c.glyph), Some(9));
}

#[test]
fn it_should_refuse_a_view_that_exceeds_module_memory() {
    let memory = encode(&[(1, 1, 1)]);
    assert!(CellView::new(&memory, 0, 4).is_err());
    assert!(CellView::new(&memory, 4, 3).is_err());
    assert!(CellView::new(&memory, 0, u32::MAX).is_err());
}

// --- GridCompositor ---

#[test]
fn it_should_only_clear_when_every_cell_is_empty() {
    let memory = encode(&[(0, 0xFFFFFF, 0); 4 * 3]);
    let (canvas, tints) = flush_recorded(4, 3, &memory, 36);

    assert_eq!(canvas.calls, vec![CanvasCall::Clear]);
    assert!(tints.is_empty());
}

#[test]
fn it_should_fill_a_single_cell_terminal_without_blitting_glyph_zero() {
    let memory = encode(&[(0, 0xFFFFFF, 0x000001)]);
    let (canvas, _) = flush_recorded(1, 1, &memory, 3);

    assert_eq!(
        canvas.calls,
        vec![
            CanvasCall::Clear,
            CanvasCall::FillRect {
                rect: Rect::new(0, 0, GLYPH, GLYPH),
                color: PackedColor::from_rgb(0, 0, 1),
            },
        ]
    );
}

#[test]
fn it_should_never_blit_the_whitespace_glyph() {
    let memory = encode(&[(SPACE, 0xFF0000, 0), (SPACE, 0x00FF00, 0x0000FF)]);
    let (canvas, tints) = flush_recorded(2, 1, &memory, 6);

    assert!(canvas.blits().is_empty());
    assert_eq!(canvas.fills().len(), 1);
    assert!(tints.is_empty());
}

#[test]
fn it_should_fill_before_blitting_in_row_major_order() {
    let memory = encode(&[
        (1, 0xFF0000, 0x101010),
        (17, 0x00FF00, 0),
        (0, 0, 0x202020),
        (18, 0xFF0000, 0x303030),
    ]);
    let (canvas, tints) = flush_recorded(2, 2, &memory, 12);

    assert_eq!(
        canvas.calls,
        vec![
            CanvasCall::Clear,
            CanvasCall::FillRect {
                rect: Rect::new(0, 0, 6, 6),
                color: PackedColor::new(0x101010),
            },
            CanvasCall::DrawImage {
                src: Rect::new(6, 0, 6, 6),
                dst_x: 0,
                dst_y: 0,
            },
            CanvasCall::DrawImage {
                src: Rect::new(6, 6, 6, 6),
                dst_x: 6,
                dst_y: 0,
            },
            CanvasCall::FillRect {
                rect: Rect::new(0, 6, 6, 6),
                color: PackedColor::new(0x202020),
            },
            CanvasCall::FillRect {
                rect: Rect::new(6, 6, 6, 6),
                color: PackedColor::new(0x303030),
            },
            CanvasCall::DrawImage {
                src: Rect::new(12, 6, 6, 6),
                dst_x: 6,
                dst_y: 6,
            },
        ]
    );
    // Two distinct foreground colours were used for glyphs.
    assert_eq!(tints.len(), 2);
    assert_eq!(tints.generated(), 2);
}

#[test]
fn it_should_skip_glyphs_past_the_last_atlas_row_but_keep_the_background() {
    let memory = encode(&[(16 * 16, 0xFFFFFF, 0x0000AA), (-5, 0xFFFFFF, 0)]);
    let (canvas, _) = flush_recorded(2, 1, &memory, 6);

    assert_eq!(canvas.fills().len(), 1);
    assert!(canvas.blits().is_empty());
}

#[test]
fn it_should_decide_background_fill_from_the_raw_value_before_masking() {
    // 0x0100_0000 is positive and masks to black; -1 is negative and is not filled.
    let memory = encode(&[(0, 0, 0x0100_0000), (0, 0, 0xFFFF_FFFF)]);
    let (canvas, _) = flush_recorded(2, 1, &memory, 6);

    assert_eq!(
        canvas.fills(),
        vec![&CanvasCall::FillRect {
            rect: Rect::new(0, 0, GLYPH, GLYPH),
            color: PackedColor::BLACK,
        }]
    );
}

#[test]
fn it_should_draw_only_complete_cells_from_a_short_buffer() {
    // Two full cells and a dangling element for a 2x2 terminal.
    let mut memory = encode(&[(1, 0xFFFFFF, 0x01), (1, 0xFFFFFF, 0x02)]);
    memory.extend(5i32.to_le_bytes());
    let (canvas, _) = flush_recorded(2, 2, &memory, 7);

    assert_eq!(canvas.fills().len(), 2);
    assert_eq!(canvas.blits().len(), 2);
}

#[test]
fn it_should_ignore_extra_elements_in_a_long_buffer() {
    let memory = encode(&[(0, 0, 0x01), (0, 0, 0x02)]);
    let (canvas, _) = flush_recorded(1, 1, &memory, 6);
    assert_eq!(canvas.fills().len(), 1);
}

#[test]
fn it_should_render_tinted_glyph_pixels_onto_a_pixel_surface() {
    let memory = encode(&[(1, 0xFF0000, 0x0000FF)]);
    let surface = TerminalSurface::new(1, 1, GLYPH, GLYPH);
    let mut pixels = PixelSurface::new(surface.pixel_width(), surface.pixel_height());
    let mut tints = tints();
    let view = CellView::new(&memory, 0, 3).unwrap();

    GridCompositor::new(32).flush(&mut pixels, &mut tints, &surface, &view);

    // Checkerboard glyph: even (x + y) pixels are glyph, odd show the fill.
    assert_eq!(pixels.image().pixel(0, 0), Some(Rgba::opaque(255, 0, 0)));
    assert_eq!(pixels.image().pixel(1, 0), Some(Rgba::opaque(0, 0, 255)));
    assert_eq!(pixels.image().pixel(5, 5), Some(Rgba::opaque(255, 0, 0)));
}

#[test]
fn it_should_clear_pixels_left_over_from_the_previous_flush() {
    let surface = TerminalSurface::new(1, 1, GLYPH, GLYPH);
    let mut pixels = PixelSurface::new(surface.pixel_width(), surface.pixel_height());
    let mut tints = tints();
    let compositor = GridCompositor::new(32);

    let first = encode(&[(0, 0, 0xFFFFFF)]);
    compositor.flush(&mut pixels, &mut tints, &surface, &CellView::new(&first, 0, 3).unwrap());
    let second = encode(&[(0, 0, 0)]);
    compositor.flush(&mut pixels, &mut tints, &surface, &CellView::new(&second, 0, 3).unwrap());

    assert!(pixels.image().pixels().iter().all(|px| *px == Rgba::TRANSPARENT));
}
