// src/module/demo.rs

//! A small built-in simulation: a bordered field with a twinkling star
//! field, a player glyph moved with the arrow keys, and marks dropped with
//! the pointer.
//!
//! It talks to the host only through `HostImports`, keeping its cell buffer
//! and message text in its own `LinearMemory`.

use super::{HostImports, LinearMemory, SimulationModule};
use anyhow::{bail, Result};

const KEY_LEFT: u32 = 37;
const KEY_UP: u32 = 38;
const KEY_RIGHT: u32 = 39;
const KEY_DOWN: u32 = 40;
const KEY_C: u32 = 67;
const KEY_G: u32 = 71;

const SHIFT_BIT: u32 = 1;
const FAST_STEP: i32 = 4;

const BORDER_FG: i32 = 0x80_8080;
const TITLE_FG: i32 = 0xFF_FF55;
const PLAYER_FG: i32 = 0xFF_D700;
const STAR_FG: i32 = 0x60_60A0;
const HIGHLIGHT_BG: i32 = 0x30_3050;

const SPACE: i32 = b' ' as i32;
const MESSAGE_CAPACITY: usize = 256;
const TWINKLE_MS: f64 = 400.0;
const STAR_COUNT: usize = 24;
const TITLE: &str = " gridhost ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    glyph: i32,
    fg: i32,
    bg: i32,
}

impl Cell {
    const EMPTY: Cell = Cell {
        glyph: SPACE,
        fg: 0,
        bg: 0,
    };

    fn glyph(ch: u8, fg: i32) -> Self {
        Self {
            glyph: ch as i32,
            fg,
            bg: 0,
        }
    }
}

/// xorshift32; deterministic for a given seed.
#[derive(Debug, Clone)]
struct Rng(u32);

impl Rng {
    fn new(seed: u32) -> Self {
        Self(if seed == 0 { 0x9E37_79B9 } else { seed })
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            0
        } else {
            self.next_u32() % bound
        }
    }
}

pub struct DemoModule {
    width: u32,
    height: u32,
    memory: LinearMemory,
    rng: Rng,
    cells_ptr: u32,
    message_ptr: u32,
    player: (i32, i32),
    pointer: Option<(i32, i32)>,
    marks: Vec<(i32, i32, i32)>,
    stars: Vec<(i32, i32)>,
    since_twinkle_ms: f64,
    frames: u64,
}

impl DemoModule {
    /// Creates the module for a `width x height` terminal. The border needs
    /// at least a 3x3 grid.
    pub fn instantiate(width: u32, height: u32) -> Result<Self> {
        if width < 3 || height < 3 {
            bail!("demo module needs at least a 3x3 grid, got {}x{}", width, height);
        }
        Ok(Self {
            width,
            height,
            memory: LinearMemory::with_pages(1),
            rng: Rng::new(1),
            cells_ptr: 0,
            message_ptr: 0,
            player: (width as i32 / 2, height as i32 / 2),
            pointer: None,
            marks: Vec::new(),
            stars: Vec::new(),
            since_twinkle_ms: 0.0,
            frames: 0,
        })
    }

    pub fn player(&self) -> (i32, i32) {
        self.player
    }

    pub fn cells_pointer(&self) -> u32 {
        self.cells_ptr
    }

    pub fn memory_pages(&self) -> usize {
        self.memory.pages()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn cell_bytes(&self) -> usize {
        self.width as usize * self.height as usize * 12
    }

    fn in_field(&self, x: i32, y: i32) -> bool {
        x > 0 && y > 0 && x < self.width as i32 - 1 && y < self.height as i32 - 1
    }

    fn say(&mut self, host: &mut dyn HostImports, level: u32, text: &str) {
        let bytes = &text.as_bytes()[..text.len().min(MESSAGE_CAPACITY)];
        self.memory.write_bytes(self.message_ptr, bytes);
        host.print(self.memory.bytes(), self.message_ptr, bytes.len() as u32, level);
    }

    /// Moves the cell buffer to freshly grown memory. Pointers the host saw
    /// before are stale afterwards.
    fn relocate(&mut self, host: &mut dyn HostImports) {
        let previous = self.cells_ptr;
        self.memory.grow(1);
        self.cells_ptr = self.memory.alloc(self.cell_bytes());
        let text = format!(
            "cell buffer moved {:#x} -> {:#x} ({} pages)",
            previous,
            self.cells_ptr,
            self.memory.pages()
        );
        self.say(host, 1, &text);
    }

    fn twinkle(&mut self) {
        let (w, h) = (self.width - 2, self.height - 2);
        self.stars.clear();
        for _ in 0..STAR_COUNT {
            let x = self.rng.below(w) as i32 + 1;
            let y = self.rng.below(h) as i32 + 1;
            self.stars.push((x, y));
        }
    }

    fn step_player(&mut self, dx: i32, dy: i32) {
        let (x, y) = self.player;
        self.player = (
            (x + dx).clamp(1, self.width as i32 - 2),
            (y + dy).clamp(1, self.height as i32 - 2),
        );
    }

    fn render(&self) -> Vec<Cell> {
        let (w, h) = (self.width as i32, self.height as i32);
        let mut cells = vec![Cell::EMPTY; (w * h) as usize];
        let mut put = |x: i32, y: i32, cell: Cell| {
            if (0..w).contains(&x) && (0..h).contains(&y) {
                cells[(y * w + x) as usize] = cell;
            }
        };

        for x in 0..w {
            let ch = if x == 0 || x == w - 1 { b'+' } else { b'-' };
            put(x, 0, Cell::glyph(ch, BORDER_FG));
            put(x, h - 1, Cell::glyph(ch, BORDER_FG));
        }
        for y in 1..h - 1 {
            put(0, y, Cell::glyph(b'|', BORDER_FG));
            put(w - 1, y, Cell::glyph(b'|', BORDER_FG));
        }
        if TITLE.len() as i32 + 4 <= w {
            for (i, ch) in TITLE.bytes().enumerate() {
                put(2 + i as i32, 0, Cell::glyph(ch, TITLE_FG));
            }
        }

        for &(x, y) in &self.stars {
            put(x, y, Cell::glyph(b'.', STAR_FG));
        }
        for &(x, y, color) in &self.marks {
            put(x, y, Cell::glyph(b'o', color));
        }

        let (px, py) = self.player;
        put(px, py, Cell::glyph(b'@', PLAYER_FG));

        if let Some((x, y)) = self.pointer {
            let index = (y * w + x) as usize;
            let mut cell = cells[index];
            cell.bg = HIGHLIGHT_BG;
            if cell.glyph == SPACE {
                cell.fg = 0;
            }
            cells[index] = cell;
        }
        cells
    }
}

impl SimulationModule for DemoModule {
    fn on_init(&mut self, host: &mut dyn HostImports, seed: u32) {
        self.rng = Rng::new(seed);
        self.message_ptr = self.memory.alloc(MESSAGE_CAPACITY);
        self.cells_ptr = self.memory.alloc(self.cell_bytes());
        self.twinkle();

        let text = format!("demo module ready: {}x{} seed {}", self.width, self.height, seed);
        self.say(host, 0, &text);
        host.init_term(self.width, self.height);
    }

    fn on_frame(&mut self, host: &mut dyn HostImports, delta_ms: f64) {
        self.frames += 1;
        self.since_twinkle_ms += delta_ms;
        if self.since_twinkle_ms >= TWINKLE_MS {
            self.since_twinkle_ms = 0.0;
            self.twinkle();
        }

        let cells = self.render();
        for (i, cell) in cells.iter().enumerate() {
            let base = self.cells_ptr + (i * 12) as u32;
            self.memory.write_i32(base, cell.glyph);
            self.memory.write_i32(base + 4, cell.fg);
            self.memory.write_i32(base + 8, cell.bg);
        }
        host.flush_term(
            self.memory.bytes(),
            self.cells_ptr,
            (cells.len() * 3) as u32,
        );
    }

    fn on_key_down(&mut self, host: &mut dyn HostImports, code: u32, modifier_bits: u32) {
        let step = if modifier_bits & SHIFT_BIT != 0 {
            FAST_STEP
        } else {
            1
        };
        match code {
            KEY_LEFT => self.step_player(-step, 0),
            KEY_RIGHT => self.step_player(step, 0),
            KEY_UP => self.step_player(0, -step),
            KEY_DOWN => self.step_player(0, step),
            KEY_C => {
                let text = format!("cleared {} marks", self.marks.len());
                self.marks.clear();
                self.say(host, 1, &text);
            }
            KEY_G => self.relocate(host),
            _ => {}
        }
    }

    fn on_pointer_move(&mut self, _host: &mut dyn HostImports, grid_x: i32, grid_y: i32) {
        let inside = grid_x >= 0
            && grid_y >= 0
            && grid_x < self.width as i32
            && grid_y < self.height as i32;
        self.pointer = inside.then_some((grid_x, grid_y));
    }

    fn on_pointer_down(&mut self, host: &mut dyn HostImports, grid_x: i32, grid_y: i32) {
        if !self.in_field(grid_x, grid_y) {
            let text = format!("click outside the field at ({}, {})", grid_x, grid_y);
            self.say(host, 2, &text);
            return;
        }
        let color = (self.rng.next_u32() & 0x00FF_FFFF) as i32 | 0x40_4040;
        self.marks.push((grid_x, grid_y, color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::test_support::{HostCall, RecordingHost};
    use test_log::test;

    fn started(width: u32, height: u32) -> (DemoModule, RecordingHost) {
        let mut module = DemoModule::instantiate(width, height).expect("instantiate");
        let mut host = RecordingHost::default();
        module.on_init(&mut host, 42);
        (module, host)
    }

    fn last_flush(host: &RecordingHost) -> Vec<i32> {
        host.calls
            .iter()
            .rev()
            .find_map(|call| match call {
                HostCall::FlushTerm { elements } => Some(elements.clone()),
                _ => None,
            })
            .expect("a flush")
    }

    fn glyph_at(elements: &[i32], width: u32, x: i32, y: i32) -> i32 {
        elements[((y * width as i32 + x) * 3) as usize]
    }

    #[test]
    fn it_should_reject_grids_too_small_for_a_border() {
        assert!(DemoModule::instantiate(2, 10).is_err());
        assert!(DemoModule::instantiate(10, 0).is_err());
    }

    #[test]
    fn it_should_announce_itself_and_establish_the_terminal() {
        let (_, host) = started(20, 10);

        assert_eq!(
            host.calls,
            vec![
                HostCall::Print {
                    text: "demo module ready: 20x10 seed 42".into(),
                    level: 0
                },
                HostCall::InitTerm {
                    width: 20,
                    height: 10
                },
            ]
        );
    }

    #[test]
    fn it_should_flush_a_full_bordered_grid_each_frame() {
        let (mut module, mut host) = started(20, 10);

        module.on_frame(&mut host, 16.0);
        module.on_frame(&mut host, 16.0);

        let elements = last_flush(&host);
        assert_eq!(elements.len(), 20 * 10 * 3);
        assert_eq!(glyph_at(&elements, 20, 0, 0), b'+' as i32);
        assert_eq!(glyph_at(&elements, 20, 19, 9), b'+' as i32);
        assert_eq!(glyph_at(&elements, 20, 1, 9), b'-' as i32);
        assert_eq!(glyph_at(&elements, 20, 0, 5), b'|' as i32);
        assert_eq!(glyph_at(&elements, 20, 10, 5), b'@' as i32);
        assert_eq!(module.frames(), 2);
    }

    #[test]
    fn it_should_move_the_player_and_stay_inside_the_border() {
        let (mut module, mut host) = started(20, 10);

        module.on_key_down(&mut host, KEY_LEFT, 0);
        assert_eq!(module.player(), (9, 5));
        module.on_key_down(&mut host, KEY_UP, SHIFT_BIT);
        assert_eq!(module.player(), (9, 1));
        for _ in 0..10 {
            module.on_key_down(&mut host, KEY_RIGHT, SHIFT_BIT);
        }
        assert_eq!(module.player(), (18, 1));
    }

    #[test]
    fn it_should_highlight_the_pointer_cell_and_ignore_outside_points() {
        let (mut module, mut host) = started(20, 10);

        module.on_pointer_move(&mut host, 3, 4);
        module.on_frame(&mut host, 1.0);
        let elements = last_flush(&host);
        assert_eq!(elements[(4 * 20 + 3) * 3 + 2], HIGHLIGHT_BG);

        module.on_pointer_move(&mut host, -1, 400);
        module.on_frame(&mut host, 1.0);
        let elements = last_flush(&host);
        assert!(elements.chunks(3).all(|cell| cell[2] != HIGHLIGHT_BG));
    }

    #[test]
    fn it_should_drop_marks_inside_and_warn_about_clicks_outside() {
        let (mut module, mut host) = started(20, 10);

        module.on_pointer_down(&mut host, 4, 4);
        module.on_pointer_down(&mut host, 0, 0);
        module.on_frame(&mut host, 1.0);

        assert_eq!(glyph_at(&last_flush(&host), 20, 4, 4), b'o' as i32);
        assert!(host.calls.contains(&HostCall::Print {
            text: "click outside the field at (0, 0)".into(),
            level: 2
        }));
    }

    #[test]
    fn it_should_relocate_its_cell_buffer_into_grown_memory() {
        let (mut module, mut host) = started(20, 10);
        let before = module.cells_pointer();
        let pages = module.memory_pages();

        module.on_key_down(&mut host, KEY_G, 0);
        module.on_frame(&mut host, 1.0);

        assert_ne!(module.cells_pointer(), before);
        assert!(module.memory_pages() > pages);
        assert_eq!(last_flush(&host).len(), 20 * 10 * 3);
    }
}
