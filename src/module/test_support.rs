// src/module/test_support.rs

//! Scripted module and recording host shared by unit tests.

use super::{HostImports, LinearMemory, SimulationModule};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ModuleCall {
    Init { seed: u32 },
    Frame { delta_ms: f64 },
    KeyDown { code: u32, modifier_bits: u32 },
    PointerMove { grid_x: i32, grid_y: i32 },
    PointerDown { grid_x: i32, grid_y: i32 },
}

/// Records every call. On init it establishes a `width x height` terminal;
/// on each frame it flushes a buffer where every cell has background
/// `frame number` (1-based) and glyph 0.
pub(crate) struct ScriptedModule {
    pub(crate) calls: Vec<ModuleCall>,
    pub(crate) width: u32,
    pub(crate) height: u32,
    memory: LinearMemory,
    frames: i32,
}

impl ScriptedModule {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            calls: Vec::new(),
            width,
            height,
            memory: LinearMemory::with_pages(1),
            frames: 0,
        }
    }
}

impl SimulationModule for ScriptedModule {
    fn on_init(&mut self, host: &mut dyn HostImports, seed: u32) {
        self.calls.push(ModuleCall::Init { seed });
        let (ptr, len) = self.memory.store(b"scripted module ready");
        host.print(self.memory.bytes(), ptr, len, 0);
        host.init_term(self.width, self.height);
    }

    fn on_frame(&mut self, host: &mut dyn HostImports, delta_ms: f64) {
        self.calls.push(ModuleCall::Frame { delta_ms });
        self.frames += 1;
        let cells = (self.width * self.height) as usize;
        let ptr = self.memory.alloc(cells * 12);
        for i in 0..cells {
            let base = ptr + (i * 12) as u32;
            self.memory.write_i32(base, 0);
            self.memory.write_i32(base + 4, 0xFFFFFF);
            self.memory.write_i32(base + 8, self.frames);
        }
        host.flush_term(self.memory.bytes(), ptr, (cells * 3) as u32);
    }

    fn on_key_down(&mut self, _host: &mut dyn HostImports, code: u32, modifier_bits: u32) {
        self.calls.push(ModuleCall::KeyDown {
            code,
            modifier_bits,
        });
    }

    fn on_pointer_move(&mut self, _host: &mut dyn HostImports, grid_x: i32, grid_y: i32) {
        self.calls.push(ModuleCall::PointerMove { grid_x, grid_y });
    }

    fn on_pointer_down(&mut self, _host: &mut dyn HostImports, grid_x: i32, grid_y: i32) {
        self.calls.push(ModuleCall::PointerDown { grid_x, grid_y });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum HostCall {
    Print { text: String, level: u32 },
    PrintError { text: String },
    InitTerm { width: u32, height: u32 },
    FlushTerm { elements: Vec<i32> },
}

/// Host that copies out whatever the module hands it.
#[derive(Default)]
pub(crate) struct RecordingHost {
    pub(crate) calls: Vec<HostCall>,
}

fn copy_text(memory: &[u8], pointer: u32, length: u32) -> String {
    let start = pointer as usize;
    String::from_utf8_lossy(&memory[start..start + length as usize]).into_owned()
}

impl HostImports for RecordingHost {
    fn print(&mut self, memory: &[u8], pointer: u32, length: u32, level: u32) {
        let text = copy_text(memory, pointer, length);
        self.calls.push(HostCall::Print { text, level });
    }

    fn print_error(&mut self, memory: &[u8], pointer: u32, length: u32) {
        let text = copy_text(memory, pointer, length);
        self.calls.push(HostCall::PrintError { text });
    }

    fn init_term(&mut self, width_cells: u32, height_cells: u32) {
        self.calls.push(HostCall::InitTerm {
            width: width_cells,
            height: height_cells,
        });
    }

    fn flush_term(&mut self, memory: &[u8], pointer: u32, length: u32) {
        let start = pointer as usize;
        let elements = memory[start..start + length as usize * 4]
            .chunks_exact(4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        self.calls.push(HostCall::FlushTerm { elements });
    }
}
