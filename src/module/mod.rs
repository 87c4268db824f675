// src/module/mod.rs

//! The narrow synchronous boundary between the host and the simulation module.
//!
//! `SimulationModule` is what the host calls into; `HostImports` is what the
//! module calls back while one of those calls is in progress. Every callback
//! that hands the host a `(pointer, length)` pair also hands it the module's
//! memory *as it is right now*: a borrowed slice that cannot outlive the
//! callback, because the module is free to grow or relocate that memory
//! between calls.
//!
//! Loading a compiled module is outside this crate; `demo::DemoModule` is the
//! built-in native module the binary runs.

pub mod demo;
pub mod memory;

#[cfg(test)]
pub(crate) mod test_support;

pub use memory::{region, LinearMemory, RegionError};

/// Calls the module makes into the host.
///
/// None of these report failure back to the module; malformed arguments are
/// logged host-side and otherwise ignored.
pub trait HostImports {
    /// Decodes `length` bytes at `pointer` as UTF-8 and routes them to the log
    /// channel named by `level` (0 info, 1 log, 2 warn, 3 error).
    fn print(&mut self, memory: &[u8], pointer: u32, length: u32, level: u32);

    /// Same as `print` on the error channel.
    fn print_error(&mut self, memory: &[u8], pointer: u32, length: u32);

    /// Establishes (or replaces) the terminal surface.
    fn init_term(&mut self, width_cells: u32, height_cells: u32);

    /// Composites `length` 32-bit cell elements starting at `pointer`.
    fn flush_term(&mut self, memory: &[u8], pointer: u32, length: u32);
}

/// Calls the host makes into the module. Each call runs to completion before
/// the host handles anything else.
pub trait SimulationModule {
    fn on_init(&mut self, host: &mut dyn HostImports, seed: u32);

    fn on_frame(&mut self, host: &mut dyn HostImports, delta_ms: f64);

    /// `code` is a legacy DOM key code; `modifier_bits` packs shift (bit 0),
    /// alt (bit 1) and ctrl (bit 2).
    fn on_key_down(&mut self, host: &mut dyn HostImports, code: u32, modifier_bits: u32);

    /// Grid coordinates may lie outside the terminal.
    fn on_pointer_move(&mut self, host: &mut dyn HostImports, grid_x: i32, grid_y: i32);

    fn on_pointer_down(&mut self, host: &mut dyn HostImports, grid_x: i32, grid_y: i32);
}
