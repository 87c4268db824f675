// src/input.rs

//! Turns raw display input into the forms the simulation module expects and
//! forwards them.
//!
//! Keys become `(dom key code, modifier bits)`; pointer positions become grid
//! coordinates through the current viewport layout. Out-of-range grid
//! coordinates are forwarded unchanged: bounds are the module's business.

use crate::display::DisplayEvent;
use crate::keys::Modifiers;
use crate::module::{HostImports, SimulationModule};
use crate::viewport::ViewportLayout;
use log::trace;

pub const MODIFIER_SHIFT: u32 = 1 << 0;
pub const MODIFIER_ALT: u32 = 1 << 1;
pub const MODIFIER_CTRL: u32 = 1 << 2;

/// Packs modifier state into the 3-bit field: shift, alt, ctrl.
pub fn pack_modifiers(shift: bool, alt: bool, ctrl: bool) -> u32 {
    let mut bits = 0;
    if shift {
        bits |= MODIFIER_SHIFT;
    }
    if alt {
        bits |= MODIFIER_ALT;
    }
    if ctrl {
        bits |= MODIFIER_CTRL;
    }
    bits
}

pub fn modifier_bits(modifiers: Modifiers) -> u32 {
    pack_modifiers(
        modifiers.contains(Modifiers::SHIFT),
        modifiers.contains(Modifiers::ALT),
        modifiers.contains(Modifiers::CONTROL),
    )
}

/// An input event in module terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleInput {
    KeyDown { code: u32, modifier_bits: u32 },
    PointerMove { grid_x: i32, grid_y: i32 },
    PointerDown { grid_x: i32, grid_y: i32 },
}

impl ModuleInput {
    /// Calls the matching module callback.
    pub fn dispatch(self, module: &mut dyn SimulationModule, host: &mut dyn HostImports) {
        trace!("Input: dispatching {:?}", self);
        match self {
            ModuleInput::KeyDown {
                code,
                modifier_bits,
            } => module.on_key_down(host, code, modifier_bits),
            ModuleInput::PointerMove { grid_x, grid_y } => {
                module.on_pointer_move(host, grid_x, grid_y)
            }
            ModuleInput::PointerDown { grid_x, grid_y } => {
                module.on_pointer_down(host, grid_x, grid_y)
            }
        }
    }
}

/// Normalizes a display event. Returns `None` for events that are not
/// module input, and for pointer events while no surface exists yet.
pub fn normalize(event: &DisplayEvent, layout: Option<&ViewportLayout>) -> Option<ModuleInput> {
    match *event {
        DisplayEvent::Key { symbol, modifiers } => Some(ModuleInput::KeyDown {
            code: symbol.dom_key_code(),
            modifier_bits: modifier_bits(modifiers),
        }),
        DisplayEvent::MouseMove { x, y, .. } => {
            let (grid_x, grid_y) = layout?.screen_to_grid(x as f64, y as f64);
            Some(ModuleInput::PointerMove { grid_x, grid_y })
        }
        DisplayEvent::MouseButtonPress { x, y, .. } => {
            let (grid_x, grid_y) = layout?.screen_to_grid(x as f64, y as f64);
            Some(ModuleInput::PointerDown { grid_x, grid_y })
        }
        DisplayEvent::Resize { .. }
        | DisplayEvent::CloseRequested
        | DisplayEvent::FocusGained
        | DisplayEvent::FocusLost => None,
    }
}
