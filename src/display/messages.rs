// src/display/messages.rs
//! Message types for communication between DisplayManager and DisplayDriver.
//!
//! All communication happens via ownership transfer - no shared state. The
//! framebuffer travels to the driver inside `Present` and comes back in
//! `PresentComplete` (or inside the error when presentation fails).

use crate::keys::{KeySymbol, Modifiers};
use std::fmt;

/// Window parameters handed to a driver on `Init`.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub title: String,
    pub window_width: u32,
    pub window_height: u32,
}

/// A window-sized frame ready for presentation.
///
/// Pixels are 32-bit `0x00RRGGBB` words stored little-endian, i.e. bytes
/// `B, G, R, 0`, which is what a 24-bit TrueColor X server expects.
#[derive(Debug, Clone)]
pub struct RenderSnapshot {
    pub framebuffer: Box<[u8]>,
    pub width_px: u32,
    pub height_px: u32,
}

/// Requests sent from DisplayManager to DisplayDriver.
#[derive(Debug, Clone)]
pub enum DriverRequest {
    /// Create the window and discover its metrics.
    /// Driver responds with InitComplete.
    Init(DriverConfig),

    /// Request pending native events from the platform.
    /// Driver responds with Events containing any queued events.
    PollEvents,

    /// Display the frame. The driver takes ownership, displays it, and
    /// hands it back with PresentComplete.
    Present(RenderSnapshot),

    /// Set the window title.
    SetTitle(String),
}

/// Responses sent from DisplayDriver to DisplayManager.
#[derive(Debug)]
pub enum DriverResponse {
    /// Initialization complete with discovered metrics.
    InitComplete { width_px: u32, height_px: u32 },

    /// Native events that occurred.
    Events(Vec<DisplayEvent>),

    /// Frame presentation complete, framebuffer returned for reuse.
    PresentComplete(RenderSnapshot),

    /// Window title was set.
    TitleSet,
}

/// Platform-agnostic display events.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    /// Key press event.
    Key {
        symbol: KeySymbol,
        modifiers: Modifiers,
    },

    /// Window resize; the new viewport size.
    Resize { width_px: u32, height_px: u32 },

    /// User requested window close.
    CloseRequested,

    /// Window gained focus.
    FocusGained,

    /// Window lost focus.
    FocusLost,

    /// Mouse button press, in window pixel coordinates.
    MouseButtonPress {
        button: u8,
        x: i32,
        y: i32,
        modifiers: Modifiers,
    },

    /// Mouse movement, in window pixel coordinates.
    MouseMove {
        x: i32,
        y: i32,
        modifiers: Modifiers,
    },
}

/// Display driver failures.
#[derive(Debug)]
pub enum DisplayError {
    /// The window could not be created or the display connection failed.
    InitFailed(String),
    /// Presentation failed; the snapshot is handed back so its buffer is not lost.
    PresentationFailed(RenderSnapshot, String),
    /// The driver does not understand the request in its current state.
    Unexpected(String),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::InitFailed(reason) => write!(f, "display init failed: {}", reason),
            DisplayError::PresentationFailed(_, reason) => {
                write!(f, "frame presentation failed: {}", reason)
            }
            DisplayError::Unexpected(reason) => write!(f, "unexpected display state: {}", reason),
        }
    }
}

impl std::error::Error for DisplayError {}
