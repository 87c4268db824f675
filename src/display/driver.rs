// src/display/driver.rs
//! DisplayDriver trait - minimal interface for platform-specific display primitives.
//!
//! All scaling and composition lives in DisplayManager; a driver only opens a
//! window, reports native events, and copies finished frames to the screen.
//!
//! ## Lifecycle
//! 1. `new()` - Connect to the display system; no window yet
//! 2. `handle_request(Init)` - Create window, discover metrics
//! 3. Request/response loop - All operations via messages
//! 4. `Drop` - Cleanup (no explicit shutdown message)

use crate::display::messages::{DisplayError, DriverRequest, DriverResponse};
use anyhow::Result;

pub trait DisplayDriver {
    /// Pure initialization only - no window creation.
    fn new() -> Result<Self>
    where
        Self: Sized;

    /// Handle a request from DisplayManager, returning a response.
    ///
    /// ## Request/Response Pairs
    /// - `Init(config)` → `InitComplete`
    /// - `PollEvents` → `Events`
    /// - `Present(snapshot)` → `PresentComplete(snapshot)`
    /// - `SetTitle(s)` → `TitleSet`
    ///
    /// A failed `Present` returns the snapshot inside
    /// `DisplayError::PresentationFailed` so the framebuffer can be reused.
    fn handle_request(&mut self, request: DriverRequest) -> Result<DriverResponse, DisplayError>;
}
