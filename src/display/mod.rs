// src/display/mod.rs
//! Message-based display system with Strategy Pattern.
//!
//! - DisplayDriver: Platform-specific primitives (headless, X11)
//! - DisplayManager: Scaling, framebuffer ownership and window state
//! - Messages: Request/Response protocol for communication

pub mod driver;
pub mod drivers;
pub mod manager;
pub mod messages;
pub mod presenter;

pub use driver::DisplayDriver;
pub use drivers::{create_driver, DriverKind};
pub use manager::{DisplayManager, DisplayMetrics};
pub use messages::{DisplayError, DisplayEvent, DriverConfig, DriverRequest, DriverResponse};
