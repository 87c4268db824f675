// src/display/drivers/mod.rs
//! Platform-specific display driver implementations.

pub mod headless;
#[cfg(feature = "x11")]
pub mod x11;

pub use headless::HeadlessDisplayDriver;
#[cfg(feature = "x11")]
pub use self::x11::X11DisplayDriver;

use crate::display::driver::DisplayDriver;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Which driver the binary opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    #[default]
    Headless,
    X11,
}

pub fn create_driver(kind: DriverKind) -> Result<Box<dyn DisplayDriver>> {
    match kind {
        DriverKind::Headless => Ok(Box::new(HeadlessDisplayDriver::new()?)),
        #[cfg(feature = "x11")]
        DriverKind::X11 => Ok(Box::new(X11DisplayDriver::new()?)),
        #[cfg(not(feature = "x11"))]
        DriverKind::X11 => anyhow::bail!("the x11 driver was requested but gridhost was built without the `x11` feature"),
    }
}
