// src/display/manager.rs
//! DisplayManager - Synchronous wrapper around DisplayDriver.
//!
//! Owns the window-sized framebuffer and lends it to the driver for each
//! present; the driver always hands it back, even on failure.

use crate::color::PackedColor;
use crate::display::driver::DisplayDriver;
use crate::display::messages::{
    DisplayError, DisplayEvent, DriverConfig, DriverRequest, DriverResponse, RenderSnapshot,
};
use crate::display::presenter::{compose_frame, BYTES_PER_PIXEL};
use crate::surface::Image;
use crate::viewport::ViewportLayout;
use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};

/// Display metrics discovered during initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMetrics {
    pub width_px: u32,
    pub height_px: u32,
}

/// DisplayManager manages the display driver and tracks window state.
pub struct DisplayManager {
    driver: Box<dyn DisplayDriver>,
    metrics: DisplayMetrics,
    title: String,
    clear_color: PackedColor,
    framebuffer: Option<Box<[u8]>>,
    frames_presented: u64,
}

impl DisplayManager {
    /// Opens the window described by `config` on `driver`.
    pub fn new(
        mut driver: Box<dyn DisplayDriver>,
        config: DriverConfig,
        clear_color: PackedColor,
    ) -> Result<Self> {
        info!("DisplayManager: Initializing driver...");
        let title = config.title.clone();
        let response = driver
            .handle_request(DriverRequest::Init(config))
            .map_err(|e| anyhow!(e))
            .context("Failed to initialize display driver")?;

        let metrics = match response {
            DriverResponse::InitComplete {
                width_px,
                height_px,
            } => {
                info!("DisplayManager: Initialized - {}x{} px", width_px, height_px);
                DisplayMetrics {
                    width_px,
                    height_px,
                }
            }
            other => {
                return Err(anyhow!("Expected InitComplete response, got {:?}", other));
            }
        };

        Ok(Self {
            driver,
            metrics,
            title,
            clear_color,
            framebuffer: None,
            frames_presented: 0,
        })
    }

    /// Drains pending native events. A `Resize` updates the tracked metrics
    /// before it is handed on.
    pub fn poll_events(&mut self) -> Result<Vec<DisplayEvent>> {
        let response = self
            .driver
            .handle_request(DriverRequest::PollEvents)
            .map_err(|e| anyhow!(e))
            .context("Failed to poll display events")?;
        let events = match response {
            DriverResponse::Events(events) => events,
            other => return Err(anyhow!("Expected Events response, got {:?}", other)),
        };
        for event in &events {
            if let DisplayEvent::Resize {
                width_px,
                height_px,
            } = *event
            {
                self.handle_resize(width_px, height_px);
            }
        }
        Ok(events)
    }

    pub fn handle_resize(&mut self, width_px: u32, height_px: u32) {
        debug!("DisplayManager: Resize to {}x{}", width_px, height_px);
        self.metrics.width_px = width_px;
        self.metrics.height_px = height_px;
    }

    /// Scales `image` into the window and presents it. A frame the driver
    /// fails to present is dropped with a warning.
    pub fn present(&mut self, image: &Image, layout: Option<&ViewportLayout>) -> Result<()> {
        let DisplayMetrics {
            width_px,
            height_px,
            ..
        } = self.metrics;
        let size = width_px as usize * height_px as usize * BYTES_PER_PIXEL;
        let mut framebuffer = match self.framebuffer.take() {
            Some(buffer) if buffer.len() == size => buffer,
            _ => vec![0u8; size].into_boxed_slice(),
        };

        compose_frame(
            &mut framebuffer,
            width_px,
            height_px,
            image,
            layout,
            self.clear_color,
        );

        let snapshot = RenderSnapshot {
            framebuffer,
            width_px,
            height_px,
        };
        match self.driver.handle_request(DriverRequest::Present(snapshot)) {
            Ok(DriverResponse::PresentComplete(snapshot)) => {
                self.framebuffer = Some(snapshot.framebuffer);
                self.frames_presented += 1;
                Ok(())
            }
            Ok(other) => Err(anyhow!("Expected PresentComplete response, got {:?}", other)),
            Err(DisplayError::PresentationFailed(snapshot, reason)) => {
                warn!("DisplayManager: Dropped frame: {}", reason);
                self.framebuffer = Some(snapshot.framebuffer);
                Ok(())
            }
            Err(e) => Err(anyhow!(e)).context("Failed to present frame"),
        }
    }

    /// The window title the display was opened with.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        self.driver
            .handle_request(DriverRequest::SetTitle(title.to_string()))
            .map_err(|e| anyhow!(e))
            .context("Failed to set window title")?;
        Ok(())
    }

    /// Get current display metrics.
    pub fn metrics(&self) -> &DisplayMetrics {
        &self.metrics
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}
