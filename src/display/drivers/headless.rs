//! Headless display driver: no window, scripted events.
//!
//! Used by tests and by headless runs. Each `PollEvents` pops one scripted
//! batch; once the script runs out, polls return no events.

use crate::display::driver::DisplayDriver;
use crate::display::messages::{
    DisplayError, DisplayEvent, DriverConfig, DriverRequest, DriverResponse,
};
use anyhow::Result;
use log::{info, trace};
use std::collections::VecDeque;

pub struct HeadlessDisplayDriver {
    width_px: u32,
    height_px: u32,
    scripted: VecDeque<Vec<DisplayEvent>>,
}

impl HeadlessDisplayDriver {
    /// A driver whose successive `PollEvents` return `batches` in order.
    pub fn with_events(batches: Vec<Vec<DisplayEvent>>) -> Self {
        Self {
            scripted: batches.into(),
            ..Self::blank()
        }
    }

    fn blank() -> Self {
        Self {
            width_px: 0,
            height_px: 0,
            scripted: VecDeque::new(),
        }
    }

    fn handle_init(&mut self, config: DriverConfig) -> DriverResponse {
        self.width_px = config.window_width;
        self.height_px = config.window_height;
        info!(
            "HeadlessDisplayDriver: Init '{}' - {}x{} px",
            config.title, self.width_px, self.height_px
        );
        DriverResponse::InitComplete {
            width_px: self.width_px,
            height_px: self.height_px,
        }
    }
}

impl DisplayDriver for HeadlessDisplayDriver {
    fn new() -> Result<Self> {
        info!("HeadlessDisplayDriver::new()");
        Ok(Self::blank())
    }

    fn handle_request(&mut self, request: DriverRequest) -> Result<DriverResponse, DisplayError> {
        match request {
            DriverRequest::Init(config) => Ok(self.handle_init(config)),
            DriverRequest::PollEvents => {
                let events = self.scripted.pop_front().unwrap_or_default();
                for event in &events {
                    if let DisplayEvent::Resize {
                        width_px,
                        height_px,
                    } = *event
                    {
                        self.width_px = width_px;
                        self.height_px = height_px;
                    }
                }
                Ok(DriverResponse::Events(events))
            }
            DriverRequest::Present(snapshot) => {
                if snapshot.width_px != self.width_px || snapshot.height_px != self.height_px {
                    let reason = format!(
                        "snapshot is {}x{} but the window is {}x{}",
                        snapshot.width_px, snapshot.height_px, self.width_px, self.height_px
                    );
                    return Err(DisplayError::PresentationFailed(snapshot, reason));
                }
                trace!("HeadlessDisplayDriver: Present");
                Ok(DriverResponse::PresentComplete(snapshot))
            }
            DriverRequest::SetTitle(title) => {
                info!("HeadlessDisplayDriver: SetTitle '{}'", title);
                Ok(DriverResponse::TitleSet)
            }
        }
    }
}
