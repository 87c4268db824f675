// src/orchestrator.rs
//! Orchestrates the main application flow, coordinating between the display,
//! the host context, the frame driver and the simulation module.
//!
//! One call to `process_event_cycle` polls the display, forwards input to the
//! module, runs one frame and presents the result. Everything runs on the
//! calling thread; each module callback completes before the next begins.

use crate::display::{DisplayEvent, DisplayManager};
use crate::frame::{FrameClock, FrameDriver};
use crate::host::HostContext;
use crate::input;
use crate::module::SimulationModule;
use anyhow::{Context, Result};

/// Represents the status of the orchestrator after one cycle.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OrchestratorStatus {
    /// Keep cycling.
    Running,
    /// The window was closed or the frame limit was reached.
    Shutdown,
}

pub struct AppOrchestrator<'a> {
    module: &'a mut dyn SimulationModule,
    host: &'a mut HostContext,
    display: &'a mut DisplayManager,
    clock: &'a dyn FrameClock,
    frames: FrameDriver,
    max_frames: Option<u64>,
}

impl<'a> AppOrchestrator<'a> {
    /// Starts the frame clock and initialises the module with `seed`.
    ///
    /// The clock starts before `onInit`, so the first frame delta includes
    /// the time spent initialising.
    pub fn start(
        module: &'a mut dyn SimulationModule,
        host: &'a mut HostContext,
        display: &'a mut DisplayManager,
        clock: &'a dyn FrameClock,
        seed: u32,
        max_frames: Option<u64>,
    ) -> Self {
        let metrics = display.metrics();
        host.resize_viewport(metrics.width_px, metrics.height_px);

        let frames = FrameDriver::start(clock.now_ms());
        log::info!("Orchestrator: Initializing module with seed {}", seed);
        module.on_init(host, seed);
        match host.surface() {
            Some(surface) => {
                let title = format!(
                    "{} [{}x{}]",
                    display.title(),
                    surface.width_cells,
                    surface.height_cells
                );
                if let Err(e) = display.set_title(&title) {
                    log::warn!("Orchestrator: {:#}", e);
                }
            }
            None => log::warn!("Orchestrator: module did not call initTerm during onInit"),
        }

        AppOrchestrator {
            module,
            host,
            display,
            clock,
            frames,
            max_frames,
        }
    }

    pub fn process_event_cycle(&mut self) -> Result<OrchestratorStatus> {
        if self.process_display_events()? == OrchestratorStatus::Shutdown {
            return Ok(OrchestratorStatus::Shutdown);
        }

        let now = self.clock.now_ms();
        self.frames
            .tick_module(now, &mut *self.module, &mut *self.host);

        self.display
            .present(self.host.canvas().image(), self.host.layout())
            .context("Failed to present frame")?;

        match self.max_frames {
            Some(limit) if self.frames.frames() >= limit => {
                log::info!("Orchestrator: Reached frame limit of {}. Signaling shutdown.", limit);
                Ok(OrchestratorStatus::Shutdown)
            }
            _ => Ok(OrchestratorStatus::Running),
        }
    }

    fn process_display_events(&mut self) -> Result<OrchestratorStatus> {
        log::trace!("Orchestrator: Processing available display events...");
        let events = self.display.poll_events()?;

        for event in events {
            log::debug!("Orchestrator: Handling DisplayEvent: {:?}", event);
            match event {
                DisplayEvent::CloseRequested => {
                    log::info!("Orchestrator: CloseRequested event received. Signaling shutdown.");
                    return Ok(OrchestratorStatus::Shutdown);
                }
                DisplayEvent::Resize {
                    width_px,
                    height_px,
                } => {
                    self.host.resize_viewport(width_px, height_px);
                }
                DisplayEvent::FocusGained | DisplayEvent::FocusLost => {}
                _ => {
                    if let Some(input) = input::normalize(&event, self.host.layout()) {
                        input.dispatch(&mut *self.module, &mut *self.host);
                    } else {
                        log::trace!("Orchestrator: Dropped input before the surface exists.");
                    }
                }
            }
        }
        Ok(OrchestratorStatus::Running)
    }

    pub fn frames(&self) -> u64 {
        self.frames.frames()
    }
}
