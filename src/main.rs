// src/main.rs

//! `gridhost` runs a grid-based simulation module in a scaled window.
//!
//! The crate does not ship a glyph atlas. Before running, provide a PNG whose
//! glyphs sit in a fixed-column grid of `font.glyph_width` x `font.glyph_height`
//! cells, indexed row-major from the top left (index 32 is the space glyph).
//! Put it at `./font.png`, or point `font.atlas_path` at it in `gridhost.json`
//! (or the file named by `$GRIDHOST_CONFIG`). A missing atlas is fatal.

// Declare modules
pub mod atlas;
pub mod color;
pub mod compositor;
pub mod config;
pub mod display;
pub mod frame;
pub mod host;
pub mod input;
pub mod keys;
pub mod module;
pub mod orchestrator;
pub mod surface;
pub mod tint;
pub mod viewport;

use crate::{
    atlas::GlyphAtlas,
    config::{FontConfig, CONFIG, CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE},
    display::{create_driver, DisplayManager, DriverConfig},
    frame::{FramePacer, SystemClock},
    host::{HostContext, HostSettings},
    module::demo::DemoModule,
    orchestrator::{AppOrchestrator, OrchestratorStatus},
    tint::TintCache,
};

use anyhow::{Context, Result};
use log::{error, info};

/// Terminal size the built-in demo module asks for.
const DEMO_COLUMNS: u32 = 80;
const DEMO_ROWS: u32 = 60;

/// Loads the glyph atlas named by `font`. The error names the config key to set.
fn load_atlas(font: &FontConfig) -> Result<GlyphAtlas> {
    GlyphAtlas::load(&font.atlas_path, font.glyph_width, font.glyph_height).with_context(|| {
        format!(
            "Failed to load glyph atlas; set font.atlas_path in {} or ${}",
            DEFAULT_CONFIG_FILE, CONFIG_ENV_VAR
        )
    })
}

/// Logs a failed snapshot without letting it replace the loop's result.
fn finish(result: Result<()>, snapshot: Option<Result<()>>) -> Result<()> {
    if let Some(Err(e)) = snapshot {
        error!("Failed to write snapshot: {:#}", e);
    }
    result
}

/// Main entry point for `gridhost`.
fn main() -> Result<()> {
    // Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting gridhost...");
    let config = &*CONFIG;

    // --- Assets and module (both fatal) ---
    let atlas = load_atlas(&config.font)?;
    let tints = TintCache::new(atlas, config.font.tint_mode);

    let mut module = DemoModule::instantiate(DEMO_COLUMNS, DEMO_ROWS)
        .context("Failed to instantiate simulation module")?;
    info!("Simulation module instantiated.");

    // --- Display ---
    let driver = create_driver(config.display.driver).context("Failed to create display driver")?;
    let mut display = DisplayManager::new(
        driver,
        DriverConfig {
            title: config.display.title.clone(),
            window_width: config.display.window_width,
            window_height: config.display.window_height,
        },
        config.display.clear_color,
    )?;

    let metrics = display.metrics().clone();
    let mut host = HostContext::new(
        tints,
        HostSettings {
            whitespace_glyph: config.font.whitespace_glyph,
            max_scale: config.display.max_scale,
        },
        (metrics.width_px, metrics.height_px),
    );

    // --- Start ---
    let clock = SystemClock::new();
    let seed = config.runtime.resolve_seed();
    let max_frames = config.runtime.frame_limit(config.display.driver);
    let mut pacer = FramePacer::new(config.runtime.target_fps);
    info!(
        "Frame interval {:?}, frame limit {:?}",
        pacer.interval(),
        max_frames
    );

    let mut orchestrator = AppOrchestrator::start(
        &mut module,
        &mut host,
        &mut display,
        &clock,
        seed,
        max_frames,
    );

    // --- Main Event Loop ---
    info!("Starting main event loop...");
    let mut result = Ok(());
    loop {
        match orchestrator.process_event_cycle() {
            Ok(OrchestratorStatus::Running) => pacer.wait_for_next_tick(),
            Ok(OrchestratorStatus::Shutdown) => {
                info!("Orchestrator requested shutdown. Exiting main loop.");
                break;
            }
            Err(e) => {
                error!(
                    "Error in orchestrator event cycle: {:#}. Root cause: {:?}. Exiting.",
                    e,
                    e.root_cause()
                );
                result = Err(e);
                break;
            }
        }
    }
    let frames = orchestrator.frames();
    drop(orchestrator);

    // --- Cleanup ---
    let snapshot = config
        .runtime
        .snapshot_path
        .as_deref()
        .map(|path| host.save_snapshot(path));
    info!(
        "gridhost exited after {} frames ({} presented).",
        frames,
        display.frames_presented()
    );

    finish(result, snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::path::PathBuf;
    use test_log::test;

    #[test]
    fn it_should_name_the_config_key_when_the_atlas_is_missing() {
        let font = FontConfig {
            atlas_path: PathBuf::from("/nonexistent/gridhost-font.png"),
            ..FontConfig::default()
        };

        let message = format!("{:#}", load_atlas(&font).unwrap_err());

        assert!(message.contains("font.atlas_path"));
        assert!(message.contains("/nonexistent/gridhost-font.png"));
    }

    #[test]
    fn it_should_keep_the_loop_error_when_the_snapshot_also_fails() {
        let result = finish(
            Err(anyhow!("present failed")),
            Some(Err(anyhow!("disk full"))),
        );
        assert_eq!(result.unwrap_err().to_string(), "present failed");
    }

    #[test]
    fn it_should_not_fail_a_clean_exit_on_a_snapshot_error() {
        assert!(finish(Ok(()), Some(Err(anyhow!("disk full")))).is_ok());
        assert!(finish(Ok(()), None).is_ok());
    }
}
