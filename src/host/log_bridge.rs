// src/host/log_bridge.rs

//! Routes module log output into the `log` facade.

use crate::module::{region, RegionError};
use log::{debug, log, warn, Level};

/// Target for messages the module prints.
pub const MODULE_TARGET: &str = "module";
/// Target for the module's plain "log" channel (level 1).
pub const MODULE_LOG_TARGET: &str = "module::log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogChannel {
    Info,
    Log,
    Warn,
    Error,
}

impl LogChannel {
    /// Maps the numeric level the module passes to `print`. Unknown levels
    /// have no channel.
    pub fn from_level(level: u32) -> Option<Self> {
        match level {
            0 => Some(LogChannel::Info),
            1 => Some(LogChannel::Log),
            2 => Some(LogChannel::Warn),
            3 => Some(LogChannel::Error),
            _ => None,
        }
    }

    pub fn target(self) -> &'static str {
        match self {
            LogChannel::Log => MODULE_LOG_TARGET,
            _ => MODULE_TARGET,
        }
    }

    pub fn level(self) -> Level {
        match self {
            LogChannel::Info | LogChannel::Log => Level::Info,
            LogChannel::Warn => Level::Warn,
            LogChannel::Error => Level::Error,
        }
    }
}

/// Copies `length` bytes at `pointer` out of module memory as text. Invalid
/// UTF-8 is replaced rather than rejected.
pub fn decode_text(memory: &[u8], pointer: u32, length: u32) -> Result<String, RegionError> {
    let bytes = region(memory, pointer, length as usize)?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Emits the text at `(pointer, length)` on the channel for `level`.
/// Returns the text that was logged, if any.
pub fn forward(memory: &[u8], pointer: u32, length: u32, level: u32) -> Option<String> {
    let Some(channel) = LogChannel::from_level(level) else {
        debug!("print: dropping message with unknown level {}", level);
        return None;
    };
    forward_to(memory, pointer, length, channel)
}

pub fn forward_to(
    memory: &[u8],
    pointer: u32,
    length: u32,
    channel: LogChannel,
) -> Option<String> {
    match decode_text(memory, pointer, length) {
        Ok(text) => {
            log!(target: channel.target(), channel.level(), "{}", text);
            Some(text)
        }
        Err(e) => {
            warn!("print: ignoring message: {}", e);
            None
        }
    }
}
