//! # Controller Module
//!
//! Everything between the remote controller's native stick values and the
//! gamepad the operating system sees.
//!
//! This module handles:
//! - Mapping native stick units to gamepad axis values and back
//! - The axis snapshot shared between the polling and publishing loops
//! - The camera dial button rule
//! - Gamepad output sinks (uinput virtual device, log-only)

pub mod mapping;
pub mod state;
pub mod output;
#[cfg(target_os = "linux")]
pub mod uinput;
