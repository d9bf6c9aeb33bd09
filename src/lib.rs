//! # RC-Nx Bridge Library
//!
//! Use a DJI RC-N1/RC-N2 remote controller as a virtual gamepad.
//!
//! The bridge polls the controller over its DUML serial link for stick
//! telemetry and republishes the stick and camera dial positions through a
//! virtual gamepad. A device simulator is included for testing without
//! hardware.

pub mod bridge;
pub mod config;
pub mod controller;
pub mod duml;
pub mod error;
pub mod logging;
pub mod serial;
pub mod simulator;
