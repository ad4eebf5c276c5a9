//! # Radmap Core
//!
//! This crate provides the core data structures and reconciliation state for
//! live radiation telemetry. It defines the `TelemetrySample` update shape,
//! the merged `DeviceRecord`, the `DeviceStateStore` that reconciles an
//! unordered update stream into one record per device, and the fixed-size
//! `RollingWindow` backing the real-time strip chart of the focused device.

mod sample;
mod store;
mod window;

pub use sample::{AlertTier, DeviceRecord, TelemetrySample};
pub use store::DeviceStateStore;
pub use window::{RollingWindow, WINDOW_CAPACITY};
