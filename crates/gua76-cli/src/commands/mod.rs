//! CLI command implementations.

pub mod common;
pub mod controls;
pub mod curve;
pub mod presets;
pub mod simulate;
