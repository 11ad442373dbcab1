//! CLI command implementations.

pub mod info;
pub mod margin;
pub mod orient;
pub mod presets;
pub mod solidify;
