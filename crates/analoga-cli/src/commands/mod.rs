//! CLI command implementations.

pub mod common;
pub mod consoles;
pub mod models;
pub mod params;
pub mod render;
