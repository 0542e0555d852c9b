//! Havilah Lash Studio API server - Library exports for testing
//!
//! (c) Softlandia 2025

pub mod api;
pub mod core;
pub mod infrastructure;
