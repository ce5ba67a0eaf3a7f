//! Common test utilities for regs-harvest integration tests

#[allow(dead_code)]
pub mod api;
#[allow(dead_code)]
pub mod config;
#[allow(dead_code)]
pub mod fixtures;

#[allow(unused_imports)]
pub use api::*;
pub use config::*;
#[allow(unused_imports)]
pub use fixtures::*;
