//! mediagen library crate.
//!
//! This module exposes the internal components for integration testing.

pub mod config;
pub mod gen;
