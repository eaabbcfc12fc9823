//! Nearby CLI library
//!
//! Argument parsing, configuration loading and the simulated two-device demo
//! behind the `nearby` binary.

pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
