//! api-cli
//!
//! Command-line interface for authoring Virtuoso test steps.

pub mod client;
pub mod commands;
pub mod output;
