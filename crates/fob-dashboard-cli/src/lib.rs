//! Reference display for the fob dashboard plugin.
//!
//! The binary listens for plugin connections, aggregates incoming batches
//! into a [`display::DisplayState`] and renders it in the terminal.

pub mod cli;
pub mod display;
pub mod error;
pub mod logger;
pub mod run;
pub mod server;
pub mod ui;
