//! Arrangement view for a DAW whose audio engine runs out of process.
//!
//! The engine owns the transport, this crate projects it locally, renders
//! the timeline and turns pointer input into engine commands.
pub mod config;
pub mod core;
pub mod engine;
pub mod ui;
