//! Core engine module - wires the monitoring subsystems together

mod engine;

pub use engine::Engine;
