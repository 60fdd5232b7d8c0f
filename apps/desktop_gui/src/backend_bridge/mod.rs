//! Bridge between the egui thread and the tokio-backed plot client.

pub mod commands;
pub mod runtime;
