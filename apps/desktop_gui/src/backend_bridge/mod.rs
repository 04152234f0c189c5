//! Bridge between the egui thread and the async generation worker.

pub mod commands;
pub mod runtime;
