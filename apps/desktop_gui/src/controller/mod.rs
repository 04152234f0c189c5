//! Controller layer: UI events, reducer-like state transitions, timers, and command orchestration.

pub mod events;
pub mod feature_gate;
pub mod form;
pub mod notification;
pub mod orchestration;
pub mod reducer;
pub mod schedule;
