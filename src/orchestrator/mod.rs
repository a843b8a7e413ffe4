//! Application-level orchestration.
//!
//! The controller owns session, wizard and flow state and runs remote calls in
//! the background. The TUI talks to it only through commands and events.

mod controller;

pub(crate) use controller::{run_controller, AppEvent, UiCommand};
