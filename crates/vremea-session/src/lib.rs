//! Session orchestration for Vremea.
//!
//! `SessionController` owns the UI-facing state, runs place resolution and
//! forecast fetches in the background, and applies their results in a
//! well-defined order.

pub mod controller;
pub mod error_mapping;
pub mod service;
pub mod state;

pub use controller::{SessionController, SessionEvent};
pub use service::{FetchKind, SessionMessage, SessionServices};
pub use state::{SessionState, SessionStatus};
