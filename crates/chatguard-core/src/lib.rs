//! Core infrastructure for chatguard.
//!
//! This crate contains the shared infrastructure the engine crate builds
//! on: the settings subsystem, the in-process notice broadcast manager,
//! the periodic ticker driving decay sweeps, simple host adapter
//! implementations, and the `App` wiring hub.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod broadcast;
pub mod host;
pub mod settings;
pub mod ticker;

mod prelude;

// Re-export commonly used types
pub use app::{App, AppBuilder, AppState};
pub use broadcast::{DeliveryResult, Notice, NoticeBroadcast};
pub use host::{ManualClock, StaticRoster, SteadyClock};
pub use ticker::{PeriodicTask, Ticker};

// vim: ts=4
