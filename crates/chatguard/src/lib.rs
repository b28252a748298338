//! Chat throttling and rejoin spam protection
//!
//! Per-identity rate limiting for chat messages and reconnect attempts in
//! real-time multi-user session servers.
//!
//! # Features
//!
//! - Spam scoring from message timing, with a burst penalty for flooding
//! - Block/unblock driven by a periodic decay sweep, with one-time release
//!   notices
//! - Rejoin spam tracking keyed by network address, correlated to player
//!   identities as joins complete
//! - Live tunables via the settings subsystem
//!
//! # Settings
//!
//! - `antispam.safe_chat_delay` - message spacing that never accumulates score
//! - `antispam.spam_threshold` - score at which chat is blocked
//! - `antispam.safe_rejoin_delay` - rejoin spacing that never accumulates penalty
//! - `antispam.rejoin_spam_allowed` - rejoins allowed before connections are refused
//!
//! # Usage
//!
//! Build an [`App`](chatguard_core::App) with your host's clock, roster,
//! and notice sink, register the settings, then drive a [`ChatGuard`] from
//! your event hooks:
//!
//! ```
//! use std::sync::Arc;
//! use chatguard::ChatGuard;
//! use chatguard_core::{AppBuilder, NoticeBroadcast, StaticRoster};
//! use chatguard_types::types::PlayerInfo;
//!
//! # fn main() -> chatguard_types::error::CgResult<()> {
//! let mut builder = AppBuilder::new()
//! 	.with_roster(Arc::new(StaticRoster::new()))
//! 	.with_notices(Arc::new(NoticeBroadcast::new()));
//! chatguard::register_settings(builder.settings_registry())?;
//! let guard = ChatGuard::new(builder.build()?)?;
//!
//! let alice = PlayerInfo::new(Some("id:alice"), "alice");
//! assert!(guard.handle_message(&alice).is_delivered());
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod engine;
pub mod registry;
pub mod settings;
pub mod state;
pub mod tasks;

mod prelude;

pub use engine::{ChatGuard, ConnectVerdict, GuardStats, MessageVerdict};
pub use settings::GuardConfig;
pub use state::SpamState;

use crate::prelude::*;

pub fn register_settings(
	registry: &mut chatguard_core::settings::SettingsRegistry,
) -> CgResult<()> {
	settings::register_settings(registry)
}

// vim: ts=4
