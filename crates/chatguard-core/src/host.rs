//! Simple host adapter implementations
//!
//! Hosts embedding the engine normally provide their own `Clock` and
//! `Roster` backed by the session runtime. The implementations here cover
//! standalone use: a monotonic process clock, a hand-driven clock for
//! deterministic tests and offline sessions, and a roster over an
//! explicitly maintained player list.

use std::time::Instant;

use chatguard_types::host_adapter::{Clock, Roster};

use crate::prelude::*;

/// Monotonic clock anchored at construction time
pub struct SteadyClock {
	origin: Instant,
}

impl SteadyClock {
	pub fn new() -> Self {
		Self { origin: Instant::now() }
	}
}

impl Default for SteadyClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for SteadyClock {
	fn now(&self) -> Timestamp {
		Timestamp(self.origin.elapsed().as_secs_f64())
	}
}

/// Hand-driven clock for tests and offline/replay contexts
pub struct ManualClock {
	now: parking_lot::Mutex<f64>,
}

impl ManualClock {
	pub fn new() -> Self {
		Self::starting_at(0.0)
	}

	pub fn starting_at(seconds: f64) -> Self {
		Self { now: parking_lot::Mutex::new(seconds) }
	}

	pub fn advance(&self, seconds: f64) {
		*self.now.lock() += seconds;
	}

	pub fn set(&self, seconds: f64) {
		*self.now.lock() = seconds;
	}
}

impl Default for ManualClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for ManualClock {
	fn now(&self) -> Timestamp {
		Timestamp(*self.now.lock())
	}
}

/// Roster over an explicitly maintained player list
pub struct StaticRoster {
	players: parking_lot::RwLock<Vec<PlayerInfo>>,
}

impl StaticRoster {
	pub fn new() -> Self {
		Self { players: parking_lot::RwLock::new(Vec::new()) }
	}

	pub fn add(&self, player: PlayerInfo) {
		self.players.write().push(player);
	}

	/// Remove every entry resolving to the player's identity
	pub fn remove(&self, player: &PlayerInfo) {
		let key = player.identity_key();
		self.players.write().retain(|p| p.identity_key() != key);
	}

	pub fn clear(&self) {
		self.players.write().clear();
	}
}

impl Default for StaticRoster {
	fn default() -> Self {
		Self::new()
	}
}

impl Roster for StaticRoster {
	fn connected_players(&self) -> Vec<PlayerInfo> {
		self.players.read().clone()
	}
}


// vim: ts=4
