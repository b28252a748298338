//! In-process notice delivery
//!
//! Default [`NoticeSink`] implementation over tokio broadcast channels.
//! Hosts register one receiver per connected player plus one for the
//! all-players lane, and forward received lines over their own transport.
//! Supports multiple receivers per identity (e.g., spectating consoles).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::broadcast;

use chatguard_types::host_adapter::NoticeSink;

use crate::prelude::*;

/// A text line addressed to one player or to everyone
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
	pub text: Box<str>,
}

impl Notice {
	pub fn new(text: impl Into<Box<str>>) -> Self {
		Self { text: text.into() }
	}
}

/// Result of delivering a notice to a player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
	/// Notice delivered to N receivers
	Delivered(usize),
	/// No receiver is registered for the player
	Offline,
}

/// Configuration
#[derive(Clone, Debug)]
pub struct BroadcastConfig {
	/// Maximum number of notices to buffer per receiver
	pub buffer_size: usize,
}

impl Default for BroadcastConfig {
	fn default() -> Self {
		Self { buffer_size: 64 }
	}
}

/// Manages per-player notice channels and the all-players lane
pub struct NoticeBroadcast {
	players: parking_lot::RwLock<HashMap<IdentityKey, broadcast::Sender<Notice>>>,
	everyone: broadcast::Sender<Notice>,
	config: BroadcastConfig,
}

impl NoticeBroadcast {
	/// Create a new manager with default config
	pub fn new() -> Self {
		Self::with_config(BroadcastConfig::default())
	}

	/// Create with custom config
	pub fn with_config(config: BroadcastConfig) -> Self {
		let (everyone, _) = broadcast::channel(config.buffer_size);
		Self { players: parking_lot::RwLock::new(HashMap::new()), everyone, config }
	}

	/// Register a receiver for one player's private notices.
	///
	/// Multiple receivers per identity are supported; each gets every line.
	pub fn register_player(&self, key: IdentityKey) -> broadcast::Receiver<Notice> {
		let mut players = self.players.write();
		let sender = players
			.entry(key.clone())
			.or_insert_with(|| broadcast::channel(self.config.buffer_size).0);
		debug!(identity = %key, "Notice receiver registered");
		sender.subscribe()
	}

	/// Drop the channel for a player (on disconnect).
	///
	/// Outstanding receivers see the lane close.
	pub fn unregister_player(&self, key: &IdentityKey) {
		if self.players.write().remove(key).is_some() {
			debug!(identity = %key, "Notice channel removed");
		}
	}

	/// Subscribe to the all-players lane
	pub fn subscribe_all(&self) -> broadcast::Receiver<Notice> {
		self.everyone.subscribe()
	}

	/// Send a notice to a specific player
	pub fn send_to_player(&self, key: &IdentityKey, notice: Notice) -> DeliveryResult {
		let players = self.players.read();
		match players.get(key) {
			Some(sender) => match sender.send(notice) {
				Ok(receivers) => DeliveryResult::Delivered(receivers),
				Err(_) => DeliveryResult::Offline,
			},
			None => DeliveryResult::Offline,
		}
	}

	/// Send a notice on the all-players lane, returning the receiver count
	pub fn send_to_all(&self, notice: Notice) -> usize {
		self.everyone.send(notice).unwrap_or(0)
	}

	/// Check if a player has at least one registered receiver
	pub fn is_player_online(&self, key: &IdentityKey) -> bool {
		self.players.read().get(key).is_some_and(|s| s.receiver_count() > 0)
	}

	/// Number of players with a registered channel
	pub fn online_count(&self) -> usize {
		self.players.read().len()
	}

	/// Drop channels whose receivers have all gone away
	pub fn cleanup(&self) {
		self.players.write().retain(|_, sender| sender.receiver_count() > 0);
	}
}

impl Default for NoticeBroadcast {
	fn default() -> Self {
		Self::new()
	}
}

impl NoticeSink for NoticeBroadcast {
	fn notify_player(&self, player: &PlayerInfo, text: &str) {
		let key = player.identity_key();
		if self.send_to_player(&key, Notice::new(text)) == DeliveryResult::Offline {
			debug!(identity = %key, "Dropping notice for offline player");
		}
	}

	fn notify_all(&self, text: &str) {
		self.send_to_all(Notice::new(text));
	}
}


// vim: ts=4
