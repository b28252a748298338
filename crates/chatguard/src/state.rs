//! Per-identity throttle state
//!
//! One [`SpamState`] record per distinct player identity, holding the chat
//! spam score and the rejoin penalty counter. The record only moves when
//! the engine feeds it an event or a decay tick; it never reads the clock
//! itself.

use serde::{Deserialize, Serialize};

use crate::prelude::*;
use crate::settings::GuardConfig;

/// Messages closer together than this count as flooding
const FLOOD_WINDOW_SECS: f64 = 1.0;

/// Throttle state for one player identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamState {
	/// Time of the last evaluated message
	pub last_chat: Timestamp,
	/// Accumulated spam score; decays by 1.0 per chat decay tick
	pub spam: f64,
	/// Chat is suppressed while set; cleared only by the decay sweep
	pub is_blocked: bool,
	/// Tell the player once the computed wait reaches zero
	pub notify_on_unblock: bool,

	/// Time of the last completed join
	pub last_join: Timestamp,
	/// Joins that came too soon after the previous one; decays by 1 per
	/// rejoin decay tick
	pub rejoin_count: u32,
	/// Bare network address, once a join correlated one
	pub address: Option<Box<str>>,
}

impl Default for SpamState {
	fn default() -> Self {
		Self {
			last_chat: Timestamp::DISTANT_PAST,
			spam: 0.0,
			is_blocked: false,
			notify_on_unblock: false,
			last_join: Timestamp::DISTANT_PAST,
			rejoin_count: 0,
			address: None,
		}
	}
}

impl SpamState {
	/// Seconds the player must wait before the next message, or else the
	/// chat will be blocked. Blends the score left until the threshold with
	/// the time since the last message, assuming the decay sweep keeps
	/// running at its fixed 1 s rate. Negative means already safe.
	pub fn next_safe_message_time(&self, now: Timestamp, config: &GuardConfig) -> f64 {
		let time_since_last_chat = now.seconds_since(self.last_chat);
		let score_left = config.spam_threshold - self.spam;
		(config.safe_chat_delay * 2.0 - (score_left + time_since_last_chat)) * 0.5
	}

	/// Score one message: accumulate penalty for messages arriving faster
	/// than twice the safe delay, with an extra burst penalty for
	/// near-simultaneous ones, and stamp the message time. The score is
	/// capped at the threshold so excess never extends the wait beyond a
	/// single-threshold block.
	pub fn score_message(&mut self, now: Timestamp, config: &GuardConfig) {
		let throttle_delay = config.safe_chat_delay * 2.0;
		let time_since_last_chat = now.seconds_since(self.last_chat);
		self.last_chat = now;

		if time_since_last_chat < throttle_delay {
			self.spam += throttle_delay - time_since_last_chat;
			if time_since_last_chat < FLOOD_WINDOW_SECS {
				self.spam += throttle_delay * 2.0;
			}
			self.spam = self.spam.min(config.spam_threshold);
		}
	}

	/// One chat decay tick: score drops by 1.0, floored at zero
	pub fn apply_chat_decay(&mut self) {
		self.spam = (self.spam - 1.0).max(0.0);
	}

	/// One rejoin decay tick
	pub fn apply_rejoin_decay(&mut self) {
		self.rejoin_count = self.rejoin_count.saturating_sub(1);
	}

	/// Bookkeeping for a completed join. Returns true when the join counted
	/// as a rejoin (came sooner than the safe delay after the previous one).
	pub fn record_join(&mut self, now: Timestamp, config: &GuardConfig) -> bool {
		let too_soon = now.seconds_since(self.last_join) < config.safe_rejoin_delay;
		if too_soon {
			self.rejoin_count += 1;
		}
		self.last_join = now;
		too_soon
	}
}

/// Clamp a wait value for presentation: whole seconds, never negative
pub fn presented_wait_secs(wait: f64) -> u32 {
	wait.max(0.0).ceil() as u32
}


// vim: ts=4
