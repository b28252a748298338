//! Throttling engine
//!
//! `ChatGuard` is the host-agnostic decision engine behind the narrow
//! event interface: message-send, connection-attempt, join-completion,
//! session reset, and the two decay sweeps. Hosts call the handlers from
//! their own hooks and act on the returned verdicts; notices go out
//! through the injected sink.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::prelude::*;
use crate::registry::IdentityRegistry;
use crate::settings::GuardConfig;
use crate::state::{presented_wait_secs, SpamState};
use crate::tasks::{ChatDecayTask, RejoinDecayTask};

/// Decision for one message event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageVerdict {
	/// Let the message through
	Delivered,
	/// Suppress the message; the sender must wait
	Suppressed {
		/// Whole seconds until the player may send again
		retry_after: u32,
	},
}

impl MessageVerdict {
	pub fn is_delivered(&self) -> bool {
		matches!(self, MessageVerdict::Delivered)
	}
}

/// Decision for one connection attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectVerdict {
	Accepted,
	/// Refuse the connection, carrying the reason back to the client
	Rejected { reason: String },
}

impl ConnectVerdict {
	pub fn is_accepted(&self) -> bool {
		matches!(self, ConnectVerdict::Accepted)
	}
}

/// Engine statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardStats {
	/// Identities with a state record this session
	pub tracked_identities: usize,
	/// Identities currently blocked from chatting
	pub blocked_identities: usize,
}

/// The spam-scoring and cooldown engine
pub struct ChatGuard {
	app: App,
	registry: Mutex<IdentityRegistry>,
}

impl ChatGuard {
	/// Create the engine. Fails if the throttling settings were not
	/// registered on the app (see [`crate::register_settings`]).
	pub fn new(app: App) -> CgResult<Arc<Self>> {
		GuardConfig::validate(&app.settings)?;
		Ok(Arc::new(Self { app, registry: Mutex::new(IdentityRegistry::new()) }))
	}

	/// Spawn the chat decay sweep (1 s period) and the rejoin decay sweep
	/// (period follows the safe-rejoin-delay setting) on the app ticker.
	pub fn start(self: &Arc<Self>) {
		self.app.ticker.spawn(self.clone(), Arc::new(ChatDecayTask));
		self.app.ticker.spawn(self.clone(), Arc::new(RejoinDecayTask));
	}

	pub fn app(&self) -> &App {
		&self.app
	}

	pub(crate) fn config(&self) -> GuardConfig {
		GuardConfig::load(&self.app.settings)
	}

	/// Decide one message event.
	///
	/// Blocked players are reminded of the remaining wait and suppressed.
	/// Otherwise the message is scored; crossing the threshold blocks the
	/// player and announces it to everyone. Messages that pass while the
	/// player is close to the threshold trigger a private pacing warning.
	pub fn handle_message(&self, player: &PlayerInfo) -> MessageVerdict {
		let config = self.config();
		let now = self.app.clock.now();
		let mut registry = self.registry.lock();
		let state = registry.resolve(player.identity_key());

		if !state.is_blocked {
			state.score_message(now, &config);

			if state.spam >= config.spam_threshold {
				state.is_blocked = true;
				state.notify_on_unblock = true;
				let wait = presented_wait_secs(state.next_safe_message_time(now, &config));
				info!(player = %player.display_name, wait, "Chat blocked");
				self.app.notices.notify_all(&format!(
					"{} can't send messages for {} seconds.",
					player.display_name, wait
				));
			}
		}

		if state.is_blocked {
			let wait = presented_wait_secs(state.next_safe_message_time(now, &config));
			self.app
				.notices
				.notify_player(player, &format!("Chat blocked. Wait {} seconds.", wait));
			return MessageVerdict::Suppressed { retry_after: wait };
		}

		let wait = state.next_safe_message_time(now, &config);
		if wait > 0.0 {
			if wait >= 0.5 {
				self.app.notices.notify_player(
					player,
					&format!("Wait {} seconds.", presented_wait_secs(wait)),
				);
			}
			if wait > 2.0 {
				// Waits beyond a few seconds are hard to self-time
				state.notify_on_unblock = true;
			}
		}

		MessageVerdict::Delivered
	}

	/// Decide one connection attempt, before any identity is known.
	///
	/// Records the nickname → address mapping for later correlation, then
	/// rejects outright if the address already carries too much rejoin
	/// penalty under any known identity.
	pub fn handle_connect(&self, raw_address: &str, display_name: &str) -> ConnectVerdict {
		let config = self.config();
		let address = bare_address(raw_address);
		let mut registry = self.registry.lock();
		registry.record_pending_join(display_name, address);

		match registry.find_by_address(address) {
			Some(state) if state.rejoin_count + 1 >= config.rejoin_spam_allowed => {
				info!(player = %display_name, %address, "Connection rejected for rejoin spam");
				ConnectVerdict::Rejected {
					reason: format!(
						"Your rejoins are spamming the chat. Wait {} seconds.",
						config.safe_rejoin_delay as u32
					),
				}
			}
			Some(_) => ConnectVerdict::Accepted,
			None => {
				debug!(%address, "No identity currently holds this address");
				ConnectVerdict::Accepted
			}
		}
	}

	/// Account a completed join: consume the pending address correlation
	/// and penalize joins arriving sooner than the safe rejoin delay.
	pub fn handle_join(&self, player: &PlayerInfo) {
		let config = self.config();
		let now = self.app.clock.now();
		let mut registry = self.registry.lock();
		let pending = registry.take_pending_join(&player.display_name);
		let state = registry.resolve(player.identity_key());

		if state.record_join(now, &config) {
			debug!(
				player = %player.display_name,
				count = state.rejoin_count,
				"Join counted as rejoin"
			);
		}

		if let Some(address) = pending {
			debug!(player = %player.display_name, %address, "Correlated join address");
			state.address = Some(address);
		}
	}

	/// Full reset on a new session load. The only path that discards
	/// identity state.
	pub fn handle_reset(&self) {
		self.registry.lock().reset();
		info!("Session reset: throttle state cleared");
	}

	/// Chat decay tick: for every connected player, decay the spam score
	/// and lift the block once the computed wait has elapsed. This is the
	/// only path that clears a block, so a player who goes silent is still
	/// released on time.
	pub fn chat_decay_sweep(&self) {
		let config = self.config();
		let now = self.app.clock.now();
		let players = self.app.roster.connected_players();
		let mut registry = self.registry.lock();

		for player in &players {
			let state = registry.resolve(player.identity_key());
			state.apply_chat_decay();

			if state.notify_on_unblock && state.next_safe_message_time(now, &config) <= 0.0 {
				state.notify_on_unblock = false;
				state.is_blocked = false;
				self.app.notices.notify_player(player, "You can send messages now.");
			}
		}
	}

	/// Rejoin decay tick: every known identity sheds one rejoin penalty
	pub fn rejoin_decay_sweep(&self) {
		let mut registry = self.registry.lock();
		for state in registry.states_mut() {
			state.apply_rejoin_decay();
		}
	}

	/// Snapshot of one identity's state, if it exists
	pub fn state_of(&self, key: &IdentityKey) -> Option<SpamState> {
		self.registry.lock().get(key).cloned()
	}

	pub fn stats(&self) -> GuardStats {
		let registry = self.registry.lock();
		GuardStats {
			tracked_identities: registry.len(),
			blocked_identities: registry.blocked_count(),
		}
	}
}

/// Strip the port suffix after the first `:`; strings without one are used
/// whole.
fn bare_address(raw: &str) -> &str {
	match raw.find(':') {
		Some(pos) => &raw[..pos],
		None => raw,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::settings::register_settings;
	use chatguard_core::app::AppBuilder;
	use chatguard_core::host::{ManualClock, StaticRoster};
	use chatguard_types::host_adapter::NoticeSink;

	/// Captures every outbound line for assertions
	#[derive(Default)]
	struct RecordingSink {
		player_lines: parking_lot::Mutex<Vec<(String, String)>>,
		all_lines: parking_lot::Mutex<Vec<String>>,
	}

	impl RecordingSink {
		fn player_lines(&self) -> Vec<(String, String)> {
			self.player_lines.lock().clone()
		}

		fn all_lines(&self) -> Vec<String> {
			self.all_lines.lock().clone()
		}

		fn last_player_line(&self) -> Option<String> {
			self.player_lines.lock().last().map(|(_, line)| line.clone())
		}
	}

	impl NoticeSink for RecordingSink {
		fn notify_player(&self, player: &PlayerInfo, text: &str) {
			self.player_lines.lock().push((player.display_name.to_string(), text.to_string()));
		}

		fn notify_all(&self, text: &str) {
			self.all_lines.lock().push(text.to_string());
		}
	}

	struct Fixture {
		guard: Arc<ChatGuard>,
		clock: Arc<ManualClock>,
		roster: Arc<StaticRoster>,
		sink: Arc<RecordingSink>,
	}

	fn fixture() -> Fixture {
		let clock = Arc::new(ManualClock::new());
		let roster = Arc::new(StaticRoster::new());
		let sink = Arc::new(RecordingSink::default());

		let mut builder = AppBuilder::new()
			.with_clock(clock.clone())
			.with_roster(roster.clone())
			.with_notices(sink.clone());
		register_settings(builder.settings_registry()).unwrap();
		let app = builder.build().unwrap();

		let guard = ChatGuard::new(app).unwrap();
		Fixture { guard, clock, roster, sink }
	}

	fn alice() -> PlayerInfo {
		PlayerInfo::new(Some("id:alice"), "alice")
	}

	/// Run the chat decay sweep as the ticker would: advance one second,
	/// then sweep.
	fn tick_chat_decay(fx: &Fixture) {
		fx.clock.advance(1.0);
		fx.guard.chat_decay_sweep();
	}

	/// Flood until blocked; returns the number of messages it took
	fn flood_until_blocked(fx: &Fixture, player: &PlayerInfo) -> usize {
		for i in 0..100 {
			let verdict = fx.guard.handle_message(player);
			if !verdict.is_delivered() {
				return i + 1;
			}
			fx.clock.advance(0.1);
		}
		panic!("player was never blocked");
	}

	#[test]
	fn test_engine_requires_registered_settings() {
		let builder = AppBuilder::new()
			.with_roster(Arc::new(StaticRoster::new()))
			.with_notices(Arc::new(RecordingSink::default()));
		let app = builder.build().unwrap();

		assert!(ChatGuard::new(app).is_err());
	}

	#[test]
	fn test_spaced_messages_are_never_throttled() {
		let fx = fixture();
		let alice = alice();

		// Twice the safe chat delay between messages
		for _ in 0..50 {
			assert!(fx.guard.handle_message(&alice).is_delivered());
			fx.clock.advance(10.0);
		}

		let state = fx.guard.state_of(&alice.identity_key()).unwrap();
		assert_eq!(state.spam, 0.0);
		assert!(!state.is_blocked);
		assert!(fx.sink.player_lines().is_empty());
	}

	#[test]
	fn test_flooding_blocks_quickly() {
		let fx = fixture();
		let alice = alice();

		// Sub-second messages draw the burst penalty; well under 20
		// messages reach the threshold
		let blocked_at = flood_until_blocked(&fx, &alice);
		assert!(blocked_at <= 10, "blocked after {} messages", blocked_at);

		let state = fx.guard.state_of(&alice.identity_key()).unwrap();
		assert!(state.is_blocked);
		assert!(state.notify_on_unblock);
		assert_eq!(state.spam, 120.0);
	}

	#[test]
	fn test_block_announced_to_everyone() {
		let fx = fixture();
		let alice = alice();

		flood_until_blocked(&fx, &alice);

		let all = fx.sink.all_lines();
		assert_eq!(all.len(), 1);
		assert_eq!(all[0], "alice can't send messages for 5 seconds.");
	}

	#[test]
	fn test_blocked_messages_report_wait() {
		let fx = fixture();
		let alice = alice();

		flood_until_blocked(&fx, &alice);

		let verdict = fx.guard.handle_message(&alice);
		let MessageVerdict::Suppressed { retry_after } = verdict else {
			panic!("expected suppression, got {:?}", verdict);
		};
		assert!(retry_after > 0);
		assert_eq!(
			fx.sink.last_player_line().unwrap(),
			format!("Chat blocked. Wait {} seconds.", retry_after)
		);

		// The message path never mutates a blocked record
		let state = fx.guard.state_of(&alice.identity_key()).unwrap();
		assert_eq!(state.spam, 120.0);
		assert!(state.is_blocked);
	}

	#[test]
	fn test_block_is_lifted_only_by_sweep() {
		let fx = fixture();
		let alice = alice();
		fx.roster.add(alice.clone());

		flood_until_blocked(&fx, &alice);

		// Passing time alone does not unblock: the message path keeps
		// suppressing until a sweep observes the elapsed wait
		fx.clock.advance(120.0);
		assert!(!fx.guard.handle_message(&alice).is_delivered());

		// One sweep now observes wait <= 0 and releases the block
		fx.guard.chat_decay_sweep();
		let state = fx.guard.state_of(&alice.identity_key()).unwrap();
		assert!(!state.is_blocked);
		assert!(!state.notify_on_unblock);
		assert_eq!(fx.sink.last_player_line().unwrap(), "You can send messages now.");

		assert!(fx.guard.handle_message(&alice).is_delivered());
	}

	#[test]
	fn test_unblock_notice_is_sent_once() {
		let fx = fixture();
		let alice = alice();
		fx.roster.add(alice.clone());

		flood_until_blocked(&fx, &alice);

		// Sweep second by second until released, then keep sweeping
		for _ in 0..30 {
			tick_chat_decay(&fx);
		}

		let unblock_lines = fx
			.sink
			.player_lines()
			.iter()
			.filter(|(_, line)| line == "You can send messages now.")
			.count();
		assert_eq!(unblock_lines, 1);
		assert!(!fx.guard.state_of(&alice.identity_key()).unwrap().is_blocked);
	}

	#[test]
	fn test_decay_only_runs_for_connected_players() {
		let fx = fixture();
		let alice = alice();

		// Blocked, but not on the roster: sweeps never touch the record
		flood_until_blocked(&fx, &alice);
		for _ in 0..30 {
			tick_chat_decay(&fx);
		}
		let state = fx.guard.state_of(&alice.identity_key()).unwrap();
		assert!(state.is_blocked);
		assert_eq!(state.spam, 120.0);

		// Once connected, decay resumes and the block lifts
		fx.roster.add(alice.clone());
		tick_chat_decay(&fx);
		assert!(!fx.guard.state_of(&alice.identity_key()).unwrap().is_blocked);
	}

	#[test]
	fn test_score_stays_within_bounds() {
		let fx = fixture();
		let alice = alice();
		fx.roster.add(alice.clone());

		let intervals = [0.0, 0.3, 2.0, 0.1, 7.0, 0.0, 20.0, 1.0];
		for (i, gap) in intervals.iter().cycle().take(200).enumerate() {
			fx.clock.advance(*gap);
			fx.guard.handle_message(&alice);
			if i % 5 == 0 {
				fx.guard.chat_decay_sweep();
			}

			let state = fx.guard.state_of(&alice.identity_key()).unwrap();
			assert!(state.spam >= 0.0);
			assert!(state.spam <= 120.0);
		}
	}

	#[test]
	fn test_pacing_warning_near_threshold() {
		let fx = fixture();
		let alice = alice();

		// Build the score up to 113.9 without crossing the threshold
		for t in [0.0, 0.1, 0.2, 0.3, 2.0, 4.0] {
			fx.clock.set(t);
			assert!(fx.guard.handle_message(&alice).is_delivered());
		}
		fx.sink.player_lines.lock().clear();

		fx.clock.set(6.1);
		assert!(fx.guard.handle_message(&alice).is_delivered());

		// Wait lands at 1.95 s: warned, but short enough to self-time
		assert_eq!(fx.sink.last_player_line().unwrap(), "Wait 2 seconds.");
		let state = fx.guard.state_of(&alice.identity_key()).unwrap();
		assert!(!state.notify_on_unblock);
		assert!(!state.is_blocked);
	}

	#[test]
	fn test_long_wait_sets_unblock_notice() {
		let fx = fixture();
		let alice = alice();

		// Five rapid messages leave the score just under the threshold
		for t in [0.0, 0.1, 0.2, 0.3, 0.4] {
			fx.clock.set(t);
			assert!(fx.guard.handle_message(&alice).is_delivered());
		}

		// Last delivered message warned about a ~4.8 s wait
		assert_eq!(fx.sink.last_player_line().unwrap(), "Wait 5 seconds.");
		let state = fx.guard.state_of(&alice.identity_key()).unwrap();
		assert!(state.notify_on_unblock);
		assert!(!state.is_blocked);
	}

	#[test]
	fn test_rejoin_spam_rejects_connection() {
		let fx = fixture();
		let alice = alice();

		// Three connect+join cycles within seconds of each other
		for t in [0.0, 3.0, 6.0] {
			fx.clock.set(t);
			assert!(fx.guard.handle_connect("1.2.3.4:27015", "alice").is_accepted());
			fx.guard.handle_join(&alice);
		}

		let state = fx.guard.state_of(&alice.identity_key()).unwrap();
		assert_eq!(state.rejoin_count, 2);
		assert_eq!(state.address.as_deref(), Some("1.2.3.4"));

		// The next attempt from that address is refused outright
		fx.clock.set(9.0);
		let verdict = fx.guard.handle_connect("1.2.3.4:27015", "alice");
		let ConnectVerdict::Rejected { reason } = verdict else {
			panic!("expected rejection, got {:?}", verdict);
		};
		assert_eq!(reason, "Your rejoins are spamming the chat. Wait 60 seconds.");
	}

	#[test]
	fn test_returning_address_is_matched_across_identities() {
		let fx = fixture();

		// Penalty accumulated under one identity...
		for t in [0.0, 3.0, 6.0] {
			fx.clock.set(t);
			fx.guard.handle_connect("1.2.3.4:27015", "alice");
			fx.guard.handle_join(&alice());
		}

		// ...also blocks a different nickname from the same address
		let verdict = fx.guard.handle_connect("1.2.3.4:27016", "alice2");
		assert!(!verdict.is_accepted());
	}

	#[test]
	fn test_spaced_rejoins_are_never_penalized() {
		let fx = fixture();
		let alice = alice();

		for i in 0..10 {
			fx.clock.set(f64::from(i) * 60.0);
			assert!(fx.guard.handle_connect("1.2.3.4:27015", "alice").is_accepted());
			fx.guard.handle_join(&alice);
		}

		assert_eq!(fx.guard.state_of(&alice.identity_key()).unwrap().rejoin_count, 0);
	}

	#[test]
	fn test_rejoin_decay_restores_access() {
		let fx = fixture();
		let alice = alice();

		for t in [0.0, 3.0, 6.0] {
			fx.clock.set(t);
			fx.guard.handle_connect("1.2.3.4:27015", "alice");
			fx.guard.handle_join(&alice);
		}
		assert!(!fx.guard.handle_connect("1.2.3.4:27015", "alice").is_accepted());

		// One rejoin decay tick takes the count below the refusal line
		fx.guard.rejoin_decay_sweep();
		assert_eq!(fx.guard.state_of(&alice.identity_key()).unwrap().rejoin_count, 1);
		assert!(fx.guard.handle_connect("1.2.3.4:27015", "alice").is_accepted());
	}

	#[test]
	fn test_join_without_pending_correlation() {
		let fx = fixture();
		let alice = alice();

		// Join with no preceding connect: the enrichment step is skipped
		fx.guard.handle_join(&alice);
		let state = fx.guard.state_of(&alice.identity_key()).unwrap();
		assert_eq!(state.address, None);
		assert_eq!(state.rejoin_count, 0);
	}

	#[test]
	fn test_pending_correlation_is_one_shot() {
		let fx = fixture();
		let alice = alice();

		fx.guard.handle_connect("1.2.3.4:27015", "alice");
		fx.guard.handle_join(&alice);
		assert_eq!(
			fx.guard.state_of(&alice.identity_key()).unwrap().address.as_deref(),
			Some("1.2.3.4")
		);

		// A second join without a new connect leaves the address alone
		fx.clock.advance(120.0);
		fx.guard.handle_join(&alice);
		assert_eq!(
			fx.guard.state_of(&alice.identity_key()).unwrap().address.as_deref(),
			Some("1.2.3.4")
		);
	}

	#[test]
	fn test_reset_clears_all_state() {
		let fx = fixture();
		let alice = alice();

		flood_until_blocked(&fx, &alice);
		fx.guard.handle_connect("1.2.3.4:27015", "alice");

		fx.guard.handle_reset();

		assert!(fx.guard.state_of(&alice.identity_key()).is_none());
		assert_eq!(fx.guard.stats(), GuardStats::default());

		// Previously blocked player chats freely
		assert!(fx.guard.handle_message(&alice).is_delivered());
		let state = fx.guard.state_of(&alice.identity_key()).unwrap();
		assert_eq!(state.spam, 0.0);
		assert!(!state.is_blocked);
	}

	#[test]
	fn test_stats() {
		let fx = fixture();

		assert_eq!(fx.guard.stats(), GuardStats::default());

		fx.guard.handle_message(&alice());
		fx.guard.handle_message(&PlayerInfo::new(Some("id:bob"), "bob"));
		flood_until_blocked(&fx, &alice());

		let stats = fx.guard.stats();
		assert_eq!(stats.tracked_identities, 2);
		assert_eq!(stats.blocked_identities, 1);
	}

	#[test]
	fn test_bare_address() {
		assert_eq!(bare_address("1.2.3.4:27015"), "1.2.3.4");
		assert_eq!(bare_address("1.2.3.4"), "1.2.3.4");
		assert_eq!(bare_address("loopback"), "loopback");
		assert_eq!(bare_address(""), "");
	}
}

// vim: ts=4
