//! Host adapter traits.
//!
//! The engine never talks to a transport, a renderer, or a wall clock
//! directly; the embedding server injects these collaborators. All three
//! are synchronous: the engine is an in-process state machine and the host
//! delivers one event or tick at a time.

use crate::types::{PlayerInfo, Timestamp};

/// Source of the current session time, in monotonic seconds.
pub trait Clock: Send + Sync {
	fn now(&self) -> Timestamp;
}

/// Enumeration of the players currently connected to the session.
///
/// The chat decay sweep runs over this set, so a player's spam score only
/// decays while they stay connected.
pub trait Roster: Send + Sync {
	fn connected_players(&self) -> Vec<PlayerInfo>;
}

/// Outbound notice delivery: one text line to one player, or to everyone.
///
/// Delivery is fire-and-forget; the engine never learns whether a line
/// reached its target.
pub trait NoticeSink: Send + Sync {
	fn notify_player(&self, player: &PlayerInfo, text: &str);
	fn notify_all(&self, text: &str);
}

// vim: ts=4
