//! Common types used throughout chatguard.

use serde::{Deserialize, Serialize};

// Timestamp //
//***********//

/// A reading of the host's monotonic session clock, in seconds.
///
/// Stored as `f64` because flood detection needs sub-second resolution.
/// The reference point is whatever the host's clock uses (typically the
/// start of the process or the current session); only differences matter.
#[derive(Clone, Copy, Debug, Default)]
pub struct Timestamp(pub f64);

impl Timestamp {
	/// Sentinel predating any real clock reading, so the first event on a
	/// fresh record never appears "too soon" after the previous one.
	pub const DISTANT_PAST: Timestamp = Timestamp(-999.0);

	/// Seconds elapsed since an earlier reading.
	pub fn seconds_since(self, earlier: Timestamp) -> f64 {
		self.0 - earlier.0
	}

	pub fn add_seconds(self, seconds: f64) -> Timestamp {
		Timestamp(self.0 + seconds)
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::cmp::PartialEq for Timestamp {
	fn eq(&self, other: &Self) -> bool {
		self.0 == other.0
	}
}

impl std::cmp::PartialOrd for Timestamp {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		self.0.partial_cmp(&other.0)
	}
}

impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_f64(self.0)
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		Ok(Timestamp(f64::deserialize(deserializer)?))
	}
}

// IdentityKey //
//*************//

/// A stable handle representing one player across reconnects within a
/// session. Backed by the host's per-player identifier when one is issued,
/// else by the display name (see [`PlayerInfo::identity_key`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityKey(Box<str>);

impl IdentityKey {
	pub fn new(key: impl Into<Box<str>>) -> Self {
		Self(key.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for IdentityKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

// PlayerInfo //
//************//

/// Descriptor for one connected player, as handed over by the host on each
/// event and by the roster enumeration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
	/// Stable per-player identifier, when the host issues one. Hosts whose
	/// identifier is a "not available" sentinel (offline or listen-server
	/// contexts) must map the sentinel to `None`.
	pub player_id: Option<Box<str>>,
	/// Current display name; doubles as the identity fallback.
	pub display_name: Box<str>,
}

impl PlayerInfo {
	pub fn new(player_id: Option<impl Into<Box<str>>>, display_name: impl Into<Box<str>>) -> Self {
		Self { player_id: player_id.map(Into::into), display_name: display_name.into() }
	}

	/// Identity key for this player: the stable identifier when available,
	/// the display name otherwise.
	pub fn identity_key(&self) -> IdentityKey {
		match &self.player_id {
			Some(id) => IdentityKey::new(id.clone()),
			None => IdentityKey::new(self.display_name.clone()),
		}
	}
}

impl std::fmt::Display for PlayerInfo {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.display_name)
	}
}


// vim: ts=4
