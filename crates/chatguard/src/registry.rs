//! Identity registry
//!
//! Owns every [`SpamState`] for the current session group, plus the
//! transient nickname → address map bridging a connection attempt to its
//! join completion. Records are created lazily and live until the full
//! reset at the next session load; nothing is evicted in between.

use std::collections::HashMap;

use crate::prelude::*;
use crate::state::SpamState;

#[derive(Debug, Default)]
pub struct IdentityRegistry {
	states: HashMap<IdentityKey, SpamState>,
	// Keyed by display name; two players connecting at once under the same
	// name can mis-attribute the address. Entries not consumed by a join
	// leak until the next reset.
	pending_joins: HashMap<Box<str>, Box<str>>,
}

impl IdentityRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Look up or lazily create the state for an identity. The same key
	/// always yields the same record for the life of the session group.
	pub fn resolve(&mut self, key: IdentityKey) -> &mut SpamState {
		self.states.entry(key).or_default()
	}

	pub fn get(&self, key: &IdentityKey) -> Option<&SpamState> {
		self.states.get(key)
	}

	/// First identity whose correlated address matches. Linear scan; runs
	/// only on the low-frequency connect path.
	pub fn find_by_address(&self, address: &str) -> Option<&SpamState> {
		self.states.values().find(|state| state.address.as_deref() == Some(address))
	}

	/// Remember which address a connecting nickname arrived from, until the
	/// join completes
	pub fn record_pending_join(&mut self, display_name: &str, address: &str) {
		self.pending_joins.insert(display_name.into(), address.into());
	}

	/// One-shot consumption of the pending mapping for a nickname
	pub fn take_pending_join(&mut self, display_name: &str) -> Option<Box<str>> {
		self.pending_joins.remove(display_name)
	}

	/// Iterate every known state (the rejoin decay sweep path)
	pub fn states_mut(&mut self) -> impl Iterator<Item = &mut SpamState> {
		self.states.values_mut()
	}

	/// Full reset on a new session load: drops all identity state and all
	/// pending correlations
	pub fn reset(&mut self) {
		let dropped = self.states.len();
		self.states.clear();
		self.pending_joins.clear();
		debug!("Identity registry reset ({} records dropped)", dropped);
	}

	pub fn len(&self) -> usize {
		self.states.len()
	}

	/// Number of identities currently blocked from chatting
	pub fn blocked_count(&self) -> usize {
		self.states.values().filter(|state| state.is_blocked).count()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	#[cfg(test)]
	pub fn pending_len(&self) -> usize {
		self.pending_joins.len()
	}
}


// vim: ts=4
