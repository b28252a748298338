//! Throttling settings registration
//!
//! The four tunables, registered with defaults matching the values the
//! original server operators ran with. All are live: the engine snapshots
//! them per event, so runtime changes apply to the next event.

use chatguard_core::settings::{SettingDefinition, SettingValue, SettingsRegistry, SettingsService};

use crate::prelude::*;

pub const KEY_SAFE_CHAT_DELAY: &str = "antispam.safe_chat_delay";
pub const KEY_SPAM_THRESHOLD: &str = "antispam.spam_threshold";
pub const KEY_SAFE_REJOIN_DELAY: &str = "antispam.safe_rejoin_delay";
pub const KEY_REJOIN_SPAM_ALLOWED: &str = "antispam.rejoin_spam_allowed";

const DEFAULT_SAFE_CHAT_DELAY: i64 = 5;
const DEFAULT_SPAM_THRESHOLD: i64 = 120;
const DEFAULT_SAFE_REJOIN_DELAY: i64 = 60;
const DEFAULT_REJOIN_SPAM_ALLOWED: i64 = 3;

fn positive_int(v: &SettingValue) -> CgResult<()> {
	match v {
		SettingValue::Int(i) if *i > 0 => Ok(()),
		_ => Err(Error::ValidationError("must be a positive integer".into())),
	}
}

/// Register all throttling settings
pub fn register_settings(registry: &mut SettingsRegistry) -> CgResult<()> {
	registry.register(
		SettingDefinition::builder(KEY_SAFE_CHAT_DELAY)
			.description("Seconds between messages that never accumulate spam score")
			.default(SettingValue::Int(DEFAULT_SAFE_CHAT_DELAY))
			.validator(positive_int)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(KEY_SPAM_THRESHOLD)
			.description("Accumulated spam score at which chat is blocked")
			.default(SettingValue::Int(DEFAULT_SPAM_THRESHOLD))
			.validator(positive_int)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(KEY_SAFE_REJOIN_DELAY)
			.description("Rejoin spacing in seconds that never accumulates rejoin penalty")
			.default(SettingValue::Int(DEFAULT_SAFE_REJOIN_DELAY))
			.validator(positive_int)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(KEY_REJOIN_SPAM_ALLOWED)
			.description("Rejoins allowed inside the safe delay before connections are rejected")
			.default(SettingValue::Int(DEFAULT_REJOIN_SPAM_ALLOWED))
			.validator(positive_int)
			.build()?,
	)?;

	Ok(())
}

/// Per-event snapshot of the tunables
#[derive(Debug, Clone, PartialEq)]
pub struct GuardConfig {
	pub safe_chat_delay: f64,
	pub spam_threshold: f64,
	pub safe_rejoin_delay: f64,
	pub rejoin_spam_allowed: u32,
}

impl Default for GuardConfig {
	fn default() -> Self {
		Self {
			safe_chat_delay: DEFAULT_SAFE_CHAT_DELAY as f64,
			spam_threshold: DEFAULT_SPAM_THRESHOLD as f64,
			safe_rejoin_delay: DEFAULT_SAFE_REJOIN_DELAY as f64,
			rejoin_spam_allowed: DEFAULT_REJOIN_SPAM_ALLOWED as u32,
		}
	}
}

impl GuardConfig {
	/// Snapshot the current values. Registration is validated up front, so
	/// reads cannot fail for a correctly initialized app; a read failure
	/// falls back to the compiled default rather than dropping the event.
	pub fn load(settings: &SettingsService) -> Self {
		Self {
			safe_chat_delay: read_or(settings, KEY_SAFE_CHAT_DELAY, DEFAULT_SAFE_CHAT_DELAY),
			spam_threshold: read_or(settings, KEY_SPAM_THRESHOLD, DEFAULT_SPAM_THRESHOLD),
			safe_rejoin_delay: read_or(settings, KEY_SAFE_REJOIN_DELAY, DEFAULT_SAFE_REJOIN_DELAY),
			rejoin_spam_allowed: read_or(
				settings,
				KEY_REJOIN_SPAM_ALLOWED,
				DEFAULT_REJOIN_SPAM_ALLOWED,
			) as u32,
		}
	}

	/// Validate that all four tunables are registered and readable
	pub fn validate(settings: &SettingsService) -> CgResult<()> {
		for key in [
			KEY_SAFE_CHAT_DELAY,
			KEY_SPAM_THRESHOLD,
			KEY_SAFE_REJOIN_DELAY,
			KEY_REJOIN_SPAM_ALLOWED,
		] {
			settings.get_int(key)?;
		}
		Ok(())
	}
}

fn read_or(settings: &SettingsService, key: &str, default: i64) -> f64 {
	match settings.get_int(key) {
		Ok(value) => value as f64,
		Err(e) => {
			warn!("Falling back to default for '{}': {}", key, e);
			default as f64
		}
	}
}


// vim: ts=4
