//! App state type
//!
//! The wiring hub: injected host collaborators, the settings subsystem,
//! and the ticker, assembled once at session-group startup.

use std::sync::Arc;

use chatguard_types::host_adapter::{Clock, NoticeSink, Roster};

use crate::host::SteadyClock;
use crate::prelude::*;
use crate::settings::{FrozenSettingsRegistry, SettingsRegistry, SettingsService};
use crate::ticker::Ticker;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub clock: Arc<dyn Clock>,
	pub roster: Arc<dyn Roster>,
	pub notices: Arc<dyn NoticeSink>,
	pub ticker: Ticker,

	// Settings subsystem
	pub settings: SettingsService,
	pub settings_registry: Arc<FrozenSettingsRegistry>,
}

pub type App = Arc<AppState>;

impl AppState {
	/// Stop all periodic work
	pub fn shutdown(&self) {
		self.ticker.shutdown();
	}
}

/// Builder collecting host collaborators and setting registrations
pub struct AppBuilder {
	clock: Option<Arc<dyn Clock>>,
	roster: Option<Arc<dyn Roster>>,
	notices: Option<Arc<dyn NoticeSink>>,
	settings_registry: SettingsRegistry,
}

impl AppBuilder {
	pub fn new() -> Self {
		Self {
			clock: None,
			roster: None,
			notices: None,
			settings_registry: SettingsRegistry::new(),
		}
	}

	/// Override the session clock (defaults to a process-monotonic clock)
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = Some(clock);
		self
	}

	pub fn with_roster(mut self, roster: Arc<dyn Roster>) -> Self {
		self.roster = Some(roster);
		self
	}

	pub fn with_notices(mut self, notices: Arc<dyn NoticeSink>) -> Self {
		self.notices = Some(notices);
		self
	}

	/// Mutable access for feature crates to register their settings
	pub fn settings_registry(&mut self) -> &mut SettingsRegistry {
		&mut self.settings_registry
	}

	pub fn build(self) -> CgResult<App> {
		let roster = self
			.roster
			.ok_or_else(|| Error::ConfigError("AppBuilder: roster adapter is required".into()))?;
		let notices = self
			.notices
			.ok_or_else(|| Error::ConfigError("AppBuilder: notice sink is required".into()))?;
		let clock = self.clock.unwrap_or_else(|| Arc::new(SteadyClock::new()));

		let settings_registry = Arc::new(self.settings_registry.freeze());
		let settings = SettingsService::new(settings_registry.clone());

		info!("App initialized (chatguard-core {})", VERSION);

		Ok(Arc::new(AppState {
			clock,
			roster,
			notices,
			ticker: Ticker::new(),
			settings,
			settings_registry,
		}))
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}


// vim: ts=4
