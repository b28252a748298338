//! Settings subsystem.
//!
//! Tunable parameters are declared as [`SettingDefinition`]s during app
//! construction, frozen into an immutable registry, and served (with
//! runtime overrides) by the [`SettingsService`].

mod service;
mod types;

pub use service::SettingsService;
pub use types::{
	FrozenSettingsRegistry, SettingDefinition, SettingDefinitionBuilder, SettingValue,
	SettingsRegistry,
};

// vim: ts=4
