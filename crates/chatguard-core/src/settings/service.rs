//! Settings service with runtime overrides, validation, and typed getters

use std::collections::HashMap;
use std::sync::Arc;

use crate::prelude::*;

use super::types::{FrozenSettingsRegistry, SettingValue};

/// Settings service - main interface for reading and updating settings.
///
/// Resolution order: runtime override, then the registered default. Keys
/// that were never registered are errors; registered keys always resolve.
pub struct SettingsService {
	registry: Arc<FrozenSettingsRegistry>,
	overrides: parking_lot::RwLock<HashMap<String, SettingValue>>,
}

impl SettingsService {
	pub fn new(registry: Arc<FrozenSettingsRegistry>) -> Self {
		Self { registry, overrides: parking_lot::RwLock::new(HashMap::new()) }
	}

	/// Get setting value with full resolution (override -> default)
	pub fn get(&self, key: &str) -> CgResult<SettingValue> {
		let def = self
			.registry
			.get(key)
			.ok_or_else(|| Error::ValidationError(format!("Unknown setting: {}", key)))?;

		if let Some(value) = self.overrides.read().get(key) {
			return Ok(value.clone());
		}

		Ok(def.default.clone())
	}

	/// Set setting value with type check and validation
	pub fn set(&self, key: &str, value: SettingValue) -> CgResult<()> {
		let def = self
			.registry
			.get(key)
			.ok_or_else(|| Error::ValidationError(format!("Unknown setting: {}", key)))?;

		if !value.matches_type(&def.default) {
			return Err(Error::ValidationError(format!(
				"Type mismatch for setting '{}': expected {}, got {}",
				key,
				def.default.type_name(),
				value.type_name()
			)));
		}

		if let Some(validator) = &def.validator {
			validator(&value)?;
		}

		self.overrides.write().insert(key.to_string(), value);
		info!("Setting '{}' updated", key);
		Ok(())
	}

	/// Remove a runtime override, falling back to the default
	pub fn delete(&self, key: &str) -> CgResult<bool> {
		let removed = self.overrides.write().remove(key).is_some();
		if removed {
			info!("Setting '{}' reset to default", key);
		}
		Ok(removed)
	}

	/// Type-safe getters
	pub fn get_string(&self, key: &str) -> CgResult<String> {
		match self.get(key)? {
			SettingValue::String(s) => Ok(s),
			v => Err(Error::ValidationError(format!(
				"Setting '{}' is not a string, got {}",
				key,
				v.type_name()
			))),
		}
	}

	pub fn get_int(&self, key: &str) -> CgResult<i64> {
		match self.get(key)? {
			SettingValue::Int(i) => Ok(i),
			v => Err(Error::ValidationError(format!(
				"Setting '{}' is not an integer, got {}",
				key,
				v.type_name()
			))),
		}
	}

	pub fn get_bool(&self, key: &str) -> CgResult<bool> {
		match self.get(key)? {
			SettingValue::Bool(b) => Ok(b),
			v => Err(Error::ValidationError(format!(
				"Setting '{}' is not a boolean, got {}",
				key,
				v.type_name()
			))),
		}
	}

	/// Get reference to registry (for listing all settings)
	pub fn registry(&self) -> &Arc<FrozenSettingsRegistry> {
		&self.registry
	}
}

#[cfg(test)]
mod tests {
	use super::super::types::{SettingDefinition, SettingsRegistry};
	use super::*;

	fn service() -> SettingsService {
		let mut registry = SettingsRegistry::new();
		registry
			.register(
				SettingDefinition::builder("test.delay")
					.description("A delay in seconds")
					.default(SettingValue::Int(5))
					.validator(|v| match v {
						SettingValue::Int(i) if *i > 0 => Ok(()),
						_ => Err(Error::ValidationError("must be a positive integer".into())),
					})
					.build()
					.unwrap(),
			)
			.unwrap();
		registry
			.register(
				SettingDefinition::builder("test.motd")
					.description("Message of the day")
					.default(SettingValue::String("hello".into()))
					.build()
					.unwrap(),
			)
			.unwrap();
		SettingsService::new(Arc::new(registry.freeze()))
	}

	#[test]
	fn test_get_returns_default() {
		let service = service();
		assert_eq!(service.get_int("test.delay").unwrap(), 5);
		assert_eq!(service.get_string("test.motd").unwrap(), "hello");
	}

	#[test]
	fn test_set_overrides_default() {
		let service = service();
		service.set("test.delay", SettingValue::Int(10)).unwrap();
		assert_eq!(service.get_int("test.delay").unwrap(), 10);

		service.delete("test.delay").unwrap();
		assert_eq!(service.get_int("test.delay").unwrap(), 5);
	}

	#[test]
	fn test_set_rejects_type_mismatch() {
		let service = service();
		let result = service.set("test.delay", SettingValue::String("fast".into()));
		assert!(matches!(result, Err(Error::ValidationError(_))));
	}

	#[test]
	fn test_set_runs_validator() {
		let service = service();
		let result = service.set("test.delay", SettingValue::Int(0));
		assert!(matches!(result, Err(Error::ValidationError(_))));
		assert_eq!(service.get_int("test.delay").unwrap(), 5);
	}

	#[test]
	fn test_unknown_key() {
		let service = service();
		assert!(matches!(service.get("test.unknown"), Err(Error::ValidationError(_))));
		assert!(matches!(
			service.set("test.unknown", SettingValue::Int(1)),
			Err(Error::ValidationError(_))
		));
	}

	#[test]
	fn test_typed_getter_mismatch() {
		let service = service();
		assert!(matches!(service.get_bool("test.delay"), Err(Error::ValidationError(_))));
		assert!(matches!(service.get_int("test.motd"), Err(Error::ValidationError(_))));
	}
}

// vim: ts=4
