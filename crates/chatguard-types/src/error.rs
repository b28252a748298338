//! Error type shared across the chatguard crates.
//!
//! The failure taxonomy is deliberately narrow: lookups return `Option`
//! rather than erroring, and the engine's event handlers never fail. Errors
//! surface only at configuration and registration boundaries.

pub type CgResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	ValidationError(String),
	ConfigError(String),
	Internal(String),
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
		}
	}
}

impl std::error::Error for Error {}


// vim: ts=4
