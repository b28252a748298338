pub use crate::error::{CgResult, Error};
pub use crate::types::{IdentityKey, PlayerInfo, Timestamp};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
