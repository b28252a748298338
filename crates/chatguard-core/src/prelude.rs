pub use chatguard_types::error::{CgResult, Error};
pub use chatguard_types::types::{IdentityKey, PlayerInfo, Timestamp};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
