//! Decay sweep tasks
//!
//! Ticker bindings for the two periodic sweeps. The chat sweep runs on a
//! fixed 1 s tick; the rejoin sweep's period tracks the safe-rejoin-delay
//! setting, re-read before every tick.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use chatguard_core::ticker::PeriodicTask;

use crate::engine::ChatGuard;
use crate::prelude::*;

/// Fixed period of the chat decay sweep; the wait-time math assumes it
const CHAT_DECAY_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct ChatDecayTask;

#[async_trait]
impl PeriodicTask<Arc<ChatGuard>> for ChatDecayTask {
	fn kind(&self) -> &'static str {
		"chat_decay"
	}

	fn period(&self, _guard: &Arc<ChatGuard>) -> Duration {
		CHAT_DECAY_PERIOD
	}

	async fn run(&self, guard: &Arc<ChatGuard>) -> CgResult<()> {
		guard.chat_decay_sweep();
		Ok(())
	}
}

#[derive(Debug)]
pub struct RejoinDecayTask;

#[async_trait]
impl PeriodicTask<Arc<ChatGuard>> for RejoinDecayTask {
	fn kind(&self) -> &'static str {
		"rejoin_decay"
	}

	fn period(&self, guard: &Arc<ChatGuard>) -> Duration {
		Duration::from_secs_f64(guard.config().safe_rejoin_delay)
	}

	async fn run(&self, guard: &Arc<ChatGuard>) -> CgResult<()> {
		guard.rejoin_decay_sweep();
		Ok(())
	}
}


// vim: ts=4
