//! Periodic ticker
//!
//! Drives recurring maintenance work (the decay sweeps) on fixed periods.
//! Each task's period is re-read before every tick, so tasks whose period
//! comes from a runtime setting pick up changes without respawning.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::prelude::*;

/// A unit of recurring work bound to the ticker
#[async_trait]
pub trait PeriodicTask<S>: Send + Sync {
	/// Task name for logging
	fn kind(&self) -> &'static str;

	/// Current period. Queried before each tick.
	fn period(&self, state: &S) -> Duration;

	async fn run(&self, state: &S) -> CgResult<()>;
}

/// Spawns and owns the interval loops for registered tasks
pub struct Ticker {
	handles: parking_lot::Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

impl Ticker {
	pub fn new() -> Self {
		Self { handles: parking_lot::Mutex::new(Vec::new()) }
	}

	/// Spawn the interval loop for a task. The loop sleeps for the task's
	/// current period, runs it, and logs (but does not stop on) failures.
	pub fn spawn<S>(&self, state: S, task: Arc<dyn PeriodicTask<S>>)
	where
		S: Send + Sync + 'static,
	{
		info!("Starting periodic task {}", task.kind());
		let handle = tokio::spawn(async move {
			loop {
				let period = task.period(&state);
				tokio::time::sleep(period).await;
				if let Err(e) = task.run(&state).await {
					error!("Periodic task {} failed: {}", task.kind(), e);
				}
			}
		});
		self.handles.lock().push(handle);
	}

	/// Number of running task loops
	pub fn task_count(&self) -> usize {
		self.handles.lock().len()
	}

	/// Abort all task loops
	pub fn shutdown(&self) {
		let mut handles = self.handles.lock();
		for handle in handles.drain(..) {
			handle.abort();
		}
	}
}

impl Default for Ticker {
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for Ticker {
	fn drop(&mut self) {
		self.shutdown();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

	type State = Arc<AtomicU32>;

	#[derive(Debug)]
	struct CountTask;

	#[async_trait]
	impl PeriodicTask<State> for CountTask {
		fn kind(&self) -> &'static str {
			"count"
		}

		fn period(&self, _state: &State) -> Duration {
			Duration::from_millis(10)
		}

		async fn run(&self, state: &State) -> CgResult<()> {
			state.fetch_add(1, Ordering::Relaxed);
			Ok(())
		}
	}

	#[derive(Debug)]
	struct FailingTask;

	#[async_trait]
	impl PeriodicTask<State> for FailingTask {
		fn kind(&self) -> &'static str {
			"failing"
		}

		fn period(&self, _state: &State) -> Duration {
			Duration::from_millis(10)
		}

		async fn run(&self, state: &State) -> CgResult<()> {
			state.fetch_add(1, Ordering::Relaxed);
			Err(Error::Internal("boom".into()))
		}
	}

	/// Period follows the state: doubles the sleep once the count passes 2.
	#[derive(Debug)]
	struct AdaptiveTask {
		period_queries: AtomicU64,
	}

	#[async_trait]
	impl PeriodicTask<State> for AdaptiveTask {
		fn kind(&self) -> &'static str {
			"adaptive"
		}

		fn period(&self, state: &State) -> Duration {
			self.period_queries.fetch_add(1, Ordering::Relaxed);
			if state.load(Ordering::Relaxed) > 2 {
				Duration::from_millis(20)
			} else {
				Duration::from_millis(10)
			}
		}

		async fn run(&self, state: &State) -> CgResult<()> {
			state.fetch_add(1, Ordering::Relaxed);
			Ok(())
		}
	}

	#[tokio::test]
	async fn test_task_runs_repeatedly() {
		let ticker = Ticker::new();
		let state: State = Arc::new(AtomicU32::new(0));

		ticker.spawn(state.clone(), Arc::new(CountTask));
		assert_eq!(ticker.task_count(), 1);

		tokio::time::sleep(Duration::from_millis(100)).await;
		assert!(state.load(Ordering::Relaxed) >= 3);
	}

	#[tokio::test]
	async fn test_failure_does_not_stop_loop() {
		let _ = tracing_subscriber::fmt().try_init();

		let ticker = Ticker::new();
		let state: State = Arc::new(AtomicU32::new(0));

		ticker.spawn(state.clone(), Arc::new(FailingTask));

		tokio::time::sleep(Duration::from_millis(100)).await;
		assert!(state.load(Ordering::Relaxed) >= 3);
	}

	#[tokio::test]
	async fn test_period_reread_each_tick() {
		let ticker = Ticker::new();
		let state: State = Arc::new(AtomicU32::new(0));
		let task = Arc::new(AdaptiveTask { period_queries: AtomicU64::new(0) });

		ticker.spawn(state.clone(), task.clone());

		tokio::time::sleep(Duration::from_millis(120)).await;
		let runs = u64::from(state.load(Ordering::Relaxed));
		// One period query per completed or in-flight tick
		assert!(task.period_queries.load(Ordering::Relaxed) >= runs);
		assert!(runs >= 3);
	}

	#[tokio::test]
	async fn test_shutdown_stops_tasks() {
		let ticker = Ticker::new();
		let state: State = Arc::new(AtomicU32::new(0));

		ticker.spawn(state.clone(), Arc::new(CountTask));
		tokio::time::sleep(Duration::from_millis(50)).await;
		ticker.shutdown();
		assert_eq!(ticker.task_count(), 0);

		let frozen = state.load(Ordering::Relaxed);
		tokio::time::sleep(Duration::from_millis(50)).await;
		assert_eq!(state.load(Ordering::Relaxed), frozen);
	}
}

// vim: ts=4
