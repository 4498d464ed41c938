//! Cancellation and wall-clock limits for long running searches

use crate::error::OptimizationError;
use std::{
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
	time::{Duration, Instant},
};

/// A flag shared between a search and whoever may want to stop it.
///
/// Clones refer to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
	/// Create a token that has not been cancelled
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Ask every search holding this token to stop before its next generation
	pub fn cancel(&self) {
		self.0.store(true, Ordering::Relaxed);
	}

	/// Whether [`CancelToken::cancel`] has been called
	#[must_use]
	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::Relaxed)
	}
}

/// The limits a single search runs under
#[derive(Debug, Clone, Default)]
pub struct Budget {
	/// Optional external stop signal
	cancel: Option<CancelToken>,
	/// Optional point in time after which the search gives up, with the configured timeout
	deadline: Option<(Instant, Duration)>,
}

impl Budget {
	/// A budget that never runs out
	#[must_use]
	pub const fn unlimited() -> Self {
		Self { cancel: None, deadline: None }
	}

	/// A budget that starts counting `timeout` now
	#[must_use]
	pub fn new(timeout: Option<Duration>, cancel: Option<CancelToken>) -> Self {
		Self {
			cancel,
			deadline: timeout.map(|timeout| (Instant::now() + timeout, timeout)),
		}
	}

	/// Check whether the search may continue
	///
	/// # Errors
	/// Returns [`OptimizationError::Cancelled`] or [`OptimizationError::Timeout`]
	/// once the respective limit has been hit.
	pub fn check(&self) -> Result<(), OptimizationError> {
		if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
			return Err(OptimizationError::Cancelled);
		}

		match self.deadline {
			Some((deadline, timeout)) if Instant::now() >= deadline => Err(OptimizationError::Timeout(timeout)),
			_ => Ok(()),
		}
	}
}
