//! Two attempt mix prediction for interactive use

use crate::{
	budget::{Budget, CancelToken},
	catalog::ReferenceColor,
	error::PredictionError,
	subset::{self, Prediction, SubsetOptions},
	RgbColor,
};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::Duration;
use tracing::debug;

/// How [`predict_mix`] searches and what it accepts
#[derive(Debug, Clone)]
pub struct PredictPolicy {
	/// The first search, aiming for a good mix with a small budget
	pub first: SubsetOptions,
	/// The fallback search run when the first misses its target accuracy
	pub retry: SubsetOptions,
	/// The lowest accuracy reported as a success
	pub floor: f64,
	/// Wall-clock limit for both searches together
	pub timeout: Option<Duration>,
	/// External stop signal
	pub cancel: Option<CancelToken>,
	/// Seed for the random number generator, or `None` to pick one at random
	pub seed: Option<u64>,
}

impl Default for PredictPolicy {
	fn default() -> Self {
		Self {
			first: SubsetOptions::default().with_target_accuracy(65.0).with_max_iterations(300),
			retry: SubsetOptions::default().with_target_accuracy(50.0).with_max_iterations(400),
			floor: 50.0,
			timeout: Some(Duration::from_secs(2)),
			cancel: None,
			seed: None,
		}
	}
}

impl PredictPolicy {
	/// Set or remove the wall-clock limit
	#[must_use]
	pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
		self.timeout = timeout;
		self
	}

	/// Attach a cancellation token
	#[must_use]
	pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
		self.cancel = Some(cancel);
		self
	}

	/// Fix the random seed, making results reproducible
	#[must_use]
	pub const fn with_seed(mut self, seed: u64) -> Self {
		self.seed = Some(seed);
		self
	}
}

/// Predict which favourites to mix, and how, to approximate `target`.
///
/// The first search runs with `policy.first`. If it misses its target accuracy,
/// a second search runs with `policy.retry` and the better of the two is kept.
/// Both searches share the policy's time budget; the seed, timeout, and cancellation
/// token inside the [`SubsetOptions`] are not used.
///
/// # Errors
/// Returns [`PredictionError::BelowAccuracyThreshold`], which still carries the best prediction,
/// if the best accuracy is below `policy.floor`.
/// A timeout or cancellation is reported as such and never as a low accuracy result.
pub fn predict_mix(
	target: RgbColor,
	favourites: &[ReferenceColor],
	policy: &PredictPolicy,
) -> Result<Prediction, PredictionError> {
	let palette = subset::parse_palette(favourites)?;
	let budget = Budget::new(policy.timeout, policy.cancel.clone());
	let mut rng = Xoshiro256PlusPlus::seed_from_u64(policy.seed.unwrap_or_else(rand::random));

	let first = subset::search(target, favourites, &palette, &policy.first, &budget, &mut rng)?;

	let best = if first.meets(policy.first.target_accuracy) {
		first
	} else {
		debug!(
			accuracy = first.accuracy,
			retry_target = policy.retry.target_accuracy,
			"first attempt missed its target, retrying"
		);

		let retry = subset::search(target, favourites, &palette, &policy.retry, &budget, &mut rng)?;
		if retry.accuracy > first.accuracy {
			retry
		} else {
			first
		}
	};

	if best.meets(policy.floor) {
		debug!(accuracy = best.accuracy, "prediction succeeded");
		Ok(best)
	} else {
		Err(PredictionError::BelowAccuracyThreshold { best: Box::new(best), floor: policy.floor })
	}
}
