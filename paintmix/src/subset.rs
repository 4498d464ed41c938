//! Searches combinations of favourite colors for the best mix

use crate::{
	accuracy::AccuracyMetric,
	budget::Budget,
	catalog::ReferenceColor,
	error::PredictionError,
	ratios::{self, significant_components, MixResult, OptimizeOptions},
	RgbColor,
};
use itertools::Itertools;
use rand::Rng;
use std::ops::RangeInclusive;
use tracing::{debug, trace};

/// Options for [`crate::predict_best_subset`] and [`find_optimal_ratios_favourites`]
#[derive(Debug, Clone)]
pub struct SubsetOptions {
	/// The search stops at the first combination reaching this accuracy
	pub target_accuracy: f64,
	/// Generation budget of each per-combination ratio search
	pub max_iterations: u32,
	/// Combination sizes to try, smallest first
	pub sizes: RangeInclusive<usize>,
	/// Settings for the ratio search.
	///
	/// Its `iterations` is replaced by `max_iterations`.
	/// Its seed, timeout, and cancellation token apply to the search as a whole.
	pub optimizer: OptimizeOptions,
}

impl Default for SubsetOptions {
	fn default() -> Self {
		Self {
			target_accuracy: 65.0,
			max_iterations: 500,
			sizes: 2..=4,
			optimizer: OptimizeOptions::default(),
		}
	}
}

impl SubsetOptions {
	/// Set the accuracy at which the search stops
	#[must_use]
	pub const fn with_target_accuracy(mut self, accuracy: f64) -> Self {
		self.target_accuracy = accuracy;
		self
	}

	/// Set the generation budget of each ratio search
	#[must_use]
	pub const fn with_max_iterations(mut self, iterations: u32) -> Self {
		self.max_iterations = iterations;
		self
	}

	/// Set the combination sizes to try
	#[must_use]
	pub fn with_sizes(mut self, sizes: RangeInclusive<usize>) -> Self {
		self.sizes = sizes;
		self
	}

	/// Set the ratio search settings
	#[must_use]
	pub fn with_optimizer(mut self, optimizer: OptimizeOptions) -> Self {
		self.optimizer = optimizer;
		self
	}
}

/// The best combination of favourites found and how to mix it
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
	/// Ratios positionally matched with `combination`, summing to `1.0`
	pub ratios: Vec<f64>,
	/// Weighted RGB accuracy of `mixed_color` against the target
	pub accuracy: f64,
	/// The colors to mix
	pub combination: Vec<ReferenceColor>,
	/// The color produced by mixing `combination` by `ratios`
	pub mixed_color: RgbColor,
	/// Number of combinations that were scored
	pub evaluated: usize,
}

impl Prediction {
	/// Whether the accuracy reaches `threshold`
	#[must_use]
	pub fn meets(&self, threshold: f64) -> bool {
		self.accuracy >= threshold
	}

	/// Rescore the mixed color with another metric, e.g. for reporting
	#[must_use]
	pub fn accuracy_with(&self, metric: AccuracyMetric, target: RgbColor) -> f64 {
		metric.accuracy(target, self.mixed_color)
	}

	/// Indices into `combination` and percentages of the colors that make up at least 1% of the mix,
	/// largest first
	#[must_use]
	pub fn significant_components(&self) -> Vec<(usize, f64)> {
		significant_components(&self.ratios)
	}
}

/// Search combinations of `favourites`, whose sRGB values are given in `palette`.
///
/// Combinations of each size are tried in lexicographic index order, smaller sizes first.
/// The search returns at the first combination reaching the target accuracy;
/// otherwise the best combination overall is returned, however low its accuracy.
pub(crate) fn search(
	target: RgbColor,
	favourites: &[ReferenceColor],
	palette: &[RgbColor],
	options: &SubsetOptions,
	budget: &Budget,
	rng: &mut impl Rng,
) -> Result<Prediction, PredictionError> {
	debug_assert_eq!(favourites.len(), palette.len());

	let n = palette.len();
	if n < 2 {
		return Err(PredictionError::NotEnoughFavourites { found: n });
	}

	let optimizer = options.optimizer.clone().with_iterations(options.max_iterations);

	let mut best: Option<(MixResult, Vec<usize>)> = None;
	let mut evaluated = 0;

	'sizes: for size in options.sizes.clone().filter(|&size| size > 0) {
		debug!(size, "trying combinations");

		for indices in (0..n).combinations(size) {
			let colors = indices.iter().map(|&i| palette[i]).collect::<Vec<_>>();
			let result = ratios::find_optimal_ratios(target, &colors, &optimizer, budget, rng)?;
			evaluated += 1;

			if best.as_ref().map_or(true, |(best, _)| result.accuracy > best.accuracy) {
				trace!(accuracy = result.accuracy, ?indices, "improved combination");
				let reached = result.accuracy >= options.target_accuracy;
				best = Some((result, indices));

				if reached {
					debug!(size, evaluated, "target accuracy reached");
					break 'sizes;
				}
			}
		}
	}

	let (result, indices) = best.ok_or(PredictionError::NotEnoughFavourites { found: n })?;

	Ok(Prediction {
		ratios: result.ratios,
		accuracy: result.accuracy,
		combination: indices.into_iter().map(|i| favourites[i].clone()).collect(),
		mixed_color: result.mixed_color,
		evaluated,
	})
}

/// Parse the sRGB values of each favourite
pub(crate) fn parse_palette(favourites: &[ReferenceColor]) -> Result<Vec<RgbColor>, PredictionError> {
	favourites
		.iter()
		.map(|color| ReferenceColor::srgb(color).map_err(|e| PredictionError::Optimization(e.into())))
		.collect()
}

/// Find the combination of `favourites` and its ratios that best approximate `target`,
/// using the given budget and random number generator.
///
/// # Errors
/// Returns an error if fewer than two favourites are given, a favourite has a malformed hex value,
/// or the budget runs out.
pub fn find_optimal_ratios_favourites(
	target: RgbColor,
	favourites: &[ReferenceColor],
	options: &SubsetOptions,
	budget: &Budget,
	rng: &mut impl Rng,
) -> Result<Prediction, PredictionError> {
	search(target, favourites, &parse_palette(favourites)?, options, budget, rng)
}
