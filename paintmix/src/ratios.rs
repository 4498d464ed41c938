//! Provides the genetic search for mixing ratios over a fixed set of colors

use crate::{
	accuracy::{calculate_accuracy, AccuracyMetric},
	budget::{Budget, CancelToken},
	error::OptimizationError,
	mixture::{blend, prepare, Blend, LabBlend, MixingStrategy, RgbBlend},
	RgbColor,
};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::{marker::PhantomData, time::Duration};
use tracing::{debug, trace};

/// The search stops as soon as the best accuracy reaches this value
pub const EXCELLENT_ACCURACY: f64 = 80.0;

/// The search stops once the best accuracy reaches this value
/// and more than half of the generations have been evaluated
pub const GOOD_ACCURACY: f64 = 70.0;

/// Components below this percentage are left out of [`MixResult::significant_components`]
pub const SIGNIFICANT_PERCENT: f64 = 1.0;

/// Options for [`crate::optimize_ratios`] and [`find_optimal_ratios`]
#[derive(Debug, Clone)]
pub struct OptimizeOptions {
	/// Maximum number of generations to evaluate
	pub iterations: u32,
	/// Number of ratio vectors in each generation
	pub population_size: usize,
	/// Fraction of each generation kept as parents for the next one
	pub elite_fraction: f64,
	/// Probability that an inherited ratio is scaled by a random factor in `0.8..=1.2`
	pub mutation_rate: f64,
	/// Color space the reference colors are blended in
	pub strategy: MixingStrategy,
	/// Seed for the random number generator, or `None` to pick one at random
	pub seed: Option<u64>,
	/// Wall-clock limit for the whole call
	pub timeout: Option<Duration>,
	/// External stop signal
	pub cancel: Option<CancelToken>,
}

impl Default for OptimizeOptions {
	fn default() -> Self {
		Self {
			iterations: 1000,
			population_size: 100,
			elite_fraction: 0.2,
			mutation_rate: 0.1,
			strategy: MixingStrategy::Rgb,
			seed: None,
			timeout: None,
			cancel: None,
		}
	}
}

impl OptimizeOptions {
	/// Set the maximum number of generations
	#[must_use]
	pub const fn with_iterations(mut self, iterations: u32) -> Self {
		self.iterations = iterations;
		self
	}

	/// Set the population size (at least 1)
	#[must_use]
	pub fn with_population_size(mut self, size: usize) -> Self {
		self.population_size = size.max(1);
		self
	}

	/// Set the elite fraction, clamped to `0.0..=1.0`
	#[must_use]
	pub fn with_elite_fraction(mut self, fraction: f64) -> Self {
		self.elite_fraction = fraction.clamp(0.0, 1.0);
		self
	}

	/// Set the mutation rate, clamped to `0.0..=1.0`
	#[must_use]
	pub fn with_mutation_rate(mut self, rate: f64) -> Self {
		self.mutation_rate = rate.clamp(0.0, 1.0);
		self
	}

	/// Set the blending strategy
	#[must_use]
	pub const fn with_strategy(mut self, strategy: MixingStrategy) -> Self {
		self.strategy = strategy;
		self
	}

	/// Fix the random seed, making results reproducible
	#[must_use]
	pub const fn with_seed(mut self, seed: u64) -> Self {
		self.seed = Some(seed);
		self
	}

	/// Set the wall-clock limit
	#[must_use]
	pub const fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	/// Attach a cancellation token
	#[must_use]
	pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
		self.cancel = Some(cancel);
		self
	}

	/// A fresh budget starting now
	pub(crate) fn budget(&self) -> Budget {
		Budget::new(self.timeout, self.cancel.clone())
	}

	/// The random number generator described by `seed`
	pub(crate) fn rng(&self) -> Xoshiro256PlusPlus {
		Xoshiro256PlusPlus::seed_from_u64(self.seed.unwrap_or_else(rand::random))
	}
}

/// Result of optimizing the ratios of a fixed set of colors
#[derive(Debug, Clone, PartialEq)]
pub struct MixResult {
	/// Best ratio vector found, positionally matched with the input colors and summing to `1.0`
	pub ratios: Vec<f64>,
	/// The color produced by `ratios`
	pub mixed_color: RgbColor,
	/// Weighted RGB accuracy of `mixed_color` against the target
	pub accuracy: f64,
	/// Number of generations evaluated before the search stopped
	pub generations: u32,
}

impl MixResult {
	/// Rescore the mixed color with another metric, e.g. for reporting
	#[must_use]
	pub fn accuracy_with(&self, metric: AccuracyMetric, target: RgbColor) -> f64 {
		metric.accuracy(target, self.mixed_color)
	}

	/// Indices and percentages of the colors that make up at least 1% of the mix, largest first
	#[must_use]
	pub fn significant_components(&self) -> Vec<(usize, f64)> {
		significant_components(&self.ratios)
	}
}

/// Indices and percentages of ratios of at least [`SIGNIFICANT_PERCENT`], largest first
pub(crate) fn significant_components(ratios: &[f64]) -> Vec<(usize, f64)> {
	let mut components = ratios
		.iter()
		.map(|&ratio| ratio * 100.0)
		.enumerate()
		.filter(|&(_, percent)| percent >= SIGNIFICANT_PERCENT)
		.collect::<Vec<_>>();

	components.sort_by(|(_, x), (_, y)| f64::total_cmp(y, x));
	components
}

/// Scale `ratios` to sum to `1.0`, falling back to an even split if that is impossible
fn normalize(ratios: &mut [f64]) {
	let sum = ratios.iter().sum::<f64>();
	if sum > 0.0 && sum.is_finite() {
		for ratio in ratios {
			*ratio /= sum;
		}
	} else if !ratios.is_empty() {
		#[allow(clippy::cast_precision_loss)]
		let even = 1.0 / ratios.len() as f64;
		ratios.fill(even);
	}
}

/// A ratio vector drawn uniformly from the unit cube and then normalized
fn random_ratios(n: usize, rng: &mut impl Rng) -> Vec<f64> {
	let mut ratios = (0..n).map(|_| rng.gen::<f64>()).collect::<Vec<_>>();
	normalize(&mut ratios);
	ratios
}

/// Number of parents kept from a generation of `size`, at least one
fn elite_count(size: usize, fraction: f64) -> usize {
	// fraction is in 0.0..=1.0, so the product is in 0..=size
	#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	let count = (size as f64 * fraction).round() as usize;
	count.clamp(1, size)
}

/// Score each ratio vector against the target
#[cfg(not(feature = "threads"))]
fn score<B: Blend>(target: RgbColor, channels: &[[f64; 3]], members: &[Vec<f64>]) -> Vec<f64> {
	members
		.iter()
		.map(|ratios| calculate_accuracy(target, blend::<B>(channels, ratios)))
		.collect()
}

/// Score each ratio vector against the target
#[cfg(feature = "threads")]
fn score<B: Blend>(target: RgbColor, channels: &[[f64; 3]], members: &[Vec<f64>]) -> Vec<f64> {
	use rayon::prelude::*;

	members
		.par_iter()
		.with_min_len(16)
		.map(|ratios| calculate_accuracy(target, blend::<B>(channels, ratios)))
		.collect()
}

/// A ratio vector and its accuracy
#[derive(Debug, Clone)]
struct Candidate {
	/// Ratios summing to `1.0`
	ratios: Vec<f64>,
	/// Accuracy of the color these ratios produce
	accuracy: f64,
}

/// One generation of ratio vectors, plus the best vector seen in any generation so far
struct Population<B> {
	/// Color being approximated
	target: RgbColor,
	/// Reference colors converted to the channels of `B`
	channels: Vec<[f64; 3]>,
	/// Ratio vectors of the current generation
	members: Vec<Vec<f64>>,
	/// Accuracy of each member, filled by [`Population::evaluate`]
	accuracies: Vec<f64>,
	/// Running best over all evaluated generations
	best: Candidate,
	/// The blending model
	blend: PhantomData<fn() -> B>,
}

impl<B: Blend> Population<B> {
	/// Create a random generation of `size` members
	fn new(target: RgbColor, colors: &[RgbColor], size: usize, rng: &mut impl Rng) -> Self {
		let members = (0..size).map(|_| random_ratios(colors.len(), rng)).collect::<Vec<_>>();
		let best = Candidate {
			ratios: members[0].clone(),
			accuracy: f64::NEG_INFINITY,
		};

		Self {
			target,
			channels: prepare::<B>(colors),
			members,
			accuracies: Vec::new(),
			best,
			blend: PhantomData,
		}
	}

	/// Score the current generation and return the running best accuracy
	fn evaluate(&mut self) -> f64 {
		self.accuracies = score::<B>(self.target, &self.channels, &self.members);

		let generation_best = self
			.accuracies
			.iter()
			.copied()
			.enumerate()
			.max_by(|(_, x), (_, y)| f64::total_cmp(x, y));

		if let Some((i, accuracy)) = generation_best {
			if accuracy > self.best.accuracy {
				trace!(accuracy, "improved mix");
				self.best = Candidate { ratios: self.members[i].clone(), accuracy };
			}
		}

		self.best.accuracy
	}

	/// Replace the current generation with its elite and their children
	fn breed(&mut self, elite_count: usize, mutation_rate: f64, rng: &mut impl Rng) {
		let size = self.members.len();

		let mut order = (0..size).collect::<Vec<_>>();
		order.sort_by(|&x, &y| f64::total_cmp(&self.accuracies[y], &self.accuracies[x]));

		let elite = order[..elite_count]
			.iter()
			.map(|&i| std::mem::take(&mut self.members[i]))
			.collect::<Vec<_>>();

		let mut next = Vec::with_capacity(size);
		next.extend(elite.iter().cloned());

		while next.len() < size {
			let x = &elite[rng.gen_range(0..elite.len())];
			let y = &elite[rng.gen_range(0..elite.len())];

			let mut child = x
				.iter()
				.zip(y)
				.map(|(&x, &y)| {
					let ratio = if rng.gen_bool(0.5) { x } else { y };
					if rng.gen::<f64>() < mutation_rate {
						ratio * rng.gen_range(0.8..=1.2)
					} else {
						ratio
					}
				})
				.collect::<Vec<_>>();

			normalize(&mut child);
			next.push(child);
		}

		self.members = next;
	}

	/// The best candidate as a [`MixResult`]
	fn into_result(self, generations: u32) -> MixResult {
		let mixed_color = blend::<B>(&self.channels, &self.best.ratios);
		MixResult {
			ratios: self.best.ratios,
			mixed_color,
			accuracy: self.best.accuracy,
			generations,
		}
	}
}

/// Whether the running best accuracy is good enough to stop after `generation` (zero based)
fn should_stop(best: f64, generation: u32, iterations: u32) -> bool {
	best >= EXCELLENT_ACCURACY || (best >= GOOD_ACCURACY && 2 * u64::from(generation) > u64::from(iterations))
}

/// Run the genetic search using the blending model `B`
fn search<B: Blend>(
	target: RgbColor,
	colors: &[RgbColor],
	options: &OptimizeOptions,
	budget: &Budget,
	rng: &mut impl Rng,
) -> Result<MixResult, OptimizationError> {
	let size = options.population_size.max(1);
	let elite = elite_count(size, options.elite_fraction);
	// a result always comes from at least one evaluated generation
	let iterations = options.iterations.max(1);

	let mut population = Population::<B>::new(target, colors, size, rng);

	let mut generations = 0;
	while generations < iterations {
		budget.check()?;

		let best = population.evaluate();
		generations += 1;

		if should_stop(best, generations - 1, iterations) {
			debug!(best, generations, "stopping early");
			break;
		}

		if generations < iterations {
			population.breed(elite, options.mutation_rate, rng);
		}
	}

	Ok(population.into_result(generations))
}

/// Find the ratios for mixing `colors` that best approximate `target`.
///
/// This is the lower level entry point of the genetic search:
/// colors are already parsed, and the random number generator and budget are supplied by the caller.
/// The returned ratios are non-negative and sum to `1.0`.
///
/// # Errors
/// Returns [`OptimizationError::EmptyColorSet`] if `colors` is empty,
/// or a timeout/cancellation error if `budget` runs out before a generation starts.
pub fn find_optimal_ratios(
	target: RgbColor,
	colors: &[RgbColor],
	options: &OptimizeOptions,
	budget: &Budget,
	rng: &mut impl Rng,
) -> Result<MixResult, OptimizationError> {
	if colors.is_empty() {
		return Err(OptimizationError::EmptyColorSet);
	}

	match options.strategy {
		MixingStrategy::Rgb => search::<RgbBlend>(target, colors, options, budget, rng),
		MixingStrategy::Lab => search::<LabBlend>(target, colors, options, budget, rng),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;
	use palette::Srgb;

	const WHITE: RgbColor = Srgb::new(255, 255, 255);
	const BLACK: RgbColor = Srgb::new(0, 0, 0);
	const GRAY: RgbColor = Srgb::new(128, 128, 128);

	fn rng() -> Xoshiro256PlusPlus {
		Xoshiro256PlusPlus::seed_from_u64(0)
	}

	fn palette() -> Vec<RgbColor> {
		vec![
			Srgb::new(227, 0, 34),
			Srgb::new(255, 236, 0),
			Srgb::new(0, 71, 171),
			Srgb::new(138, 51, 36),
		]
	}

	fn assert_simplex(ratios: &[f64]) {
		assert!(ratios.iter().all(|&r| r >= 0.0), "{ratios:?}");
		assert_abs_diff_eq!(ratios.iter().sum::<f64>(), 1.0, epsilon = 1e-6);
	}

	#[test]
	fn normalize_sums_to_one() {
		let mut ratios = vec![1.0, 3.0];
		normalize(&mut ratios);
		assert_eq!(ratios, [0.25, 0.75]);

		let mut zeros = vec![0.0; 4];
		normalize(&mut zeros);
		assert_eq!(zeros, [0.25; 4]);

		let mut empty = Vec::new();
		normalize(&mut empty);
		assert!(empty.is_empty());
	}

	#[test]
	fn elite_count_is_bounded() {
		assert_eq!(elite_count(100, 0.2), 20);
		assert_eq!(elite_count(100, 0.0), 1);
		assert_eq!(elite_count(100, 1.0), 100);
		assert_eq!(elite_count(3, 0.2), 1);
	}

	#[test]
	fn early_exit_thresholds() {
		assert!(should_stop(80.0, 0, 1000));
		assert!(!should_stop(79.9, 0, 1000));
		assert!(!should_stop(75.0, 500, 1000));
		assert!(should_stop(75.0, 501, 1000));
		assert!(!should_stop(69.9, 999, 1000));
	}

	#[test]
	fn significant_components_are_sorted_and_filtered() {
		let components = significant_components(&[0.2, 0.005, 0.795]);
		assert_eq!(components.len(), 2);
		assert_eq!(components[0].0, 2);
		assert_eq!(components[1].0, 0);
		assert_abs_diff_eq!(components[0].1, 79.5, epsilon = 1e-9);
	}

	#[test]
	fn random_ratios_are_on_the_simplex() {
		let mut rng = rng();
		for n in 1..=6 {
			assert_simplex(&random_ratios(n, &mut rng));
		}
	}

	#[test]
	fn breeding_keeps_size_and_simplex() {
		let mut rng = rng();
		let mut population = Population::<RgbBlend>::new(GRAY, &palette(), 100, &mut rng);
		population.evaluate();
		population.breed(20, 0.1, &mut rng);

		assert_eq!(population.members.len(), 100);
		for ratios in &population.members {
			assert_eq!(ratios.len(), 4);
			assert_simplex(ratios);
		}
	}

	#[test]
	fn elite_survives_breeding() {
		let mut rng = rng();
		let mut population = Population::<RgbBlend>::new(Srgb::new(90, 40, 100), &palette(), 50, &mut rng);
		let best = population.evaluate();
		let best_ratios = population.best.ratios.clone();
		population.breed(10, 0.1, &mut rng);

		assert!(population.members.contains(&best_ratios));
		assert!(population.evaluate() >= best);
	}

	#[test]
	fn best_accuracy_never_decreases() {
		let mut rng = rng();
		let mut population = Population::<RgbBlend>::new(Srgb::new(40, 150, 90), &palette(), 100, &mut rng);

		let mut previous = f64::NEG_INFINITY;
		for _ in 0..50 {
			let best = population.evaluate();
			assert!(best >= previous, "{best} < {previous}");
			previous = best;
			population.breed(20, 0.1, &mut rng);
		}
	}

	#[test]
	fn single_color_is_exact() {
		let result = find_optimal_ratios(
			WHITE,
			&[WHITE],
			&OptimizeOptions::default(),
			&Budget::unlimited(),
			&mut rng(),
		)
		.expect("non-empty colors");

		assert_eq!(result.ratios, [1.0]);
		assert_eq!(result.mixed_color, WHITE);
		assert_abs_diff_eq!(result.accuracy, 100.0);
		assert_eq!(result.generations, 1);
	}

	#[test]
	fn gray_from_black_and_white_exits_early() {
		let options = OptimizeOptions::default();
		let result = find_optimal_ratios(GRAY, &[WHITE, BLACK], &options, &Budget::unlimited(), &mut rng())
			.expect("non-empty colors");

		assert!(result.accuracy >= EXCELLENT_ACCURACY);
		assert!(result.generations < options.iterations);
		assert_simplex(&result.ratios);
	}

	#[test]
	fn results_are_on_the_simplex() {
		let targets = [Srgb::new(90, 40, 100), Srgb::new(250, 250, 250), Srgb::new(10, 200, 30), BLACK];
		for strategy in [MixingStrategy::Rgb, MixingStrategy::Lab] {
			let options = OptimizeOptions::default().with_iterations(50).with_strategy(strategy);
			for (seed, target) in (0..).zip(targets) {
				let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
				let result = find_optimal_ratios(target, &palette(), &options, &Budget::unlimited(), &mut rng)
					.expect("non-empty colors");

				assert_eq!(result.ratios.len(), 4);
				assert_simplex(&result.ratios);
				assert!((0.0..=100.0).contains(&result.accuracy));
			}
		}
	}

	#[test]
	fn exhausts_iterations_when_target_is_unreachable() {
		// pure green cannot come from red and blue
		let options = OptimizeOptions::default().with_iterations(20);
		let colors = [Srgb::new(255, 0, 0), Srgb::new(0, 0, 255)];
		let result = find_optimal_ratios(Srgb::new(0, 255, 0), &colors, &options, &Budget::unlimited(), &mut rng())
			.expect("non-empty colors");

		assert_eq!(result.generations, 20);
		assert!(result.accuracy < GOOD_ACCURACY);
	}

	#[test]
	fn same_seed_same_result() {
		let options = OptimizeOptions::default().with_iterations(30);
		let target = Srgb::new(90, 40, 100);
		let x = find_optimal_ratios(target, &palette(), &options, &Budget::unlimited(), &mut rng());
		let y = find_optimal_ratios(target, &palette(), &options, &Budget::unlimited(), &mut rng());
		assert_eq!(x, y);
	}

	#[test]
	fn empty_colors_are_rejected() {
		let result = find_optimal_ratios(GRAY, &[], &OptimizeOptions::default(), &Budget::unlimited(), &mut rng());
		assert_eq!(result, Err(OptimizationError::EmptyColorSet));
	}

	#[test]
	fn timeout_returns_no_result() {
		let budget = Budget::new(Some(Duration::ZERO), None);
		let result = find_optimal_ratios(GRAY, &[WHITE, BLACK], &OptimizeOptions::default(), &budget, &mut rng());
		assert_eq!(result, Err(OptimizationError::Timeout(Duration::ZERO)));
	}

	#[test]
	fn cancellation_returns_no_result() {
		let token = CancelToken::new();
		token.cancel();
		let budget = Budget::new(None, Some(token));
		let result = find_optimal_ratios(GRAY, &[WHITE, BLACK], &OptimizeOptions::default(), &budget, &mut rng());
		assert_eq!(result, Err(OptimizationError::Cancelled));
	}
}
