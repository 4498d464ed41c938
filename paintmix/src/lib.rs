//! Find the mixture of a small palette of reference paint colors that best approximates a target color.
//!
//! # Examples
//!
//! ## Mix a fixed set of colors.
//!
//! ```
//! use paintmix::{optimize_ratios, OptimizeOptions, ReferenceColor};
//!
//! let colors = [
//! 	ReferenceColor::new("Titanium White", "#FFFFFF")?,
//! 	ReferenceColor::new("Mars Black", "#000000")?,
//! ];
//! let target = paintmix::hex_to_rgb("#808080")?;
//!
//! let result = optimize_ratios(target, &colors, &OptimizeOptions::default().with_seed(0))?;
//! assert!(result.accuracy >= 80.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Let the search pick which favourites to mix.
//!
//! ```
//! use paintmix::{predict_best_subset, ReferenceColor, SubsetOptions};
//!
//! let favourites = [
//! 	ReferenceColor::new("Cadmium Yellow", "#FFF600")?,
//! 	ReferenceColor::new("Cobalt Blue", "#0047AB")?,
//! 	ReferenceColor::new("Titanium White", "#FFFFFF")?,
//! ];
//! let target = paintmix::hex_to_rgb("#7FBF7F")?;
//!
//! let prediction = predict_best_subset(target, &favourites, &SubsetOptions::default())?;
//! println!("mix {:?} in {:?}", prediction.combination, prediction.ratios);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Arguments
//!
//! ## Iterations
//!
//! The number of generations the genetic search may run for a single set of colors.
//! The search stops early once a mix reaches 80% accuracy,
//! or 70% accuracy after more than half of the generations.
//!
//! The subset search runs one ratio search per combination, so it uses a smaller budget per combination
//! (`max_iterations`, 500 by default).
//!
//! ## Target Accuracy
//!
//! The subset search tries all pairs of favourites, then all triples, then all quadruples,
//! returning at the first combination that reaches this accuracy.
//! Fewer colors are therefore preferred whenever they are good enough.
//!
//! ## Mixing Strategy
//!
//! Colors are blended by averaging their sRGB channels ([`MixingStrategy::Rgb`]),
//! or by averaging in CIELAB and converting back ([`MixingStrategy::Lab`]).
//! Neither models subtractive pigment mixing.
//!
//! ## Seed
//!
//! The search is stochastic. Fixing a seed makes results reproducible; without one,
//! repeated calls give statistically similar but not identical results.
//!
//! ## Timeout and Cancellation
//!
//! Searches check their [`CancelToken`] and deadline before every generation,
//! and report [`OptimizationError::Timeout`] or [`OptimizationError::Cancelled`]
//! instead of a partial result.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::cargo)]
#![warn(clippy::use_debug, clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![warn(clippy::unwrap_used, clippy::unwrap_in_result)]
#![warn(clippy::unneeded_field_pattern, clippy::rest_pat_in_fully_bound_structs)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::str_to_string, clippy::string_to_string, clippy::string_slice)]
#![warn(missing_docs, clippy::missing_docs_in_private_items, rustdoc::all)]
#![warn(clippy::float_cmp_const, clippy::lossy_float_literal)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::unreadable_literal)]

use palette::{white_point::D65, Lab, Srgb};

pub mod accuracy;
mod budget;
pub mod catalog;
pub mod convert;
mod error;
pub mod mixture;
mod predict;
pub mod ratios;
pub mod subset;

pub use accuracy::{calculate_accuracy, AccuracyMetric};
pub use budget::{Budget, CancelToken};
pub use catalog::{Catalog, ReferenceColor, DEFAULT_FAVOURITES};
pub use convert::{hex_to_rgb, is_dark, lab_to_rgb, rgb_to_hex, rgb_to_lab};
pub use error::{CatalogError, ColorFormatError, OptimizationError, PredictionError};
pub use mixture::{get_mixed_color, mixed_color, MixingStrategy};
pub use predict::{predict_mix, PredictPolicy};
pub use ratios::{MixResult, OptimizeOptions};
pub use subset::{Prediction, SubsetOptions};

/// An sRGB color with 8 bit channels
pub type RgbColor = Srgb<u8>;

/// A CIELAB color relative to the D65 white point
pub type LabColor = Lab<D65, f64>;

/// Find the ratios for mixing `colors` that best approximate `target`.
///
/// See the crate documentation for information on each option.
///
/// # Errors
/// Returns an error if `colors` is empty, a color has a malformed hex value,
/// or the search times out or is cancelled.
pub fn optimize_ratios(
	target: RgbColor,
	colors: &[ReferenceColor],
	options: &OptimizeOptions,
) -> Result<MixResult, OptimizationError> {
	let palette = colors.iter().map(ReferenceColor::srgb).collect::<Result<Vec<_>, _>>()?;
	ratios::find_optimal_ratios(target, &palette, options, &options.budget(), &mut options.rng())
}

/// Find the combination of `favourites` and its ratios that best approximate `target`.
///
/// A low accuracy is not an error; use [`Prediction::meets`] to decide whether the result is acceptable,
/// or [`predict_mix`] for a search with a built-in acceptance floor.
///
/// See the crate documentation for information on each option.
///
/// # Errors
/// Returns an error if fewer than two favourites are given, a favourite has a malformed hex value,
/// or the search times out or is cancelled.
pub fn predict_best_subset(
	target: RgbColor,
	favourites: &[ReferenceColor],
	options: &SubsetOptions,
) -> Result<Prediction, PredictionError> {
	subset::find_optimal_ratios_favourites(
		target,
		favourites,
		options,
		&options.optimizer.budget(),
		&mut options.optimizer.rng(),
	)
}
