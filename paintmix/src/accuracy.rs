//! Scores how closely a mixed color matches its target

use crate::{convert::rgb_to_lab, RgbColor};
use palette::color_difference::Ciede2000;

/// Per channel weights for the RGB distance; green differences are the most visible
const WEIGHTS: [f64; 3] = [2.0, 4.0, 3.0];

/// Distance between black and white under [`WEIGHTS`]
// sqrt((2 + 4 + 3) * 255^2)
const MAX_DISTANCE: f64 = 765.0;

/// How to score a mixed color against its target
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum AccuracyMetric {
	/// Weighted Euclidean distance in sRGB.
	///
	/// This is cheap enough for the optimizer's inner loop and is what the search ranks by.
	#[default]
	WeightedRgb,
	/// CIEDE2000 color difference in CIELAB, mapped to `100 - ΔE`.
	///
	/// Intended for reporting a final result, not for ranking candidates.
	DeltaE,
}

impl AccuracyMetric {
	/// Accuracy of `mixed` against `target` in the range `0.0..=100.0`
	#[must_use]
	pub fn accuracy(self, target: RgbColor, mixed: RgbColor) -> f64 {
		match self {
			Self::WeightedRgb => calculate_accuracy(target, mixed),
			Self::DeltaE => delta_e_accuracy(target, mixed),
		}
	}
}

/// Weighted RGB distance between two colors
fn weighted_distance(x: RgbColor, y: RgbColor) -> f64 {
	let dr = f64::from(x.red) - f64::from(y.red);
	let dg = f64::from(x.green) - f64::from(y.green);
	let db = f64::from(x.blue) - f64::from(y.blue);
	(WEIGHTS[0] * dr * dr + WEIGHTS[1] * dg * dg + WEIGHTS[2] * db * db).sqrt()
}

/// Accuracy of `mixed` against `target` in the range `0.0..=100.0` using the weighted RGB distance.
#[must_use]
pub fn calculate_accuracy(target: RgbColor, mixed: RgbColor) -> f64 {
	((1.0 - weighted_distance(target, mixed) / MAX_DISTANCE) * 100.0).clamp(0.0, 100.0)
}

/// Accuracy of `mixed` against `target` in the range `0.0..=100.0` using CIEDE2000.
#[must_use]
pub fn delta_e_accuracy(target: RgbColor, mixed: RgbColor) -> f64 {
	let delta_e = rgb_to_lab(target).difference(rgb_to_lab(mixed));
	(100.0 - delta_e).clamp(0.0, 100.0)
}
