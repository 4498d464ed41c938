//! Error types shared by the optimizer, the predictor, and the catalog

use crate::subset::Prediction;
use std::time::Duration;
use thiserror::Error;

/// A malformed `#RRGGBB` hex string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorFormatError {
	/// The string does not start with `#`
	#[error("color {0:?} does not start with '#'")]
	MissingHash(String),
	/// The string does not have exactly six hex digits after the `#`
	#[error("color {0:?} should have exactly 6 hex digits")]
	InvalidLength(String),
	/// The string contains a character that is not a hex digit
	#[error("color {0:?} contains a character that is not a hex digit")]
	InvalidDigit(String),
}

/// Failure of a single ratio optimization call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizationError {
	/// One of the reference colors has a malformed hex value
	#[error("invalid reference color: {0}")]
	InvalidColorFormat(#[from] ColorFormatError),
	/// No reference colors were provided
	#[error("at least one reference color is needed to mix a color")]
	EmptyColorSet,
	/// The search ran past its wall-clock budget
	#[error("search did not finish within {}ms", .0.as_millis())]
	Timeout(Duration),
	/// The search was stopped through its cancellation token
	#[error("search was cancelled")]
	Cancelled,
}

/// Failure of a subset search or of the prediction policy built on it
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
	/// An optimization call inside the search failed
	#[error(transparent)]
	Optimization(#[from] OptimizationError),
	/// Fewer than two favourites were provided, so no mixture can be formed
	#[error("at least 2 favourite colors are needed to predict a mix, found {found}")]
	NotEnoughFavourites {
		/// The number of favourites provided
		found: usize,
	},
	/// The best mixture found does not reach the acceptance floor
	#[error("unable to create an accurate mix, best achievable accuracy was {:.1}% (needed {floor:.1}%)", .best.accuracy)]
	BelowAccuracyThreshold {
		/// The best prediction found across all attempts
		best: Box<Prediction>,
		/// The minimum accuracy the policy accepts
		floor: f64,
	},
}

impl PredictionError {
	/// Whether the search was stopped by its time budget or cancellation token
	#[must_use]
	pub const fn is_interrupted(&self) -> bool {
		matches!(
			self,
			Self::Optimization(OptimizationError::Timeout(_) | OptimizationError::Cancelled)
		)
	}
}

/// Failure to load or query a reference color catalog
#[derive(Debug, Error)]
pub enum CatalogError {
	/// The catalog is not valid JSON or does not match the record format
	#[error("failed to parse the color catalog: {0}")]
	Json(#[from] serde_json::Error),
	/// Two catalog entries share a name
	#[error("color {0:?} appears more than once in the catalog")]
	DuplicateName(String),
	/// A requested color name is not in the catalog
	#[error("color {0:?} is not in the catalog")]
	UnknownColor(String),
	/// A catalog entry has a malformed hex value
	#[error("catalog entry {name:?} is invalid: {source}")]
	InvalidColorFormat {
		/// The name of the offending entry
		name: String,
		/// The parse failure
		source: ColorFormatError,
	},
}
