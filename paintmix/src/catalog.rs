//! Named reference colors and the catalog they are loaded from

use crate::{
	convert::hex_to_rgb,
	error::{CatalogError, ColorFormatError},
	RgbColor,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Names of the colors used for automatic mix prediction when no favourites are given
pub const DEFAULT_FAVOURITES: [&str; 11] = [
	"Cadmium Yellow",
	"Cadmium Free Red",
	"Cobalt Blue",
	"Cobalt Blue Deep",
	"Purple Madder",
	"Mars Black",
	"Titanium White",
	"Burnt Umber",
	"Pale Rose Blush",
	"Magenta",
	"Indian Red",
];

/// A named paint color with a known sRGB value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceColor {
	/// Name, unique within its catalog
	pub name: String,
	/// `#RRGGBB` value
	pub hex: String,
	/// Human readable RGB value, for display only
	pub rgb: String,
}

impl ReferenceColor {
	/// Create a reference color, validating `hex` and deriving the display string from it
	///
	/// # Errors
	/// Returns an error if `hex` is not of the form `#RRGGBB`.
	pub fn new(name: impl Into<String>, hex: impl Into<String>) -> Result<Self, ColorFormatError> {
		let hex = hex.into();
		let srgb = hex_to_rgb(&hex)?;
		Ok(Self {
			name: name.into(),
			hex,
			rgb: format!("rgb({}, {}, {})", srgb.red, srgb.green, srgb.blue),
		})
	}

	/// The sRGB value of this color
	///
	/// # Errors
	/// Returns an error if the stored hex value is malformed.
	pub fn srgb(&self) -> Result<RgbColor, ColorFormatError> {
		hex_to_rgb(&self.hex)
	}
}

/// An ordered, read only list of reference colors with unique names and valid hex values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
	/// Colors in catalog order
	colors: Vec<ReferenceColor>,
}

impl Catalog {
	/// Build a catalog, rejecting duplicate names and malformed hex values
	///
	/// # Errors
	/// Returns the first problem found.
	pub fn new(colors: Vec<ReferenceColor>) -> Result<Self, CatalogError> {
		let mut names = HashSet::with_capacity(colors.len());
		for color in &colors {
			color.srgb().map_err(|source| CatalogError::InvalidColorFormat {
				name: color.name.clone(),
				source,
			})?;

			if !names.insert(color.name.as_str()) {
				return Err(CatalogError::DuplicateName(color.name.clone()));
			}
		}

		Ok(Self { colors })
	}

	/// Load a catalog from a JSON array of `{ "name", "hex", "rgb" }` records
	///
	/// # Errors
	/// Returns an error if the JSON is malformed or the records fail validation.
	pub fn from_json(json: &str) -> Result<Self, CatalogError> {
		Self::new(serde_json::from_str(json)?)
	}

	/// All colors in catalog order
	#[must_use]
	pub fn colors(&self) -> &[ReferenceColor] {
		&self.colors
	}

	/// The number of colors
	#[must_use]
	pub fn len(&self) -> usize {
		self.colors.len()
	}

	/// Whether the catalog has no colors
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}

	/// Look up a color by its exact name
	#[must_use]
	pub fn get(&self, name: &str) -> Option<&ReferenceColor> {
		self.colors.iter().find(|color| color.name == name)
	}

	/// The colors with the given names, in the order they were asked for
	///
	/// # Errors
	/// Returns [`CatalogError::UnknownColor`] for the first name not in the catalog.
	pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<ReferenceColor>, CatalogError> {
		names
			.iter()
			.map(|name| {
				let name = name.as_ref();
				self.get(name).cloned().ok_or_else(|| CatalogError::UnknownColor(name.to_owned()))
			})
			.collect()
	}

	/// The colors with the given names, in catalog order
	///
	/// # Errors
	/// Returns [`CatalogError::UnknownColor`] for the first name not in the catalog.
	pub fn favourites<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<ReferenceColor>, CatalogError> {
		if let Some(missing) = names.iter().find(|name| self.get(name.as_ref()).is_none()) {
			return Err(CatalogError::UnknownColor(missing.as_ref().to_owned()));
		}

		Ok(self
			.colors
			.iter()
			.filter(|color| names.iter().any(|name| name.as_ref() == color.name))
			.cloned()
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use palette::Srgb;

	const JSON: &str = r##"[
		{ "name": "Titanium White", "hex": "#FFFFFF", "rgb": "rgb(255, 255, 255)" },
		{ "name": "Burnt Umber", "hex": "#8A3324", "rgb": "rgb(138, 51, 36)" },
		{ "name": "Mars Black", "hex": "#000000", "rgb": "rgb(0, 0, 0)" }
	]"##;

	#[test]
	fn new_derives_display_string() {
		let color = ReferenceColor::new("Burnt Umber", "#8A3324").expect("valid hex");
		assert_eq!(color.rgb, "rgb(138, 51, 36)");
		assert_eq!(color.srgb(), Ok(Srgb::new(138, 51, 36)));
		assert!(ReferenceColor::new("Nothing", "8A3324").is_err());
	}

	#[test]
	fn loads_json() {
		let catalog = Catalog::from_json(JSON).expect("valid catalog");
		assert_eq!(catalog.len(), 3);
		assert_eq!(catalog.colors()[1].name, "Burnt Umber");
		assert_eq!(catalog.get("Mars Black").map(|c| c.hex.as_str()), Some("#000000"));
		assert!(catalog.get("mars black").is_none());
	}

	#[test]
	fn rejects_duplicates() {
		let json = r##"[
			{ "name": "White", "hex": "#FFFFFF", "rgb": "" },
			{ "name": "White", "hex": "#FFFFFE", "rgb": "" }
		]"##;
		assert!(matches!(Catalog::from_json(json), Err(CatalogError::DuplicateName(name)) if name == "White"));
	}

	#[test]
	fn rejects_bad_hex() {
		let json = r#"[{ "name": "Broken", "hex": "white", "rgb": "" }]"#;
		assert!(matches!(
			Catalog::from_json(json),
			Err(CatalogError::InvalidColorFormat { name, .. }) if name == "Broken"
		));
	}

	#[test]
	fn rejects_bad_json() {
		assert!(matches!(Catalog::from_json("[{"), Err(CatalogError::Json(_))));
		assert!(matches!(Catalog::from_json(r#"[{ "name": "X" }]"#), Err(CatalogError::Json(_))));
	}

	#[test]
	fn favourites_keep_catalog_order() {
		let catalog = Catalog::from_json(JSON).expect("valid catalog");
		let favourites = catalog.favourites(&["Mars Black", "Titanium White"]).expect("known names");
		let names = favourites.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
		assert_eq!(names, ["Titanium White", "Mars Black"]);

		let selected = catalog.select(&["Mars Black", "Titanium White"]).expect("known names");
		assert_eq!(selected[0].name, "Mars Black");
	}

	#[test]
	fn unknown_names_are_reported() {
		let catalog = Catalog::from_json(JSON).expect("valid catalog");
		assert!(matches!(
			catalog.favourites(&["Mars Black", "Cobalt Blue"]),
			Err(CatalogError::UnknownColor(name)) if name == "Cobalt Blue"
		));
		assert!(matches!(catalog.select(&["Nope"]), Err(CatalogError::UnknownColor(_))));
	}
}
