//! Blends reference colors by ratio

use crate::{
	catalog::ReferenceColor,
	convert::{lab_to_rgb, rgb_to_lab, to_u8},
	error::ColorFormatError,
	RgbColor,
};
use palette::{Lab, Srgb};

/// The color space in which reference colors are averaged
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum MixingStrategy {
	/// Average the sRGB channels directly
	#[default]
	Rgb,
	/// Average in CIELAB and convert back to sRGB
	Lab,
}

/// A color space that colors are averaged in
pub(crate) trait Blend {
	/// Channels of `color` in this space
	fn channels(color: RgbColor) -> [f64; 3];

	/// Convert averaged channels back to sRGB
	fn finish(channels: [f64; 3]) -> RgbColor;
}

/// Linear blending of the sRGB channels
pub(crate) struct RgbBlend;

impl Blend for RgbBlend {
	fn channels(color: RgbColor) -> [f64; 3] {
		[f64::from(color.red), f64::from(color.green), f64::from(color.blue)]
	}

	fn finish([r, g, b]: [f64; 3]) -> RgbColor {
		to_u8(r, g, b)
	}
}

/// Blending of the CIELAB channels
pub(crate) struct LabBlend;

impl Blend for LabBlend {
	fn channels(color: RgbColor) -> [f64; 3] {
		let lab = rgb_to_lab(color);
		[lab.l, lab.a, lab.b]
	}

	fn finish([l, a, b]: [f64; 3]) -> RgbColor {
		lab_to_rgb(Lab::new(l, a, b))
	}
}

/// Convert each color into the channels of `B` once, ahead of repeated blending
pub(crate) fn prepare<B: Blend>(colors: &[RgbColor]) -> Vec<[f64; 3]> {
	colors.iter().map(|&color| B::channels(color)).collect()
}

/// Ratio weighted average of prepared channels.
///
/// Ratios are renormalized by their sum. A zero sum gives black.
pub(crate) fn blend<B: Blend>(channels: &[[f64; 3]], ratios: &[f64]) -> RgbColor {
	debug_assert_eq!(channels.len(), ratios.len());

	let mut sum = [0.0; 3];
	let mut total = 0.0;
	for (color, &ratio) in channels.iter().zip(ratios) {
		sum[0] += color[0] * ratio;
		sum[1] += color[1] * ratio;
		sum[2] += color[2] * ratio;
		total += ratio;
	}

	if total > 0.0 {
		B::finish([sum[0] / total, sum[1] / total, sum[2] / total])
	} else {
		Srgb::new(0, 0, 0)
	}
}

/// The color obtained by mixing `colors` in the proportions given by `ratios`.
///
/// `ratios` is matched positionally with `colors`; extra entries on either side are ignored.
#[must_use]
pub fn mixed_color(colors: &[RgbColor], ratios: &[f64], strategy: MixingStrategy) -> RgbColor {
	let n = usize::min(colors.len(), ratios.len());
	let (colors, ratios) = (&colors[..n], &ratios[..n]);
	match strategy {
		MixingStrategy::Rgb => blend::<RgbBlend>(&prepare::<RgbBlend>(colors), ratios),
		MixingStrategy::Lab => blend::<LabBlend>(&prepare::<LabBlend>(colors), ratios),
	}
}

/// The color obtained by mixing reference colors in the proportions given by `ratios`.
///
/// # Errors
/// Returns an error if any reference color has a malformed hex value.
pub fn get_mixed_color(
	colors: &[ReferenceColor],
	ratios: &[f64],
	strategy: MixingStrategy,
) -> Result<RgbColor, ColorFormatError> {
	let colors = colors.iter().map(ReferenceColor::srgb).collect::<Result<Vec<_>, _>>()?;
	Ok(mixed_color(&colors, ratios, strategy))
}

#[cfg(test)]
mod tests {
	use super::*;

	const WHITE: RgbColor = Srgb::new(255, 255, 255);
	const BLACK: RgbColor = Srgb::new(0, 0, 0);

	#[test]
	fn single_color_is_unchanged() {
		let color = Srgb::new(200, 31, 94);
		assert_eq!(mixed_color(&[color], &[1.0], MixingStrategy::Rgb), color);
		assert_eq!(mixed_color(&[color], &[1.0], MixingStrategy::Lab), color);
	}

	#[test]
	fn rgb_blend_averages_channels() {
		let mixed = mixed_color(&[WHITE, BLACK], &[0.5, 0.5], MixingStrategy::Rgb);
		assert_eq!(mixed, Srgb::new(128, 128, 128));

		let mixed = mixed_color(&[Srgb::new(255, 0, 0), Srgb::new(0, 0, 255)], &[0.25, 0.75], MixingStrategy::Rgb);
		assert_eq!(mixed, Srgb::new(64, 0, 191));
	}

	#[test]
	fn ratios_are_renormalized() {
		let normalized = mixed_color(&[WHITE, BLACK], &[0.25, 0.75], MixingStrategy::Rgb);
		let scaled = mixed_color(&[WHITE, BLACK], &[1.0, 3.0], MixingStrategy::Rgb);
		assert_eq!(normalized, scaled);
	}

	#[test]
	fn zero_ratios_give_black() {
		assert_eq!(mixed_color(&[WHITE, WHITE], &[0.0, 0.0], MixingStrategy::Rgb), BLACK);
		assert_eq!(mixed_color(&[WHITE, WHITE], &[0.0, 0.0], MixingStrategy::Lab), BLACK);
		assert_eq!(mixed_color(&[], &[], MixingStrategy::Rgb), BLACK);
	}

	#[test]
	fn lab_blend_gray_is_darker_than_rgb() {
		// L* = 50 is darker than the sRGB channel midpoint
		let rgb = mixed_color(&[WHITE, BLACK], &[0.5, 0.5], MixingStrategy::Rgb);
		let lab = mixed_color(&[WHITE, BLACK], &[0.5, 0.5], MixingStrategy::Lab);
		assert_eq!(lab.red, lab.green);
		assert_eq!(lab.green, lab.blue);
		assert!(lab.red < rgb.red, "{lab:?} vs {rgb:?}");
	}

	#[test]
	fn reference_colors_are_parsed() {
		let colors = [
			ReferenceColor::new("Titanium White", "#FFFFFF").expect("valid hex"),
			ReferenceColor::new("Mars Black", "#000000").expect("valid hex"),
		];
		assert_eq!(
			get_mixed_color(&colors, &[0.5, 0.5], MixingStrategy::Rgb),
			Ok(Srgb::new(128, 128, 128))
		);

		let bad = [ReferenceColor { name: "Bad".to_owned(), hex: "#12".to_owned(), rgb: String::new() }];
		assert!(get_mixed_color(&bad, &[1.0], MixingStrategy::Rgb).is_err());
	}
}
