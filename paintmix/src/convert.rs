//! Conversions between hex strings, sRGB, and CIELAB

use crate::{error::ColorFormatError, LabColor, RgbColor};
use palette::{Lab, Srgb};

/// Reference white X component (D65, 2° observer)
const XN: f64 = 95.047;
/// Reference white Y component
const YN: f64 = 100.0;
/// Reference white Z component
const ZN: f64 = 108.883;

/// Below this ratio the CIE `f(t)` uses its linear segment
const EPSILON: f64 = 0.008856;
/// Slope of the linear segment of `f(t)`
const SLOPE: f64 = 7.787;
/// Offset of the linear segment of `f(t)`
const OFFSET: f64 = 16.0 / 116.0;
/// `f(EPSILON)`, the inverse threshold
const F_EPSILON: f64 = 0.206897;

/// Parse a `#RRGGBB` string into an sRGB color.
///
/// Hex digits may be upper or lower case. Anything else, including the
/// three digit shorthand, is rejected rather than coerced.
///
/// # Errors
/// Returns a [`ColorFormatError`] describing why `hex` is malformed.
pub fn hex_to_rgb(hex: &str) -> Result<RgbColor, ColorFormatError> {
	let Some(digits) = hex.strip_prefix('#') else {
		return Err(ColorFormatError::MissingHash(hex.to_owned()));
	};

	if digits.len() != 6 {
		return Err(ColorFormatError::InvalidLength(hex.to_owned()));
	}

	if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
		return Err(ColorFormatError::InvalidDigit(hex.to_owned()));
	}

	// all bytes are ascii, so slicing on byte offsets is safe
	let channel = |i: usize| {
		u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ColorFormatError::InvalidDigit(hex.to_owned()))
	};

	Ok(Srgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Format an sRGB color with possibly out of range channels as a lower case `#rrggbb` string.
///
/// Each channel is rounded and then clamped to `0..=255`.
#[must_use]
pub fn rgb_to_hex(rgb: Srgb<f64>) -> String {
	let rgb = to_u8(rgb.red, rgb.green, rgb.blue);
	format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
}

/// Round and clamp float channels in the `0.0..=255.0` scale to bytes
pub(crate) fn to_u8(red: f64, green: f64, blue: f64) -> RgbColor {
	// clamped to the u8 range before the cast
	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	let channel = |c: f64| c.round().clamp(0.0, 255.0) as u8;
	Srgb::new(channel(red), channel(green), channel(blue))
}

/// sRGB gamma decompanding
fn decompand(c: f64) -> f64 {
	if c > 0.04045 {
		((c + 0.055) / 1.055).powf(2.4)
	} else {
		c / 12.92
	}
}

/// sRGB gamma companding
fn compand(c: f64) -> f64 {
	if c > 0.0031308 {
		1.055 * c.powf(1.0 / 2.4) - 0.055
	} else {
		12.92 * c
	}
}

/// CIE `f(t)`
fn lab_f(t: f64) -> f64 {
	if t > EPSILON {
		t.cbrt()
	} else {
		SLOPE * t + OFFSET
	}
}

/// Inverse of [`lab_f`]
fn lab_f_inv(f: f64) -> f64 {
	if f > F_EPSILON {
		f * f * f
	} else {
		(f - OFFSET) / SLOPE
	}
}

/// Convert an sRGB color to CIELAB through XYZ.
#[must_use]
pub fn rgb_to_lab(rgb: RgbColor) -> LabColor {
	let r = decompand(f64::from(rgb.red) / 255.0);
	let g = decompand(f64::from(rgb.green) / 255.0);
	let b = decompand(f64::from(rgb.blue) / 255.0);

	let x = (r * 0.4124 + g * 0.3576 + b * 0.1805) * 100.0;
	let y = (r * 0.2126 + g * 0.7152 + b * 0.0722) * 100.0;
	let z = (r * 0.0193 + g * 0.1192 + b * 0.9505) * 100.0;

	let fx = lab_f(x / XN);
	let fy = lab_f(y / YN);
	let fz = lab_f(z / ZN);

	Lab::new(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

/// Convert a CIELAB color back to sRGB, clamping colors outside the sRGB gamut.
#[must_use]
pub fn lab_to_rgb(lab: LabColor) -> RgbColor {
	let fy = (lab.l + 16.0) / 116.0;
	let fx = lab.a / 500.0 + fy;
	let fz = fy - lab.b / 200.0;

	// back to the 0.0..=1.0 scale
	let x = lab_f_inv(fx) * XN / 100.0;
	let y = lab_f_inv(fy) * YN / 100.0;
	let z = lab_f_inv(fz) * ZN / 100.0;

	let r = x * 3.2406 + y * -1.5372 + z * -0.4986;
	let g = x * -0.9689 + y * 1.8758 + z * 0.0415;
	let b = x * 0.0557 + y * -0.2040 + z * 1.0570;

	to_u8(compand(r) * 255.0, compand(g) * 255.0, compand(b) * 255.0)
}

/// Whether a color is dark enough that text drawn on it should be light
#[must_use]
pub fn is_dark(rgb: RgbColor) -> bool {
	let brightness =
		(u32::from(rgb.red) * 299 + u32::from(rgb.green) * 587 + u32::from(rgb.blue) * 114) / 1000;
	brightness < 128
}
