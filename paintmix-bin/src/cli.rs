//! Command line options and their parsing

use clap::{Args, Parser, Subcommand, ValueEnum};
use paintmix::{AccuracyMetric, MixingStrategy, RgbColor};
use std::{
    fmt::{Debug, Display},
    num::ParseFloatError,
    ops::RangeBounds,
    path::PathBuf,
    str::FromStr,
};

/// Supported output formats for colors
#[derive(Copy, Clone, ValueEnum)]
pub enum FormatOutput {
    /// sRGB hexcode
    Hex,
    /// sRGB (r,g,b) triple
    Rgb,
    /// Hexcode on a true color background
    Swatch,
}

/// Ways to colorize the output text
#[derive(Copy, Clone, ValueEnum)]
pub enum ColorizeOutput {
    /// Foreground
    Fg,
    /// Background
    Bg,
}

/// Color spaces to blend reference colors in
#[derive(Copy, Clone, ValueEnum)]
pub enum Strategy {
    /// Average the sRGB channels
    Rgb,
    /// Average in CIELAB
    Lab,
}

impl From<Strategy> for MixingStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Rgb => Self::Rgb,
            Strategy::Lab => Self::Lab,
        }
    }
}

/// Metrics for reporting the accuracy of the final mix
#[derive(Copy, Clone, ValueEnum)]
pub enum Metric {
    /// Weighted sRGB distance, the metric the search ranks by
    WeightedRgb,
    /// CIEDE2000 difference in CIELAB
    DeltaE,
}

impl From<Metric> for AccuracyMetric {
    fn from(metric: Metric) -> Self {
        match metric {
            Metric::WeightedRgb => Self::WeightedRgb,
            Metric::DeltaE => Self::DeltaE,
        }
    }
}

/// Find the mixture of reference paint colors that best approximates a target color.
///
/// Colors are looked up by name in a catalog of reference paints.
/// The ratios are found with a genetic search, so results vary between runs unless --seed is given.
#[derive(Parser)]
#[command(version)]
pub struct Options {
    /// What to mix
    #[command(subcommand)]
    pub command: Command,

    /// The path to a JSON color catalog
    ///
    /// The catalog is an array of {"name", "hex", "rgb"} records.
    /// If not provided, a built-in sample of artist paints is used.
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// The color space the reference colors are blended in
    #[arg(long, global = true, default_value = "rgb")]
    pub strategy: Strategy,

    /// The metric used to report the accuracy of the final mix
    ///
    /// The search itself always ranks mixes by weighted RGB distance.
    #[arg(long, global = true, default_value = "weighted-rgb")]
    pub metric: Metric,

    /// The maximum number of generations for each ratio search
    ///
    /// For the predict command, this applies to every combination of favourites that is tried.
    #[arg(short, long, global = true)]
    pub iterations: Option<u32>,

    /// The seed value used for the random number generator
    ///
    /// If not provided, a random seed is used.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// The maximum time in milliseconds the search may take
    ///
    /// The mix command has no limit by default, and the predict command stops after 2 seconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// The format to print the colors in
    #[arg(short, long, global = true, default_value = "hex")]
    pub output: FormatOutput,

    /// Color the foreground or background for each printed color
    #[arg(short, long, global = true)]
    pub colorize: Option<ColorizeOutput>,

    /// The number of threads to use
    ///
    /// A value of 0 indicates to automatically choose the number of threads.
    #[cfg(feature = "threads")]
    #[arg(short, long, global = true, default_value_t = 0)]
    pub threads: u8,

    /// Print additional information, such as the number of generations
    #[arg(long, global = true)]
    pub verbose: bool,
}

/// The available commands
#[derive(Subcommand)]
pub enum Command {
    /// Find the ratios for mixing a given list of colors
    Mix(MixArgs),
    /// Pick the favourite colors to mix and find their ratios
    Predict(PredictArgs),
}

/// Arguments of the mix command
#[derive(Args)]
pub struct MixArgs {
    /// The target color as a #RRGGBB hexcode
    #[arg(value_parser = parse_target)]
    pub target: RgbColor,

    /// A comma separated list of catalog color names to mix
    #[arg(long, required = true, value_delimiter = ',')]
    pub colors: Vec<String>,
}

/// Arguments of the predict command
#[derive(Args)]
pub struct PredictArgs {
    /// The target color as a #RRGGBB hexcode
    #[arg(value_parser = parse_target)]
    pub target: RgbColor,

    /// A comma separated list of catalog color names to choose from
    ///
    /// If not provided, a default list of 11 common paints is used.
    #[arg(short, long, value_delimiter = ',')]
    pub favourites: Vec<String>,

    /// The accuracy at which the first attempt stops looking at larger combinations
    ///
    /// Values should be in the range [0.0, 100.0].
    #[arg(long, default_value_t = 65.0, value_parser = parse_valid_accuracy)]
    pub target_accuracy: f64,

    /// The lowest accuracy that is reported as a successful mix
    ///
    /// Values should be in the range [0.0, 100.0].
    #[arg(long, default_value_t = 50.0, value_parser = parse_valid_accuracy)]
    pub floor: f64,
}

/// Parse a `#RRGGBB` target color
fn parse_target(s: &str) -> Result<RgbColor, String> {
    paintmix::hex_to_rgb(s).map_err(|e| e.to_string())
}

/// Parse a float value and ensure it in the provided, valid range
fn parse_float_in_range<T>(s: &str, range: impl RangeBounds<T> + Debug) -> Result<T, String>
where
    T: FromStr<Err = ParseFloatError> + Display + PartialOrd,
{
    let value: T = s.parse().map_err(|e| format!("{e}"))?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in {range:?}"))
    }
}

/// Parse an accuracy percentage and ensure it is in `0.0..=100.0`
fn parse_valid_accuracy(s: &str) -> Result<f64, String> {
    parse_float_in_range(s, 0.0..=100.0)
}
