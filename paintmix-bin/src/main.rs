//! Find the mixture of reference paint colors that best approximates a target color.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::unreadable_literal
)]

mod cli;

#[allow(clippy::wildcard_imports)]
use cli::*;

use std::{
    fmt::{self, Display},
    io,
    path::PathBuf,
    process::ExitCode,
    time::{Duration, Instant},
};

use clap::Parser;
use colored::Colorize;
use palette::Srgb;
use paintmix::{
    AccuracyMetric, Catalog, CatalogError, OptimizationError, OptimizeOptions, PredictPolicy, Prediction,
    PredictionError, ReferenceColor, RgbColor, DEFAULT_FAVOURITES,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// The catalog used when --catalog is not given
const SAMPLE_CATALOG: &str = include_str!("../data/catalog.json");

/// Record the running time of a function and print the elapsed time
macro_rules! time {
    ($name: literal, $verbose: expr, $func_call: expr) => {{
        let start = Instant::now();
        let result = $func_call;
        if $verbose {
            println!("{} took {}ms", $name, start.elapsed().as_millis());
        }
        result
    }};
}

/// Error cases for a single run of the program
#[derive(Debug)]
enum RunError {
    /// Failed to read the catalog file
    CatalogRead(PathBuf, io::Error),
    /// The catalog is malformed or does not contain a requested color
    Catalog(CatalogError),
    /// The ratio search failed
    Optimization(OptimizationError),
    /// The favourite search failed or did not find an acceptable mix
    Prediction(PredictionError),
    /// Failed to start the worker threads
    #[cfg(feature = "threads")]
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RunError::CatalogRead(path, e) => {
                write!(f, "Failed to read the catalog file {}: {e}", path.display())
            }
            RunError::Catalog(e) => write!(f, "{e}"),
            RunError::Optimization(e) => write!(f, "Failed to mix the colors: {e}"),
            RunError::Prediction(PredictionError::BelowAccuracyThreshold { best, floor }) => write!(
                f,
                "Unable to create an accurate mix with the favourite colors. Best achievable accuracy: {:.1}% (needed {floor:.1}%). Try mixing colors manually or adding more favourites.",
                best.accuracy
            ),
            RunError::Prediction(e) => write!(f, "Failed to predict a mix: {e}"),
            #[cfg(feature = "threads")]
            RunError::ThreadPool(e) => write!(f, "Failed to start the thread pool: {e}"),
        }
    }
}

impl From<CatalogError> for RunError {
    fn from(e: CatalogError) -> Self {
        RunError::Catalog(e)
    }
}

impl From<OptimizationError> for RunError {
    fn from(e: OptimizationError) -> Self {
        RunError::Optimization(e)
    }
}

impl From<PredictionError> for RunError {
    fn from(e: PredictionError) -> Self {
        RunError::Prediction(e)
    }
}

fn main() -> ExitCode {
    let options = Options::parse();

    init_tracing(options.verbose);

    let result = run_mix_and_print(&options);

    // Returning Result<_> uses Debug printing instead of Display
    if let Err(e) = result {
        eprintln!("{e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Install a log subscriber writing to stderr, filtered by `RUST_LOG` or else by the verbose flag
fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,paintmix=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Builds a thread pool and then runs `mix_and_print`
#[cfg(feature = "threads")]
fn run_mix_and_print(options: &Options) -> Result<(), RunError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(usize::from(options.threads))
        .build()
        .map_err(RunError::ThreadPool)?;

    pool.install(|| mix_and_print(options))
}

/// Runs `mix_and_print` on a single thread
#[cfg(not(feature = "threads"))]
fn run_mix_and_print(options: &Options) -> Result<(), RunError> {
    mix_and_print(options)
}

/// Load the catalog, run the requested command, and print the result using the given options
fn mix_and_print(options: &Options) -> Result<(), RunError> {
    let catalog = time!("Catalog loading", options.verbose, load_catalog(options))?;
    if options.verbose {
        println!("Loaded {} reference colors", catalog.len());
    }

    match &options.command {
        Command::Mix(args) => mix(&catalog, args, options),
        Command::Predict(args) => predict(&catalog, args, options),
    }
}

/// Load the catalog at --catalog, or the built-in sample
fn load_catalog(options: &Options) -> Result<Catalog, RunError> {
    let catalog = if let Some(path) = &options.catalog {
        let json = std::fs::read_to_string(path).map_err(|e| RunError::CatalogRead(path.clone(), e))?;
        Catalog::from_json(&json)?
    } else {
        Catalog::from_json(SAMPLE_CATALOG)?
    };

    Ok(catalog)
}

/// Run the ratio search on the colors named in `args`
fn mix(catalog: &Catalog, args: &MixArgs, options: &Options) -> Result<(), RunError> {
    let colors = catalog.select(&args.colors)?;

    let mut optimizer = OptimizeOptions::default().with_strategy(options.strategy.into());
    if let Some(iterations) = options.iterations {
        optimizer = optimizer.with_iterations(iterations);
    }
    if let Some(seed) = options.seed {
        optimizer = optimizer.with_seed(seed);
    }
    if let Some(ms) = options.timeout_ms {
        optimizer = optimizer.with_timeout(Duration::from_millis(ms));
    }

    let result = time!(
        "Ratio search",
        options.verbose,
        paintmix::optimize_ratios(args.target, &colors, &optimizer)
    )?;

    if options.verbose {
        println!("Evaluated {} generations", result.generations);
    }

    let components = result
        .significant_components()
        .into_iter()
        .map(|(i, percent)| (&colors[i], percent))
        .collect::<Vec<_>>();

    print_mix(
        &components,
        result.mixed_color,
        result.accuracy_with(options.metric.into(), args.target),
        options,
    );

    Ok(())
}

/// Search the favourites named in `args` for the best mix
fn predict(catalog: &Catalog, args: &PredictArgs, options: &Options) -> Result<(), RunError> {
    let favourites = if args.favourites.is_empty() {
        catalog.favourites(&DEFAULT_FAVOURITES)?
    } else {
        catalog.favourites(&args.favourites)?
    };

    let policy = prediction_policy(args, options);

    let result = time!(
        "Favourite search",
        options.verbose,
        paintmix::predict_mix(args.target, &favourites, &policy)
    );

    match result {
        Ok(prediction) => {
            print_prediction(&prediction, args, options);
            Ok(())
        }
        Err(PredictionError::BelowAccuracyThreshold { best, floor }) => {
            // still show the closest mix before reporting the failure
            print_prediction(&best, args, options);
            Err(PredictionError::BelowAccuracyThreshold { best, floor }.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Print the favourites chosen by a prediction and how to mix them
fn print_prediction(prediction: &Prediction, args: &PredictArgs, options: &Options) {
    if options.verbose {
        println!("Evaluated {} combinations", prediction.evaluated);
    }

    let components = prediction
        .significant_components()
        .into_iter()
        .map(|(i, percent)| (&prediction.combination[i], percent))
        .collect::<Vec<_>>();

    print_mix(
        &components,
        prediction.mixed_color,
        prediction.accuracy_with(options.metric.into(), args.target),
        options,
    );
}

/// Build the prediction policy from the command line options
fn prediction_policy(args: &PredictArgs, options: &Options) -> PredictPolicy {
    let mut policy = PredictPolicy::default();
    policy.first.target_accuracy = args.target_accuracy;
    policy.floor = args.floor;

    for attempt in [&mut policy.first, &mut policy.retry] {
        attempt.optimizer.strategy = options.strategy.into();
        if let Some(iterations) = options.iterations {
            attempt.max_iterations = iterations;
        }
    }

    if let Some(seed) = options.seed {
        policy = policy.with_seed(seed);
    }
    if let Some(ms) = options.timeout_ms {
        policy = policy.with_timeout(Some(Duration::from_millis(ms)));
    }

    policy
}

/// Print each component of a mix with its percentage, followed by the mixed color and its accuracy
fn print_mix(
    components: &[(&ReferenceColor, f64)],
    mixed: RgbColor,
    accuracy: f64,
    options: &Options,
) {
    for &(color, percent) in components {
        // the catalog validated every hex value
        let formatted = color
            .srgb()
            .map_or_else(|_| color.hex.clone(), |srgb| format_color(srgb, options));
        println!("{percent:>5.1}% {formatted} {}", color.name);
    }

    println!("Mixed: {}", format_color(mixed, options));

    let metric = match AccuracyMetric::from(options.metric) {
        AccuracyMetric::WeightedRgb => "weighted RGB",
        AccuracyMetric::DeltaE => "CIEDE2000",
    };
    println!("Accuracy: {accuracy:.1}% ({metric})");
}

/// Format and colorize a color based off the provided options
fn format_color(color: RgbColor, options: &Options) -> String {
    let text = match options.output {
        FormatOutput::Hex | FormatOutput::Swatch => paintmix::rgb_to_hex(Srgb::new(
            f64::from(color.red),
            f64::from(color.green),
            f64::from(color.blue),
        )),
        FormatOutput::Rgb => format!("({},{},{})", color.red, color.green, color.blue),
    };

    match (options.output, options.colorize) {
        (FormatOutput::Swatch, _) => swatch(&text, color),
        (_, Some(ColorizeOutput::Fg)) => text.truecolor(color.red, color.green, color.blue).to_string(),
        (_, Some(ColorizeOutput::Bg)) => text.on_truecolor(color.red, color.green, color.blue).to_string(),
        (_, None) => text,
    }
}

/// Draw `text` on a true color background, picking a readable text color
fn swatch(text: &str, color: RgbColor) -> String {
    let label = if paintmix::is_dark(color) {
        text.white()
    } else {
        text.black()
    };

    format!(" {label} ")
        .on_truecolor(color.red, color.green, color.blue)
        .to_string()
}
