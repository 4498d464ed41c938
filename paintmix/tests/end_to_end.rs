use approx::assert_abs_diff_eq;
use paintmix::{
	hex_to_rgb, optimize_ratios, predict_best_subset, predict_mix, AccuracyMetric, Catalog, OptimizeOptions,
	PredictPolicy, PredictionError, SubsetOptions,
};

const CATALOG: &str = r##"[
	{ "name": "Titanium White", "hex": "#FFFFFF", "rgb": "rgb(255, 255, 255)" },
	{ "name": "Mars Black", "hex": "#000000", "rgb": "rgb(0, 0, 0)" },
	{ "name": "Burnt Umber", "hex": "#8A3324", "rgb": "rgb(138, 51, 36)" },
	{ "name": "Raw Umber", "hex": "#826644", "rgb": "rgb(130, 102, 68)" },
	{ "name": "Yellow Ochre", "hex": "#CB9D06", "rgb": "rgb(203, 157, 6)" },
	{ "name": "Sepia", "hex": "#704214", "rgb": "rgb(112, 66, 20)" }
]"##;

fn catalog() -> Catalog {
	Catalog::from_json(CATALOG).expect("valid catalog")
}

#[test]
fn mid_gray_from_white_and_black() {
	let favourites = catalog().favourites(&["Titanium White", "Mars Black"]).expect("known names");
	let target = hex_to_rgb("#808080").expect("valid hex");
	let options = SubsetOptions::default().with_optimizer(OptimizeOptions::default().with_seed(42));

	let prediction = predict_best_subset(target, &favourites, &options).expect("two favourites");

	assert!(prediction.accuracy >= 90.0, "{prediction:?}");
	assert_eq!(prediction.combination.len(), 2);
	assert_abs_diff_eq!(prediction.ratios[0], 0.5, epsilon = 0.05);
	assert_abs_diff_eq!(prediction.ratios[1], 0.5, epsilon = 0.05);
	assert_abs_diff_eq!(prediction.ratios.iter().sum::<f64>(), 1.0, epsilon = 1e-6);
}

#[test]
fn exact_match_from_a_single_color() {
	let colors = catalog().select(&["Burnt Umber"]).expect("known name");
	let target = hex_to_rgb("#8A3324").expect("valid hex");

	let result = optimize_ratios(target, &colors, &OptimizeOptions::default().with_seed(1)).expect("one color");

	assert_abs_diff_eq!(result.accuracy, 100.0);
	assert_abs_diff_eq!(result.accuracy_with(AccuracyMetric::DeltaE, target), 100.0);
	assert_eq!(result.significant_components(), [(0, 100.0)]);
}

#[test]
fn magenta_from_earth_tones_is_below_threshold() {
	let favourites = catalog()
		.favourites(&["Burnt Umber", "Raw Umber", "Yellow Ochre", "Sepia"])
		.expect("known names");
	let target = hex_to_rgb("#FF00FF").expect("valid hex");

	let options = SubsetOptions::default().with_optimizer(OptimizeOptions::default().with_seed(5));
	let prediction = predict_best_subset(target, &favourites, &SubsetOptions {
		max_iterations: 50,
		..options
	})
	.expect("search completes");
	assert!(prediction.accuracy < 50.0, "{prediction:?}");

	let mut policy = PredictPolicy::default().with_timeout(None).with_seed(5);
	policy.first.max_iterations = 50;
	policy.retry.max_iterations = 50;

	match predict_mix(target, &favourites, &policy) {
		Err(PredictionError::BelowAccuracyThreshold { best, floor }) => {
			assert_abs_diff_eq!(floor, 50.0);
			assert!(best.accuracy < 50.0);
		},
		other => panic!("expected a below threshold outcome, got {other:?}"),
	}
}

#[test]
fn lab_strategy_end_to_end() {
	let colors = catalog().select(&["Titanium White", "Mars Black"]).expect("known names");
	let palette = colors.iter().map(|color| color.srgb().expect("valid hex")).collect::<Vec<_>>();
	let target = hex_to_rgb("#777777").expect("valid hex");
	let options = OptimizeOptions::default()
		.with_seed(9)
		.with_strategy(paintmix::MixingStrategy::Lab);

	let result = optimize_ratios(target, &colors, &options).expect("two colors");

	assert!(result.accuracy >= 80.0);
	assert_eq!(paintmix::mixed_color(&palette, &result.ratios, options.strategy), result.mixed_color);
}
