mod common;

use brox_flow::flow::FlowStats;
use brox_flow::image::ImageU8;
use brox_flow::{Flow, FlowEstimator, FlowField, FlowParams};
use common::synthetic_image::{shifted_pair, shifted_pair_u8};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn shift_params() -> FlowParams {
    FlowParams::default()
        .with_alpha(10.0)
        .with_omega(1.95)
        .with_sigma(1.5)
        .with_gamma(0.5)
        .with_max_iter(50)
        .with_max_level(2)
        .with_wrap_factor(0.5)
}

/// Statistics over the central 24×24 window of a 32×32 field.
fn central(flow: &FlowField) -> FlowStats {
    FlowStats::of_region(flow, 4, 4, 24, 24)
}

#[test]
fn horizontal_shift_of_two_pixels_is_recovered() {
    init_logger();
    let (i1, i2) = shifted_pair(32, 32, 2.0, 0.0);
    let report = FlowEstimator::new(shift_params())
        .unwrap()
        .process(&i1, &i2)
        .unwrap();

    assert_eq!((report.flow.w, report.flow.h), (32, 32));
    assert_eq!(report.levels.len(), 3);
    assert_eq!(report.clamped_denominators(), 0);
    let stats = central(&report.flow);
    assert!(
        (stats.mean[0] - 2.0).abs() < 0.3,
        "mean du {:.3} too far from 2",
        stats.mean[0]
    );
    assert!(stats.mean[1].abs() < 0.3, "mean dv {:.3} not near 0", stats.mean[1]);
    assert!(stats.std_dev[0] < 0.3, "du std-dev {:.3}", stats.std_dev[0]);
    assert!(report
        .flow
        .data
        .iter()
        .all(|f| f.x.is_finite() && f.y.is_finite()));
}

#[test]
fn eight_bit_frames_are_accepted_in_native_scale() {
    init_logger();
    let (a, b) = shifted_pair_u8(32, 32, 2.0, 0.0);
    let estimator = FlowEstimator::new(shift_params()).unwrap();
    let flow = estimator
        .compute(&ImageU8::packed(32, 32, &a), &ImageU8::packed(32, 32, &b))
        .unwrap();
    let stats = central(&flow);
    assert!(
        (stats.mean[0] - 2.0).abs() < 0.4,
        "mean du {:.3} from 8-bit input",
        stats.mean[0]
    );
    assert!(stats.mean[1].abs() < 0.4, "mean dv {:.3}", stats.mean[1]);
}

#[test]
fn exact_initial_flow_is_kept() {
    init_logger();
    let (i1, i2) = shifted_pair(32, 32, 2.0, 0.0);
    let params = shift_params().with_max_level(0).with_max_iter(20);
    let initial = FlowField::filled(32, 32, Flow::new(2.0, 0.0));
    let report = FlowEstimator::new(params)
        .unwrap()
        .process_with_initial(&i1, &i2, Some(&initial))
        .unwrap();
    assert!(report.input.used_initial_flow);
    let stats = central(&report.flow);
    assert!(
        (stats.mean[0] - 2.0).abs() < 0.1,
        "initial flow drifted to {:.3}",
        stats.mean[0]
    );
    assert!(stats.mean[1].abs() < 0.1);
}

#[test]
fn report_serializes_without_the_field() {
    let (i1, i2) = shifted_pair(16, 16, 1.0, 0.0);
    let params = FlowParams::default().with_max_level(1).with_max_iter(2);
    let report = FlowEstimator::new(params).unwrap().process(&i1, &i2).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("flow").is_none());
    assert_eq!(json["levels"].as_array().map(|l| l.len()), Some(2));
    assert!(json["levels"][0].get("clampedDenominators").is_some());
    assert!(json["timings"]["stages"].is_array());
}
