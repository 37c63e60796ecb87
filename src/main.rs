use brox_flow::image::ImageF64;
use brox_flow::{FlowEstimator, FlowParams};
use std::f64::consts::TAU;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    // Demo: a sinusoidal texture shifted right by 2 px.
    let (w, h) = (64usize, 48usize);
    let texture = |x: f64, y: f64| {
        128.0 + 50.0 * (TAU * x / 16.0).sin() + 50.0 * (TAU * y / 13.0).sin()
    };
    let i1 = ImageF64::from_fn(w, h, |x, y| texture(x as f64, y as f64));
    let i2 = ImageF64::from_fn(w, h, |x, y| texture(x as f64 - 2.0, y as f64));

    let params = FlowParams::default()
        .with_alpha(10.0)
        .with_omega(1.95)
        .with_sigma(1.5)
        .with_max_iter(50)
        .with_max_level(2);
    let estimator = FlowEstimator::new(params).map_err(|e| e.to_string())?;
    let report = estimator.process(&i1, &i2).map_err(|e| e.to_string())?;
    println!(
        "mean flow=({:.3}, {:.3}) std=({:.3}, {:.3}) levels={} total_ms={:.3}",
        report.stats.mean[0],
        report.stats.mean[1],
        report.stats.std_dev[0],
        report.stats.std_dev[1],
        report.levels.len(),
        report.total_ms
    );
    Ok(())
}
