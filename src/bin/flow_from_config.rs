use brox_flow::config::flow::load_config;
use brox_flow::image::io::{load_grayscale_image, save_flow_magnitude, write_json_file};
use brox_flow::FlowEstimator;
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path)).map_err(|e| e.to_string())?;

    let a = load_grayscale_image(&config.image1).map_err(|e| e.to_string())?;
    let b = load_grayscale_image(&config.image2).map_err(|e| e.to_string())?;
    let estimator = FlowEstimator::new(config.params).map_err(|e| e.to_string())?;
    let report = estimator
        .process(&a.as_view(), &b.as_view())
        .map_err(|e| e.to_string())?;

    write_json_file(&config.output.report_json, &report).map_err(|e| e.to_string())?;
    if let Some(path) = &config.output.magnitude_image {
        save_flow_magnitude(&report.flow, path).map_err(|e| e.to_string())?;
    }

    println!(
        "Processed {}x{} pair in {:.2} ms; mean flow ({:.3}, {:.3}); report written to {}",
        a.width(),
        a.height(),
        report.total_ms,
        report.stats.mean[0],
        report.stats.mean[1],
        config.output.report_json.display()
    );
    if let Some(path) = &config.output.magnitude_image {
        println!("Flow magnitude saved to {}", path.display());
    }
    Ok(())
}

fn usage() -> String {
    "Usage: flow_from_config <config.json>".to_string()
}
