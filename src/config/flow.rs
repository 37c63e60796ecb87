use crate::error::{FlowError, Result};
use crate::estimator::FlowParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// JSON config of the `flow_from_config` tool.
///
/// ```json
/// {
///   "image1": "frames/a.png",
///   "image2": "frames/b.png",
///   "params": { "alpha": 10.0, "max_level": 3 },
///   "output": { "report_json": "out/report.json", "magnitude_image": "out/mag.png" }
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct FlowToolConfig {
    pub image1: PathBuf,
    pub image2: PathBuf,
    #[serde(default)]
    pub params: FlowParams,
    pub output: FlowOutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct FlowOutputConfig {
    pub report_json: PathBuf,
    /// Optional PNG of the flow magnitude.
    #[serde(default)]
    pub magnitude_image: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<FlowToolConfig> {
    let data = fs::read_to_string(path).map_err(|source| FlowError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_fall_back_to_defaults() {
        let cfg: FlowToolConfig = serde_json::from_str(
            r#"{
                "image1": "a.png",
                "image2": "b.png",
                "params": { "alpha": 10.0, "boundary": "far_padding" },
                "output": { "report_json": "out/report.json" }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.params.alpha, 10.0);
        assert_eq!(cfg.params.max_iter, 200);
        assert_eq!(cfg.params.boundary, crate::solver::BoundaryRule::FarPadding);
        assert!(cfg.output.magnitude_image.is_none());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_config(Path::new("/nonexistent/flow.json")).unwrap_err();
        assert!(matches!(err, FlowError::Io { .. }));
    }
}
