#![doc = include_str!("../README.md")]

// Public modules
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod estimator;
pub mod flow;
pub mod image;

// Building blocks of the estimator; public for tools and custom drivers.
pub mod pyramid;
pub mod solver;
pub mod tensor;
pub mod warp;

// --- High-level re-exports -------------------------------------------------

pub use crate::error::{FlowError, Result};
pub use crate::estimator::{compute_flow_field, FlowEstimator, FlowParams, ParameterTable};
pub use crate::flow::{Flow, FlowField, FlowStats};

pub use crate::diagnostics::{FlowReport, LevelTrace};

pub use crate::solver::{BoundaryRule, SmoothnessWeighting};
pub use crate::tensor::{DerivativeTensors, Tensor, TensorField, TensorProvider};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use brox_flow::prelude::*;
///
/// # fn main() -> brox_flow::Result<()> {
/// let (w, h) = (64usize, 48usize);
/// let a = vec![0u8; w * h];
/// let b = vec![0u8; w * h];
///
/// let est = FlowEstimator::new(FlowParams::default().with_max_level(2))?;
/// let flow = est.compute(&ImageU8::packed(w, h, &a), &ImageU8::packed(w, h, &b))?;
/// println!("{}x{}", flow.w, flow.h);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{ImageF64, ImageU8};
    pub use crate::{FlowEstimator, FlowField, FlowParams, FlowReport};
}
