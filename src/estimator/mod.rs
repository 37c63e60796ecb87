//! Brox-style variational flow estimator.
//!
//! Modules
//! - [`params`]: typed parameters and the integer-encoded parameter table.
//! - `pipeline`: the coarse-to-fine [`FlowEstimator`].
//! - [`workspace`]: per-level buffers owned for the duration of one level.

pub mod params;
mod pipeline;
pub mod workspace;

pub use params::{FlowParams, Parameter, ParameterTable, PARAMETER_NAMES};
pub use pipeline::{compute_flow_field, FlowEstimator};
pub use workspace::{LevelWorkspace, RelaxSummary};
