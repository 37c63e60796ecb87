//! Inner solver of a pyramid level.
//!
//! - [`penalty`]: robust `Ψ` / `Ψ'` used by both energy terms.
//! - [`terms`]: per-pixel data and smoothness weights.
//! - [`sor`]: the relaxation sweep with its weighting and boundary variants.

pub mod penalty;
pub mod sor;
pub mod terms;

pub use penalty::{l1, l1_dot, EPSILON};
pub use sor::{BoundaryRule, Conductances, Relaxation, SmoothnessWeighting, SweepStats};
pub use terms::{data_term, smoothness_term};
