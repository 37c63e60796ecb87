//! Parameter types configuring the flow estimator.
//!
//! [`FlowParams`] is the typed, validated configuration consumed by the
//! estimator. [`ParameterTable`] keeps the integer-encoded
//! `{name, value, div_factor, step_factor}` form used by interactive tools
//! (sliders step integers); it converts into `FlowParams` and fails if any
//! recognised parameter is missing.
//!
//! Defaults reproduce the stock parameter table. For tuning, start with
//! `alpha` (smoothness) and the pyramid depth.

use crate::error::{FlowError, Result};
use crate::pyramid::{PyramidOptions, MAX_LEVEL};
use crate::solver::{BoundaryRule, Relaxation, SmoothnessWeighting};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Estimator-wide parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowParams {
    /// Smoothness weight (>= 0).
    pub alpha: f64,
    /// SOR relaxation factor in (0, 2).
    pub omega: f64,
    /// Std-dev of the Gaussian pre-smoothing in pixels (0 disables it).
    pub sigma: f64,
    /// Blend between brightness (0) and gradient (1) constancy.
    pub gamma: f64,
    /// SOR sweeps per pyramid level (>= 1).
    pub max_iter: usize,
    /// Index of the coarsest pyramid level (0 = single level).
    pub max_level: usize,
    /// Per-level downsample ratio in (0, 1].
    pub wrap_factor: f64,
    /// Regulariser weighting used by the relaxation sweep.
    pub weighting: SmoothnessWeighting,
    /// Edge handling of the relaxation conductances.
    pub boundary: BoundaryRule,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            omega: 0.975,
            sigma: 0.15,
            gamma: 0.5,
            max_iter: 200,
            max_level: 4,
            wrap_factor: 0.5,
            weighting: SmoothnessWeighting::default(),
            boundary: BoundaryRule::default(),
        }
    }
}

impl FlowParams {
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_omega(mut self, omega: f64) -> Self {
        self.omega = omega;
        self
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_wrap_factor(mut self, wrap_factor: f64) -> Self {
        self.wrap_factor = wrap_factor;
        self
    }

    pub fn with_weighting(mut self, weighting: SmoothnessWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn with_boundary(mut self, boundary: BoundaryRule) -> Self {
        self.boundary = boundary;
        self
    }

    /// Range checks that do not depend on the input size.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return Err(FlowError::invalid(
                "alpha",
                format!("expected a finite value >= 0, got {}", self.alpha),
            ));
        }
        if !(self.omega > 0.0 && self.omega < 2.0) {
            return Err(FlowError::invalid(
                "omega",
                format!("SOR diverges outside (0, 2), got {}", self.omega),
            ));
        }
        if !(self.sigma.is_finite() && self.sigma >= 0.0) {
            return Err(FlowError::invalid(
                "sigma",
                format!("expected a finite value >= 0, got {}", self.sigma),
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(FlowError::invalid(
                "gamma",
                format!("expected a value in [0, 1], got {}", self.gamma),
            ));
        }
        if self.max_iter == 0 {
            return Err(FlowError::invalid("maxiter", "at least one sweep is required"));
        }
        if self.max_level > MAX_LEVEL {
            return Err(FlowError::invalid(
                "maxlevel",
                format!("expected at most {MAX_LEVEL}, got {}", self.max_level),
            ));
        }
        if !(self.wrap_factor > 0.0 && self.wrap_factor <= 1.0) {
            return Err(FlowError::invalid(
                "wrapfactor",
                format!("expected a value in (0, 1], got {}", self.wrap_factor),
            ));
        }
        Ok(())
    }

    pub fn pyramid_options(&self) -> PyramidOptions {
        PyramidOptions::new(self.max_level, self.wrap_factor)
    }

    /// Relaxation operator for a level with grid spacing `(hx, hy)`.
    pub fn relaxation(&self, hx: f64, hy: f64) -> Relaxation {
        Relaxation {
            alpha: self.alpha,
            omega: self.omega,
            hx,
            hy,
            weighting: self.weighting,
            boundary: self.boundary,
        }
    }
}

/// Integer-encoded parameter; the real value is `value / div_factor`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: i64,
    pub div_factor: i64,
    pub step_factor: i64,
}

impl Parameter {
    pub fn new(name: &str, value: i64, div_factor: i64, step_factor: i64) -> Self {
        Self {
            name: name.to_string(),
            value,
            div_factor,
            step_factor,
        }
    }

    /// `value / div_factor`
    pub fn real(&self) -> Result<f64> {
        if self.div_factor == 0 {
            return Err(FlowError::InvalidParameter {
                name: static_name(&self.name),
                reason: "div_factor must not be zero".to_string(),
            });
        }
        Ok(self.value as f64 / self.div_factor as f64)
    }

    /// Raw integer value, for count-like parameters.
    pub fn count(&self) -> Result<usize> {
        usize::try_from(self.value).map_err(|_| FlowError::InvalidParameter {
            name: static_name(&self.name),
            reason: format!("expected a non-negative count, got {}", self.value),
        })
    }
}

/// Names every table must provide.
pub const PARAMETER_NAMES: [&str; 7] = [
    "alpha",
    "omega",
    "sigma",
    "gamma",
    "maxiter",
    "maxlevel",
    "wrapfactor",
];

fn static_name(name: &str) -> &'static str {
    PARAMETER_NAMES
        .iter()
        .copied()
        .find(|n| *n == name)
        .unwrap_or("unknown")
}

/// Parameters keyed by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterTable {
    entries: HashMap<String, Parameter>,
}

impl ParameterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock table.
    pub fn defaults() -> Self {
        let mut table = Self::new();
        table.insert(Parameter::new("alpha", 100, 1000, 1));
        table.insert(Parameter::new("omega", 195, 200, 100));
        table.insert(Parameter::new("sigma", 15, 100, 10));
        table.insert(Parameter::new("gamma", 500, 1000, 1000));
        table.insert(Parameter::new("maxiter", 200, 2000, 1));
        table.insert(Parameter::new("maxlevel", 4, 10, 1));
        table.insert(Parameter::new("wrapfactor", 5, 10, 10));
        table
    }

    pub fn insert(&mut self, parameter: Parameter) -> Option<Parameter> {
        self.entries.insert(parameter.name.clone(), parameter)
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.entries.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Parameter> {
        self.entries.remove(name)
    }

    fn require(&self, name: &str) -> Result<&Parameter> {
        self.get(name)
            .ok_or_else(|| FlowError::MissingParameter(name.to_string()))
    }
}

impl TryFrom<&ParameterTable> for FlowParams {
    type Error = FlowError;

    /// Convert and validate; the strategy enums take their defaults.
    fn try_from(table: &ParameterTable) -> Result<Self> {
        for name in PARAMETER_NAMES {
            table.require(name)?;
        }
        let params = FlowParams {
            alpha: table.require("alpha")?.real()?,
            omega: table.require("omega")?.real()?,
            sigma: table.require("sigma")?.real()?,
            gamma: table.require("gamma")?.real()?,
            max_iter: table.require("maxiter")?.count()?,
            max_level: table.require("maxlevel")?.count()?,
            wrap_factor: table.require("wrapfactor")?.real()?,
            ..FlowParams::default()
        };
        params.validate()?;
        Ok(params)
    }
}
