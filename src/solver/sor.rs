//! One successive-over-relaxation sweep of the incremental flow.
//!
//! The sweep visits the interior of a padded level grid in row-major order
//! and updates `du` then `dv` per pixel, each from the fixed-point
//! linearisation of the Euler–Lagrange equations:
//!
//! ```text
//! du* = [ Ψ'_D·(J21·dv + J13) − Σ c_n·(u_n) + C·f_u ] / ( −Ψ'_D·J11 − C )
//! du  = (1 − ω)·du + ω·du*
//! ```
//!
//! with `u_n = f_u + p_u` at the four neighbours, `c_n` the directional
//! conductances and `C = Σ c_n`. `dv` is solved the same way from the freshly
//! updated `du`. Cells already visited in the current sweep are read with
//! their new values (Gauss–Seidel ordering), which makes the sweep
//! inherently sequential.
use super::terms::{data_term, smoothness_term};
use crate::error::Result;
use crate::flow::FlowField;
use crate::image::grid::ensure_same_dims;
use crate::image::ImageF64;
use crate::tensor::TensorField;
use serde::{Deserialize, Serialize};

/// Denominator magnitude below which the update is clamped.
pub const MIN_DENOMINATOR: f64 = 1e-9;

/// How the regulariser weights the four neighbour couplings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothnessWeighting {
    /// Isotropic quadratic regulariser: conductances are `alpha / h²`.
    #[default]
    Uniform,
    /// Robust regulariser: each conductance is scaled by the mean of the
    /// smoothness weights `Ψ'_S` of the two cells it connects.
    GradientWeighted,
}

/// Which relaxation cells lose their coupling at the image edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryRule {
    /// No coupling across any of the four image edges (natural boundary).
    #[default]
    ZeroFlux,
    /// Left/top edges decouple; right/bottom edges keep coupling to the zero
    /// padding ring, pulling the increment there towards zero.
    FarPadding,
}

/// Conductances towards the left, right, upper and lower neighbours.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Conductances {
    pub xm: f64,
    pub xp: f64,
    pub ym: f64,
    pub yp: f64,
}

impl Conductances {
    #[inline]
    pub fn sum(&self) -> f64 {
        self.xm + self.xp + self.ym + self.yp
    }
}

/// Statistics of a single sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SweepStats {
    /// Cells whose denominator was clamped to `-MIN_DENOMINATOR`.
    pub clamped: usize,
    /// Largest change of an increment vector during the sweep.
    pub max_update: f64,
}

/// Relaxation operator for one pyramid level.
#[derive(Clone, Copy, Debug)]
pub struct Relaxation {
    pub alpha: f64,
    pub omega: f64,
    pub hx: f64,
    pub hy: f64,
    pub weighting: SmoothnessWeighting,
    pub boundary: BoundaryRule,
}

impl Relaxation {
    /// Base conductances of interior cell `(i, j)` (row, column) of a padded
    /// `rows × cols` grid.
    pub fn conductances(&self, i: usize, j: usize, rows: usize, cols: usize) -> Conductances {
        let ax = self.alpha / (self.hx * self.hx);
        let ay = self.alpha / (self.hy * self.hy);
        let (far_x, far_y) = match self.boundary {
            BoundaryRule::ZeroFlux => (cols.saturating_sub(2), rows.saturating_sub(2)),
            BoundaryRule::FarPadding => (cols.saturating_sub(1), rows.saturating_sub(1)),
        };
        Conductances {
            xm: if j > 1 { ax } else { 0.0 },
            xp: if j < far_x { ax } else { 0.0 },
            ym: if i > 1 { ay } else { 0.0 },
            yp: if i < far_y { ay } else { 0.0 },
        }
    }

    /// Run one sweep, updating `partial` in place. `tensor`, `flow` and
    /// `partial` must share the padded grid dimensions.
    pub fn sweep(
        &self,
        tensor: &TensorField,
        flow: &FlowField,
        partial: &mut FlowField,
    ) -> Result<SweepStats> {
        ensure_same_dims("sweep tensor", flow, tensor)?;
        ensure_same_dims("sweep increment", flow, partial)?;
        let (cols, rows) = (partial.w, partial.h);
        let mut stats = SweepStats::default();
        if rows < 3 || cols < 3 {
            return Ok(stats);
        }

        let data = data_term(partial, tensor)?;
        let smooth = match self.weighting {
            SmoothnessWeighting::Uniform => None,
            SmoothnessWeighting::GradientWeighted => {
                Some(smoothness_term(flow, partial, self.hx, self.hy, 1)?)
            }
        };

        let omega = self.omega;
        for i in 1..rows - 1 {
            for j in 1..cols - 1 {
                let idx = i * cols + j;
                let (left, right, up, down) = (idx - 1, idx + 1, idx - cols, idx + cols);
                let c = weighted(
                    self.conductances(i, j, rows, cols),
                    smooth.as_ref(),
                    idx,
                    [left, right, up, down],
                );
                let c_sum = c.sum();
                let t = tensor.data[idx];
                let f = flow.data[idx];
                let psi = data.data[idx];
                let old = partial.data[idx];

                let around = |k: usize| flow.data[k] + partial.data[k];
                let neighbours = around(left) * c.xm
                    + around(right) * c.xp
                    + around(up) * c.ym
                    + around(down) * c.yp;

                let (den_u, clamped_u) = guard(-psi * t.j11 - c_sum);
                let du_star = (psi * (t.j21 * old.y + t.j13) - neighbours.x + c_sum * f.x) / den_u;
                let du = (1.0 - omega) * old.x + omega * du_star;

                let (den_v, clamped_v) = guard(-psi * t.j22 - c_sum);
                let dv_star = (psi * (t.j21 * du + t.j23) - neighbours.y + c_sum * f.y) / den_v;
                let dv = (1.0 - omega) * old.y + omega * dv_star;

                stats.clamped += clamped_u as usize + clamped_v as usize;
                let cell = &mut partial.data[idx];
                cell.x = du;
                cell.y = dv;
                stats.max_update = stats.max_update.max((*cell - old).norm());
            }
        }
        Ok(stats)
    }
}

/// Scale base conductances by the averaged smoothness weight of each link.
#[inline]
fn weighted(
    base: Conductances,
    smooth: Option<&ImageF64>,
    idx: usize,
    [left, right, up, down]: [usize; 4],
) -> Conductances {
    let Some(s) = smooth else {
        return base;
    };
    let centre = s.data[idx];
    let link = |k: usize| 0.5 * (centre + s.data[k]);
    Conductances {
        xm: base.xm * link(left),
        xp: base.xp * link(right),
        ym: base.ym * link(up),
        yp: base.yp * link(down),
    }
}

/// Keep the (non-positive) denominator at least `MIN_DENOMINATOR` away from
/// zero; reports whether it had to be clamped.
#[inline]
fn guard(den: f64) -> (f64, bool) {
    if den.is_nan() || den > -MIN_DENOMINATOR {
        (-MIN_DENOMINATOR, true)
    } else {
        (den, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::Flow;
    use crate::tensor::Tensor;

    fn relaxation(boundary: BoundaryRule, weighting: SmoothnessWeighting) -> Relaxation {
        Relaxation {
            alpha: 2.0,
            omega: 1.0,
            hx: 1.0,
            hy: 0.5,
            weighting,
            boundary,
        }
    }

    #[test]
    fn near_edge_conductances_vanish_with_zero_flux() {
        let r = relaxation(BoundaryRule::ZeroFlux, SmoothnessWeighting::Uniform);
        let (rows, cols) = (5, 6);
        let first = r.conductances(1, 1, rows, cols);
        assert_eq!(first.xm, 0.0);
        assert_eq!(first.ym, 0.0);
        assert_eq!(first.xp, 2.0);
        assert_eq!(first.yp, 8.0);

        let last = r.conductances(rows - 2, cols - 2, rows, cols);
        assert_eq!(last.xp, 0.0);
        assert_eq!(last.yp, 0.0);
        assert_eq!(last.xm, 2.0);
        assert_eq!(last.ym, 8.0);

        let inner = r.conductances(2, 2, rows, cols);
        assert_eq!(inner.sum(), 2.0 + 2.0 + 8.0 + 8.0);
    }

    #[test]
    fn far_padding_keeps_right_and_bottom_coupling() {
        let r = relaxation(BoundaryRule::FarPadding, SmoothnessWeighting::Uniform);
        let (rows, cols) = (5, 6);
        let last = r.conductances(rows - 2, cols - 2, rows, cols);
        assert_eq!(last.xp, 2.0);
        assert_eq!(last.yp, 8.0);
        let first = r.conductances(1, 1, rows, cols);
        assert_eq!(first.xm, 0.0);
        assert_eq!(first.ym, 0.0);
    }

    #[test]
    fn isolated_cell_without_data_stays_finite() {
        // 1x1 interior: zero conductances and a zero tensor.
        let r = relaxation(BoundaryRule::ZeroFlux, SmoothnessWeighting::GradientWeighted);
        let tensor = TensorField::new(3, 3);
        let flow = FlowField::filled(1, 1, Flow::new(1.0, 1.0)).padded(1);
        let mut partial = FlowField::new(3, 3);
        let stats = r.sweep(&tensor, &flow, &mut partial).unwrap();
        assert_eq!(stats.clamped, 2);
        let p = partial.get(1, 1);
        assert!(p.x.is_finite() && p.y.is_finite());
        assert_eq!(p, Flow::zeros());
    }

    #[test]
    fn single_cell_solves_pointwise_data_term() {
        // |fx·du + ft|² with fx = 2, ft = -3 is minimised by du = 1.5.
        let r = relaxation(BoundaryRule::ZeroFlux, SmoothnessWeighting::Uniform);
        let t = Tensor::new(4.0, 1.0, 9.0, 0.0, -6.0, 0.0);
        let tensor = TensorField::filled(1, 1, t).padded(1);
        let flow = FlowField::new(3, 3);
        let mut partial = FlowField::new(3, 3);
        r.sweep(&tensor, &flow, &mut partial).unwrap();
        let p = partial.get(1, 1);
        assert!((p.x - 1.5).abs() < 1e-12, "du = {}", p.x);
        assert!(p.y.abs() < 1e-12);
    }

    #[test]
    fn uniform_smoothing_pulls_toward_neighbours() {
        // No data anywhere: the increment relaxes to the mean of the total
        // flow of the neighbours minus the cell's own total flow.
        let r = relaxation(BoundaryRule::ZeroFlux, SmoothnessWeighting::Uniform);
        let mut flow = FlowField::filled(3, 3, Flow::new(1.0, 0.0));
        flow.set(1, 1, Flow::new(0.0, 0.0));
        let flow = flow.padded(1);
        let tensor = TensorField::new(5, 5);
        let mut partial = FlowField::new(5, 5);
        for _ in 0..200 {
            r.sweep(&tensor, &flow, &mut partial).unwrap();
        }
        // Total flow becomes spatially constant: f + p equals one common value.
        let reference = flow.get(1, 1) + partial.get(1, 1);
        for y in 1..4 {
            for x in 1..4 {
                let total = flow.get(x, y) + partial.get(x, y);
                assert!((total - reference).norm() < 1e-6, "({x},{y}) {total:?}");
            }
        }
    }

    #[test]
    fn sor_damping_blends_old_and_new_values() {
        let mut r = relaxation(BoundaryRule::ZeroFlux, SmoothnessWeighting::Uniform);
        r.omega = 0.5;
        let t = Tensor::new(4.0, 1.0, 9.0, 0.0, -6.0, 0.0);
        let tensor = TensorField::filled(1, 1, t).padded(1);
        let flow = FlowField::new(3, 3);
        let mut partial = FlowField::new(3, 3);
        r.sweep(&tensor, &flow, &mut partial).unwrap();
        assert!((partial.get(1, 1).x - 0.75).abs() < 1e-12);
    }

    #[test]
    fn mismatched_buffers_are_rejected() {
        let r = relaxation(BoundaryRule::ZeroFlux, SmoothnessWeighting::Uniform);
        let tensor = TensorField::new(4, 4);
        let flow = FlowField::new(4, 4);
        let mut partial = FlowField::new(5, 4);
        assert!(r.sweep(&tensor, &flow, &mut partial).is_err());
    }
}
