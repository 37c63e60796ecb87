//! Per-pixel robust weights of the two energy terms.
//!
//! Both evaluators are pure, pixel-independent passes over the padded level
//! grid and are recomputed once per relaxation sweep.
use super::penalty::l1_dot;
use crate::error::Result;
use crate::flow::{Flow, FlowField};
use crate::image::grid::ensure_same_dims;
use crate::image::ImageF64;
use crate::tensor::{Tensor, TensorField};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// `Ψ'` of the linearised data residual `[du dv 1] J [du dv 1]ᵀ` per pixel.
pub fn data_term(partial: &FlowField, tensor: &TensorField) -> Result<ImageF64> {
    ensure_same_dims("data term tensor", partial, tensor)?;
    let mut out = ImageF64::new(partial.w, partial.h);
    let eval = |(out, (p, t)): (&mut f64, (&Flow, &Tensor))| {
        *out = l1_dot(t.residual(p.x, p.y));
    };
    #[cfg(feature = "parallel")]
    {
        out.data
            .par_iter_mut()
            .zip(partial.data.par_iter().zip(tensor.data.par_iter()))
            .for_each(eval);
    }
    #[cfg(not(feature = "parallel"))]
    {
        out.data
            .iter_mut()
            .zip(partial.data.iter().zip(tensor.data.iter()))
            .for_each(eval);
    }
    Ok(out)
}

/// `Ψ'(|∇u|² + |∇v|²)` of the total flow `flow + partial` per pixel.
///
/// Derivatives are central differences `[-1, 0, 1] / (2h)` with replicate
/// borders at the edge of the image proper: with a `border`-wide padding
/// ring, neighbour indices are clamped to the unpadded interior so the zero
/// ring does not read as a flow discontinuity.
pub fn smoothness_term(
    flow: &FlowField,
    partial: &FlowField,
    hx: f64,
    hy: f64,
    border: usize,
) -> Result<ImageF64> {
    ensure_same_dims("smoothness increment", flow, partial)?;
    let (w, h) = (flow.w, flow.h);
    let mut out = ImageF64::new(w, h);
    if w <= 2 * border || h <= 2 * border {
        return Ok(out);
    }
    let (x_lo, x_hi) = (border, w - 1 - border);
    let (y_lo, y_hi) = (border, h - 1 - border);
    let total = |x: usize, y: usize| {
        let i = y * w + x;
        flow.data[i] + partial.data[i]
    };
    let (nx, ny) = (1.0 / (2.0 * hx), 1.0 / (2.0 * hy));
    for y in 0..h {
        let yc = y.clamp(y_lo, y_hi);
        let ym = yc.saturating_sub(1).max(y_lo);
        let yp = (yc + 1).min(y_hi);
        for x in 0..w {
            let xc = x.clamp(x_lo, x_hi);
            let xm = xc.saturating_sub(1).max(x_lo);
            let xp = (xc + 1).min(x_hi);
            let dx = (total(xp, yc) - total(xm, yc)) * nx;
            let dy = (total(xc, yp) - total(xc, ym)) * ny;
            out.set(x, y, l1_dot(dx.norm_squared() + dy.norm_squared()));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::penalty::EPSILON;

    #[test]
    fn data_term_weights_residual() {
        let t = Tensor::new(1.0, 1.0, 0.0, 0.0, 0.0, 0.0);
        let tensor = TensorField::filled(3, 3, t);
        let mut partial = FlowField::new(3, 3);
        partial.set(1, 1, Flow::new(3.0, 4.0));
        let d = data_term(&partial, &tensor).unwrap();
        assert!((d.get(1, 1) - l1_dot(25.0)).abs() < 1e-15);
        assert!((d.get(0, 0) - 0.5 / EPSILON.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn smoothness_sees_combined_flow() {
        // u = x split between total and increment; gradient is 1 everywhere.
        let flow = FlowField::from_fn(5, 5, |x, _| Flow::new(0.5 * x as f64, 0.0));
        let partial = FlowField::from_fn(5, 5, |x, _| Flow::new(0.5 * x as f64, 0.0));
        let s = smoothness_term(&flow, &partial, 1.0, 1.0, 0).unwrap();
        assert!((s.get(2, 2) - l1_dot(1.0)).abs() < 1e-12);
        // replicate border halves the one-sided difference
        assert!((s.get(0, 2) - l1_dot(0.25)).abs() < 1e-12);
    }

    #[test]
    fn padding_ring_does_not_create_gradient() {
        let flow = FlowField::filled(4, 4, Flow::new(2.0, 1.0)).padded(1);
        let partial = FlowField::new(6, 6);
        let s = smoothness_term(&flow, &partial, 1.0, 1.0, 1).unwrap();
        let flat = l1_dot(0.0);
        for &v in &s.data {
            assert!((v - flat).abs() < 1e-12);
        }
    }
}
