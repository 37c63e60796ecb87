//! Differentiable approximation of the L1 norm used by both energy terms.
//!
//! `Ψ(s) = sqrt(s + ε)` acts on squared magnitudes; `Ψ'(s)` is the weight
//! that down-weights large residuals (occlusions, motion boundaries).
//! Negative inputs come from cancellation and are treated as zero.

/// Regulariser keeping `Ψ'` finite at `s = 0`.
pub const EPSILON: f64 = 1e-3;

#[inline]
pub fn l1(s: f64) -> f64 {
    (s.max(0.0) + EPSILON).sqrt()
}

#[inline]
pub fn l1_dot(s: f64) -> f64 {
    1.0 / (2.0 * (s.max(0.0) + EPSILON).sqrt())
}
