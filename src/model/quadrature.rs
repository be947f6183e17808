//! Adaptive recursive Gauss-Legendre quadrature.

use std::sync::OnceLock;

use gauss_quad::GaussLegendre;

/// Points in the base rule applied to every subinterval.
pub const BASE_RULE_POINTS: usize = 15;

/// Relative part of the subdivision stopping rule.
const RELATIVE_TOLERANCE: f64 = 1e-10;

/// Absolute tolerance at the top level of the fracture-kernel integrals.
pub const DEFAULT_TOLERANCE: f64 = 1e-5;

/// Subdivision depth limit of the fracture-kernel integrals.
pub const DEFAULT_MAX_DEPTH: usize = 10;

fn base_rule() -> Option<&'static GaussLegendre> {
    static RULE: OnceLock<Option<GaussLegendre>> = OnceLock::new();
    RULE.get_or_init(|| GaussLegendre::new(BASE_RULE_POINTS).ok()).as_ref()
}

/// One application of the 15-point Gauss-Legendre rule on `[a, b]`.
///
/// NaN if the rule could not be built, so that callers treat the sample like
/// any other non-finite Laplace value.
pub fn gauss15<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64) -> f64 {
    match base_rule() {
        Some(rule) => rule.integrate(a, b, |x| f(x)),
        None => f64::NAN,
    }
}

/// Integrate `f` over `[a, b]` by recursive bisection.
///
/// An interval is accepted when the single-rule estimate and the sum over its
/// two halves agree to `1e-10·|halves| + tolerance`, or when `max_depth`
/// levels have been used. Each level halves the absolute tolerance.
///
/// # Arguments
///
/// * `f` - Integrand
/// * `a`, `b` - Integration limits
/// * `tolerance` - Absolute tolerance at the top level
/// * `max_depth` - Maximum number of bisection levels
pub fn integrate<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64, tolerance: f64, max_depth: usize) -> f64 {
    let whole = gauss15(f, a, b);
    refine(f, a, b, whole, tolerance, 0, max_depth)
}

fn refine<F: Fn(f64) -> f64>(
    f: &F,
    a: f64,
    b: f64,
    whole: f64,
    tolerance: f64,
    depth: usize,
    max_depth: usize,
) -> f64 {
    let mid = 0.5 * (a + b);
    let left = gauss15(f, a, mid);
    let right = gauss15(f, mid, b);
    let halves = left + right;

    if depth >= max_depth || (whole - halves).abs() < RELATIVE_TOLERANCE * halves.abs() + tolerance {
        return halves;
    }
    refine(f, a, mid, left, tolerance / 2.0, depth + 1, max_depth)
        + refine(f, mid, b, right, tolerance / 2.0, depth + 1, max_depth)
}
