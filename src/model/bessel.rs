//! Modified Bessel functions of orders 0 and 1.
//!
//! Polynomial approximations from Abramowitz & Stegun (9.8.1-9.8.8), accurate
//! to roughly 1e-7 relative. The exponentially scaled variants
//! `Ĩν(x) = Iν(x)·e^{-|x|}` never overflow and are what the composite-zone
//! kernel uses for large arguments.

/// Split between the series and asymptotic branches of `I0`/`I1`.
const I_BRANCH: f64 = 3.75;

/// Split between the series and asymptotic branches of `K0`/`K1`.
const K_BRANCH: f64 = 2.0;

/// Modified Bessel function of the first kind, order 0.
pub fn bessel_i0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < I_BRANCH {
        let y = (x / I_BRANCH).powi(2);
        1.0 + y
            * (3.5156229
                + y * (3.0899424
                    + y * (1.2067492 + y * (0.2659732 + y * (0.360768e-1 + y * 0.45813e-2)))))
    } else {
        ax.exp() * bessel_i0_scaled(ax)
    }
}

/// Exponentially scaled `I0(x)·e^{-|x|}`.
pub fn bessel_i0_scaled(x: f64) -> f64 {
    let ax = x.abs();
    if ax < I_BRANCH {
        return bessel_i0(ax) * (-ax).exp();
    }
    let y = I_BRANCH / ax;
    let poly = 0.39894228
        + y * (0.1328592e-1
            + y * (0.225319e-2
                + y * (-0.157565e-2
                    + y * (0.916281e-2
                        + y * (-0.2057706e-1
                            + y * (0.2635537e-1 + y * (-0.1647633e-1 + y * 0.392377e-2)))))));
    poly / ax.sqrt()
}

/// Modified Bessel function of the first kind, order 1.
pub fn bessel_i1(x: f64) -> f64 {
    let ax = x.abs();
    let value = if ax < I_BRANCH {
        let y = (x / I_BRANCH).powi(2);
        ax * (0.5
            + y * (0.87890594
                + y * (0.51498869
                    + y * (0.15084934 + y * (0.2658733e-1 + y * (0.301532e-2 + y * 0.32411e-3))))))
    } else {
        ax.exp() * bessel_i1_scaled(ax)
    };
    if x < 0.0 {
        -value
    } else {
        value
    }
}

/// Exponentially scaled `I1(x)·e^{-|x|}`.
pub fn bessel_i1_scaled(x: f64) -> f64 {
    let ax = x.abs();
    let value = if ax < I_BRANCH {
        bessel_i1(ax) * (-ax).exp()
    } else {
        let y = I_BRANCH / ax;
        let tail = 0.2282967e-1 + y * (-0.2895312e-1 + y * (0.1787654e-1 - y * 0.420059e-2));
        let poly = 0.39894228
            + y * (-0.3988024e-1
                + y * (-0.362018e-2 + y * (0.163801e-2 + y * (-0.1031555e-1 + y * tail))));
        poly / ax.sqrt()
    };
    if x < 0.0 {
        -value
    } else {
        value
    }
}

/// Modified Bessel function of the second kind, order 0. Infinite for `x <= 0`.
pub fn bessel_k0(x: f64) -> f64 {
    if x <= 0.0 {
        return f64::INFINITY;
    }
    if x <= K_BRANCH {
        let y = x * x / 4.0;
        -(x / 2.0).ln() * bessel_i0(x)
            + (-0.57721566
                + y * (0.42278420
                    + y * (0.23069756
                        + y * (0.3488590e-1 + y * (0.262698e-2 + y * (0.10750e-3 + y * 0.74e-5))))))
    } else {
        let y = K_BRANCH / x;
        ((-x).exp() / x.sqrt())
            * (1.25331414
                + y * (-0.7832358e-1
                    + y * (0.2189568e-1
                        + y * (-0.1062446e-1
                            + y * (0.587872e-2 + y * (-0.251540e-2 + y * 0.53208e-3))))))
    }
}

/// Modified Bessel function of the second kind, order 1. Infinite for `x <= 0`.
pub fn bessel_k1(x: f64) -> f64 {
    if x <= 0.0 {
        return f64::INFINITY;
    }
    if x <= K_BRANCH {
        let y = x * x / 4.0;
        (x / 2.0).ln() * bessel_i1(x)
            + (1.0 / x)
                * (1.0
                    + y * (0.15443144
                        + y * (-0.67278579
                            + y * (-0.18156897
                                + y * (-0.1919402e-1 + y * (-0.110404e-2 + y * (-0.4686e-4)))))))
    } else {
        let y = K_BRANCH / x;
        ((-x).exp() / x.sqrt())
            * (1.25331414
                + y * (0.23498619
                    + y * (-0.3655620e-1
                        + y * (0.1504268e-1
                            + y * (-0.780353e-2 + y * (0.325614e-2 + y * (-0.68245e-3)))))))
    }
}
