// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Coleman-Weinberg Loop Functions
// Mirrors: src/models/ClassPotentialOrigin.cpp
// ─────────────────────────────────────────────────────────────────────
//! Scale-dependent loop functions of the one-loop effective potential
//! and of its derivatives with respect to squared masses.
//!
//! Logarithms take |m²|, so tachyonic states give a finite (real-part)
//! contribution instead of NaN.

use std::f64::consts::PI;

/// Squared masses closer than this count as equal in `f_base`.
const FBASE_DEGENERATE: f64 = 1e-5;
/// Snap threshold for zeros and degeneracies in `f_base_tri`.
const FTRI_SNAP: f64 = 1e-8;
/// Floor for the logarithm argument.
const LOG_FLOOR: f64 = 1e-200;

/// Loop functions at renormalisation scale μ.
#[derive(Debug, Clone, Copy)]
pub struct LoopFunctions {
    scale: f64,
    log_scale2: f64,
}

impl LoopFunctions {
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            log_scale2: 2.0 * scale.ln(),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// ln(|m²|/μ²); m² must be non-zero.
    #[inline]
    pub fn log_ratio(&self, m2: f64) -> f64 {
        m2.abs().ln() - self.log_scale2
    }

    /// ln(max(|m²|, 1e-200)) - ln μ². NaN maps to the floor.
    #[inline]
    pub fn fcw(&self, m2: f64) -> f64 {
        let arg = if m2.is_nan() { LOG_FLOOR } else { m2.abs().max(LOG_FLOOR) };
        arg.ln() - self.log_scale2
    }

    /// One-loop CW term m⁴/(64π²)(ln(m²/μ²) - cb), zero below `threshold`.
    #[inline]
    pub fn cw_term(&self, m2: f64, cb: f64, threshold: f64) -> f64 {
        if m2.abs() < threshold {
            return 0.0;
        }
        m2 * m2 / (64.0 * PI * PI) * (self.fcw(m2) - cb)
    }

    /// Divided difference of m² ln(m²/μ²) between two squared masses.
    pub fn f_base(&self, ma: f64, mb: f64) -> f64 {
        if ma == 0.0 && mb == 0.0 {
            return 1.0;
        }
        let log_a = if ma != 0.0 { self.log_ratio(ma) } else { 0.0 };
        if (ma - mb).abs() > FBASE_DEGENERATE {
            let log_b = if mb != 0.0 { self.log_ratio(mb) } else { 0.0 };
            if ma == 0.0 {
                log_b
            } else if mb == 0.0 {
                log_a
            } else {
                (log_a * ma - log_b * mb) / (ma - mb)
            }
        } else {
            1.0 + log_a
        }
    }

    /// Second divided difference of m² ln(m²/μ²), with the degenerate
    /// and massless limits taken analytically.
    pub fn f_base_tri(&self, ma: f64, mb: f64, mc: f64) -> f64 {
        let snap = |x: f64| if x.abs() < FTRI_SNAP { 0.0 } else { x };
        let (mut a, mut b, c) = (snap(ma), snap(mb), snap(mc));
        if (a - b).abs() < FTRI_SNAP {
            a = b;
        }
        if (a - c).abs() < FTRI_SNAP {
            a = c;
        }
        if (b - c).abs() < FTRI_SNAP {
            b = c;
        }

        let ln_mu = |x: f64| if x != 0.0 { self.log_ratio(x) } else { 0.0 };
        let (log_a, log_b, log_c) = (ln_mu(a), ln_mu(b), ln_mu(c));

        let res = match (a != 0.0, b != 0.0, c != 0.0) {
            (false, false, false) => 0.0,
            (true, false, false) => (log_a - 1.0) / a,
            (false, true, false) => (log_b - 1.0) / b,
            (false, false, true) => (log_c - 1.0) / c,
            _ if a == b && a == c => 1.0 / (2.0 * c),
            (true, true, true) if a == b => {
                (b - c + c * (c / b).abs().ln()) / (b - c).powi(2)
            }
            (true, true, true) if a == c => {
                (b * (b / c).abs().ln() - b + c) / (b - c).powi(2)
            }
            (true, true, true) if b == c => {
                (a * (a / c).abs().ln() - a + c) / (a - c).powi(2)
            }
            (true, true, false) if a == b => 1.0 / b,
            (true, false, true) if a == c => 1.0 / a,
            (false, true, true) if b == c => 1.0 / b,
            _ => {
                a * log_a / ((a - b) * (a - c))
                    + b * log_b / ((b - a) * (b - c))
                    + c * log_c / ((c - a) * (c - b))
            }
        };
        if !res.is_finite() {
            log::warn!("f_base_tri non-finite for ({a:e}, {b:e}, {c:e})");
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MU: f64 = 246.0;

    /// g(x) = x ln(x/μ²), whose divided differences the loop functions are.
    fn g(x: f64) -> f64 {
        x * (x.ln() - 2.0 * MU.ln())
    }

    #[test]
    fn test_cw_term_threshold() {
        let lf = LoopFunctions::new(MU);
        assert_eq!(lf.cw_term(5e-5, 1.5, 1e-4), 0.0);
        let m2 = 100.0_f64 * 100.0;
        let expected = m2 * m2 / (64.0 * PI * PI) * ((m2 / (MU * MU)).ln() - 1.5);
        assert!((lf.cw_term(m2, 1.5, 1e-4) - expected).abs() < 1e-9 * expected.abs());
    }

    #[test]
    fn test_fcw_floor() {
        let lf = LoopFunctions::new(MU);
        assert_eq!(lf.fcw(0.0), lf.fcw(f64::NAN));
        assert!(lf.fcw(0.0).is_finite());
        assert!((lf.fcw(-4.0) - lf.fcw(4.0)).abs() < 1e-15);
    }

    #[test]
    fn test_f_base_is_divided_difference() {
        let lf = LoopFunctions::new(MU);
        let (a, b) = (1.0e4, 3.0e4);
        let expected = (g(a) - g(b)) / (a - b);
        assert!((lf.f_base(a, b) - expected).abs() < 1e-12);
        // Degenerate limit is g'(a) = 1 + ln(a/μ²).
        assert!((lf.f_base(a, a) - (1.0 + lf.log_ratio(a))).abs() < 1e-14);
        assert_eq!(lf.f_base(0.0, 0.0), 1.0);
        assert!((lf.f_base(0.0, b) - lf.log_ratio(b)).abs() < 1e-14);
    }

    #[test]
    fn test_f_base_tri_generic_matches_second_divided_difference() {
        let lf = LoopFunctions::new(MU);
        let (a, b, c) = (1.0e4, 2.5e4, 7.0e4);
        let ab = (g(a) - g(b)) / (a - b);
        let bc = (g(b) - g(c)) / (b - c);
        let expected = (ab - bc) / (a - c);
        let got = lf.f_base_tri(a, b, c);
        assert!((got - expected).abs() < 1e-9 * expected.abs(), "{got} vs {expected}");
    }

    #[test]
    fn test_f_base_tri_degenerate_limits_are_continuous() {
        let lf = LoopFunctions::new(MU);
        let (b, c) = (2.0e4, 5.0e4);
        let exact = lf.f_base_tri(b, b, c);
        let near = lf.f_base_tri(b * (1.0 + 1e-7), b, c);
        assert!((exact - near).abs() < 1e-5 * exact.abs(), "{exact} vs {near}");

        let exact = lf.f_base_tri(b, c, b);
        let near = lf.f_base_tri(b * (1.0 + 1e-7), c, b);
        assert!((exact - near).abs() < 1e-5 * exact.abs(), "{exact} vs {near}");

        let exact = lf.f_base_tri(c, b, b);
        let near = lf.f_base_tri(c, b * (1.0 + 1e-7), b);
        assert!((exact - near).abs() < 1e-5 * exact.abs(), "{exact} vs {near}");

        assert!((lf.f_base_tri(c, c, c) - 0.5 / c).abs() < 1e-18);
    }

    #[test]
    fn test_f_base_tri_massless_cases() {
        let lf = LoopFunctions::new(MU);
        let m = 3.0e4;
        assert_eq!(lf.f_base_tri(0.0, 0.0, 0.0), 0.0);
        assert!((lf.f_base_tri(m, 0.0, 0.0) - (lf.log_ratio(m) - 1.0) / m).abs() < 1e-18);
        assert_eq!(lf.f_base_tri(0.0, m, 0.0), lf.f_base_tri(0.0, 0.0, m));
        assert!((lf.f_base_tri(m, m, 0.0) - 1.0 / m).abs() < 1e-18);
        assert!((lf.f_base_tri(m, 0.0, m) - 1.0 / m).abs() < 1e-18);
        assert!((lf.f_base_tri(0.0, m, m) - 1.0 / m).abs() < 1e-18);
        // Values below the snap threshold count as zero.
        assert_eq!(lf.f_base_tri(1e-9, 0.0, 0.0), 0.0);
    }
}
