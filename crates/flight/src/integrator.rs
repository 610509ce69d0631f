//! Adaptive Dormand–Prince 5(4) integrator with dense output.
//!
//! The integrator drives a caller-supplied observer with every accepted step.
//! Each [`Step`] can be interpolated anywhere inside its interval, which is how
//! evenly spaced samples and event crossings are produced independently of the
//! adaptive step size.

use std::ops::ControlFlow;

use thiserror::Error;

const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// Fifth-order weights (also the last stage row, hence FSAL).
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Difference between the fifth- and fourth-order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntegratorError {
    #[error("integration span is empty or non-finite ({t0} → {t_end})")]
    InvalidSpan { t0: f64, t_end: f64 },
    #[error("step size underflow at t = {t} (h = {h})")]
    StepSizeUnderflow { t: f64, h: f64 },
    #[error("state became non-finite at t = {t}")]
    NonFinite { t: f64 },
    #[error("step budget of {steps} exhausted at t = {t}")]
    StepBudgetExhausted { steps: usize, t: f64 },
}

/// One accepted step with the data needed for cubic Hermite interpolation.
#[derive(Debug, Clone, Copy)]
pub struct Step<const N: usize> {
    pub t0: f64,
    pub t1: f64,
    pub y0: [f64; N],
    pub y1: [f64; N],
    pub f0: [f64; N],
    pub f1: [f64; N],
}

impl<const N: usize> Step<N> {
    /// State at `t`, which should lie in `[t0, t1]`.
    pub fn interpolate(&self, t: f64) -> [f64; N] {
        let h = self.t1 - self.t0;
        if h <= 0.0 {
            return self.y1;
        }
        let s = (t - self.t0) / h;
        let s2 = s * s;
        let s3 = s2 * s;
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;
        std::array::from_fn(|i| {
            h00 * self.y0[i] + h10 * h * self.f0[i] + h01 * self.y1[i] + h11 * h * self.f1[i]
        })
    }
}

/// Final state of an integration run.
#[derive(Debug, Clone, Copy)]
pub struct Summary<const N: usize> {
    pub t: f64,
    pub y: [f64; N],
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    /// `true` when the observer stopped the run before `t_end`.
    pub stopped: bool,
}

/// Step-size control parameters.
#[derive(Debug, Clone, Copy)]
pub struct DormandPrince {
    pub rtol: f64,
    pub atol: f64,
    pub max_step: f64,
    pub min_step: f64,
    pub max_steps: usize,
}

impl DormandPrince {
    pub fn new(rtol: f64, atol: f64, max_step: f64) -> Self {
        Self {
            rtol,
            atol,
            max_step,
            ..Self::default()
        }
    }

    /// Integrate `y' = rhs(t, y)` from `t0` to `t_end`, handing every accepted
    /// step to `observer`. Returning `ControlFlow::Break` ends the run early.
    pub fn integrate<const N: usize, F, O>(
        &self,
        rhs: F,
        t0: f64,
        y0: [f64; N],
        t_end: f64,
        mut observer: O,
    ) -> Result<Summary<N>, IntegratorError>
    where
        F: Fn(f64, &[f64; N]) -> [f64; N],
        O: FnMut(&Step<N>) -> ControlFlow<()>,
    {
        if !(t0.is_finite() && t_end.is_finite()) || t_end <= t0 {
            return Err(IntegratorError::InvalidSpan { t0, t_end });
        }

        let mut t = t0;
        let mut y = y0;
        let mut f = rhs(t, &y);
        if !all_finite(&y) || !all_finite(&f) {
            return Err(IntegratorError::NonFinite { t });
        }

        let mut h = self.initial_step(&rhs, t, &y, &f).min(self.max_step);
        let mut accepted_steps = 0;
        let mut rejected_steps = 0;

        while t < t_end {
            if accepted_steps + rejected_steps >= self.max_steps {
                return Err(IntegratorError::StepBudgetExhausted {
                    steps: self.max_steps,
                    t,
                });
            }
            if h < self.min_step {
                return Err(IntegratorError::StepSizeUnderflow { t, h });
            }

            let last = t + h >= t_end;
            let h_try = if last { t_end - t } else { h };
            let (y_new, f_new, err) = self.attempt(&rhs, t, &y, &f, h_try);

            if !all_finite(&y_new) || !all_finite(&f_new) || !err.is_finite() {
                rejected_steps += 1;
                h = h_try * MIN_FACTOR;
                continue;
            }

            if err > 1.0 {
                rejected_steps += 1;
                let factor = (SAFETY * err.powf(-0.2)).max(MIN_FACTOR);
                h = h_try * factor.min(1.0);
                continue;
            }

            accepted_steps += 1;
            let t_new = if last { t_end } else { t + h_try };
            let step = Step {
                t0: t,
                t1: t_new,
                y0: y,
                y1: y_new,
                f0: f,
                f1: f_new,
            };
            t = t_new;
            y = y_new;
            f = f_new;

            if observer(&step).is_break() {
                return Ok(Summary {
                    t,
                    y,
                    accepted_steps,
                    rejected_steps,
                    stopped: true,
                });
            }

            let factor = if err == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
            };
            h = (h_try * factor).min(self.max_step);
        }

        Ok(Summary {
            t,
            y,
            accepted_steps,
            rejected_steps,
            stopped: false,
        })
    }

    /// One Dormand–Prince attempt; returns the fifth-order solution, its
    /// derivative, and the scaled RMS error estimate.
    fn attempt<const N: usize, F>(
        &self,
        rhs: &F,
        t: f64,
        y: &[f64; N],
        k1: &[f64; N],
        h: f64,
    ) -> ([f64; N], [f64; N], f64)
    where
        F: Fn(f64, &[f64; N]) -> [f64; N],
    {
        let k2 = rhs(t + C2 * h, &combine(y, h, &[(A21, k1)]));
        let k3 = rhs(t + C3 * h, &combine(y, h, &[(A31, k1), (A32, &k2)]));
        let k4 = rhs(t + C4 * h, &combine(y, h, &[(A41, k1), (A42, &k2), (A43, &k3)]));
        let k5 = rhs(
            t + C5 * h,
            &combine(y, h, &[(A51, k1), (A52, &k2), (A53, &k3), (A54, &k4)]),
        );
        let k6 = rhs(
            t + h,
            &combine(y, h, &[(A61, k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)]),
        );
        let y_new = combine(y, h, &[(B1, k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)]);
        let k7 = rhs(t + h, &y_new);

        let mut sum_sq = 0.0;
        for i in 0..N {
            let err = h
                * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i] + E7 * k7[i]);
            let scale = self.atol + self.rtol * y[i].abs().max(y_new[i].abs());
            sum_sq += (err / scale).powi(2);
        }
        let err_norm = if N == 0 { 0.0 } else { (sum_sq / N as f64).sqrt() };

        (y_new, k7, err_norm)
    }

    /// Starting step from the scale of the state and its derivatives
    /// (Hairer, Nørsett & Wanner, algorithm II.4.14).
    fn initial_step<const N: usize, F>(&self, rhs: &F, t: f64, y: &[f64; N], f: &[f64; N]) -> f64
    where
        F: Fn(f64, &[f64; N]) -> [f64; N],
    {
        let scale: [f64; N] = std::array::from_fn(|i| self.atol + self.rtol * y[i].abs());
        let d0 = rms(y, &scale);
        let d1 = rms(f, &scale);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };

        let y1: [f64; N] = std::array::from_fn(|i| y[i] + h0 * f[i]);
        let f1 = rhs(t + h0, &y1);
        let df: [f64; N] = std::array::from_fn(|i| f1[i] - f[i]);
        let d2 = rms(&df, &scale) / h0;

        let h1 = if d1.max(d2) <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(0.2)
        };
        let h = (100.0 * h0).min(h1);
        if h.is_finite() && h > 0.0 { h } else { 1e-6 }
    }
}

impl Default for DormandPrince {
    fn default() -> Self {
        Self {
            rtol: 1e-6,
            atol: 1e-9,
            max_step: f64::INFINITY,
            min_step: 1e-10,
            max_steps: 100_000,
        }
    }
}

/// `y + h · Σ aᵢ kᵢ`
fn combine<const N: usize>(y: &[f64; N], h: f64, terms: &[(f64, &[f64; N])]) -> [f64; N] {
    std::array::from_fn(|i| y[i] + h * terms.iter().map(|(a, k)| a * k[i]).sum::<f64>())
}

fn rms<const N: usize>(v: &[f64; N], scale: &[f64; N]) -> f64 {
    if N == 0 {
        return 0.0;
    }
    let sum: f64 = v.iter().zip(scale).map(|(x, s)| (x / s).powi(2)).sum();
    (sum / N as f64).sqrt()
}

fn all_finite<const N: usize>(v: &[f64; N]) -> bool {
    v.iter().all(|x| x.is_finite())
}
