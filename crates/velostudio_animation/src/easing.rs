// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing curve catalogue and evaluation.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Default spring amplitude
const SPRING_AMPLITUDE: f64 = 1.0;
/// Default spring period
const SPRING_PERIOD: f64 = 0.5;

/// Convergence tolerance for the cubic-bezier parameter solve
const BEZIER_TOLERANCE: f64 = 1e-7;

/// Easing curve family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EasingKind {
    /// Identity
    #[default]
    Linear,
    /// The CSS `ease` curve, cubic-bezier(0.25, 0.1, 0.25, 1.0)
    Ease,
    /// Quadratic ease-in: `p^2`
    EaseIn,
    /// Quadratic ease-out: `1 - (1-p)^2`
    EaseOut,
    /// Piecewise quadratic, symmetric around p = 0.5
    EaseInOut,
    /// Five-segment bounce
    Bounce,
    /// Exponentially decaying sine; overshoots, does not start at 0
    Spring,
    /// Exponentially decaying sine pinned to 0 and 1 at the endpoints
    Elastic,
    /// Cubic with initial undershoot
    Back,
    /// Two-control-point bezier, params = [x1, y1, x2, y2]
    CubicBezier,
}

/// An easing descriptor: curve family plus numeric parameters.
///
/// Copied (never shared) into every keyframe or speed control that uses it.
/// Parameter slots beyond what the kind consumes are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Easing {
    /// Curve family
    pub kind: EasingKind,
    /// Kind-specific parameters
    pub params: [f64; 4],
}

impl Easing {
    /// Identity easing.
    pub fn linear() -> Self {
        Self::default()
    }

    /// The CSS `ease` curve.
    pub fn ease() -> Self {
        Self { kind: EasingKind::Ease, params: [0.0; 4] }
    }

    /// Quadratic ease-in.
    pub fn ease_in() -> Self {
        Self { kind: EasingKind::EaseIn, params: [0.0; 4] }
    }

    /// Quadratic ease-out.
    pub fn ease_out() -> Self {
        Self { kind: EasingKind::EaseOut, params: [0.0; 4] }
    }

    /// Piecewise quadratic ease-in-out.
    pub fn ease_in_out() -> Self {
        Self { kind: EasingKind::EaseInOut, params: [0.0; 4] }
    }

    /// Classic five-segment bounce.
    pub fn bounce() -> Self {
        Self { kind: EasingKind::Bounce, params: [0.0; 4] }
    }

    /// Spring with the given amplitude and period.
    pub fn spring(amplitude: f64, period: f64) -> Self {
        Self { kind: EasingKind::Spring, params: [amplitude, period, 0.0, 0.0] }
    }

    /// Elastic snap with pinned endpoints.
    pub fn elastic() -> Self {
        Self { kind: EasingKind::Elastic, params: [0.0; 4] }
    }

    /// Back (anticipation) curve.
    pub fn back() -> Self {
        Self { kind: EasingKind::Back, params: [0.0; 4] }
    }

    /// Custom cubic bezier. `x1` and `x2` are clamped to [0, 1] so the
    /// curve stays a function of progress.
    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            kind: EasingKind::CubicBezier,
            params: [x1.clamp(0.0, 1.0), y1, x2.clamp(0.0, 1.0), y2],
        }
    }

    /// Evaluate the curve at `progress`.
    ///
    /// Input is clamped to [0, 1] (NaN evaluates as 0). Output is usually in
    /// [0, 1] but Spring, Elastic, Back, and steep beziers overshoot by
    /// design.
    pub fn evaluate(&self, progress: f64) -> f64 {
        let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };

        match self.kind {
            EasingKind::Linear => p,
            EasingKind::Ease => UnitBezier::new(0.25, 0.1, 0.25, 1.0).solve(p),
            EasingKind::EaseIn => p * p,
            EasingKind::EaseOut => 1.0 - (1.0 - p) * (1.0 - p),
            EasingKind::EaseInOut => {
                if p < 0.5 {
                    2.0 * p * p
                } else {
                    let q = -2.0 * p + 2.0;
                    1.0 - q * q / 2.0
                }
            }
            EasingKind::Bounce => bounce(p),
            EasingKind::Spring => {
                let amplitude = self.params[0];
                let period = if self.params[1] > 0.0 { self.params[1] } else { SPRING_PERIOD };
                1.0 - amplitude * 2.0_f64.powf(-10.0 * p) * ((p - period / 4.0) * (2.0 * PI) / period).sin()
            }
            EasingKind::Elastic => elastic(p),
            EasingKind::Back => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                c3 * p * p * p - c1 * p * p
            }
            EasingKind::CubicBezier => {
                let [x1, y1, x2, y2] = self.params;
                UnitBezier::new(x1.clamp(0.0, 1.0), y1, x2.clamp(0.0, 1.0), y2).solve(p)
            }
        }
    }
}

impl EasingKind {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Ease => "Ease",
            Self::EaseIn => "Ease In",
            Self::EaseOut => "Ease Out",
            Self::EaseInOut => "Ease In Out",
            Self::Bounce => "Bounce",
            Self::Spring => "Spring",
            Self::Elastic => "Elastic",
            Self::Back => "Back",
            Self::CubicBezier => "Cubic Bezier",
        }
    }
}

fn bounce(p: f64) -> f64 {
    let n1 = 7.5625;
    let d1 = 2.75;
    if p < 1.0 / d1 {
        n1 * p * p
    } else if p < 2.0 / d1 {
        let p = p - 1.5 / d1;
        n1 * p * p + 0.75
    } else if p < 2.5 / d1 {
        let p = p - 2.25 / d1;
        n1 * p * p + 0.9375
    } else {
        let p = p - 2.625 / d1;
        n1 * p * p + 0.984375
    }
}

fn elastic(p: f64) -> f64 {
    if p == 0.0 || p == 1.0 {
        return p;
    }
    let c4 = (2.0 * PI) / 3.0;
    2.0_f64.powf(-10.0 * p) * ((10.0 * p - 0.75) * c4).sin() + 1.0
}

/// Cubic bezier with endpoints pinned at (0,0) and (1,1), expressed in the
/// polynomial coefficient form used for easing curves.
///
/// `solve` finds the curve parameter whose x-coordinate matches the input
/// progress (Newton-Raphson, bisection fallback) and returns the
/// y-coordinate there. Converges to within [`BEZIER_TOLERANCE`].
#[derive(Debug, Clone, Copy)]
struct UnitBezier {
    ax: f64,
    bx: f64,
    cx: f64,
    ay: f64,
    by: f64,
    cy: f64,
}

impl UnitBezier {
    fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let cx = 3.0 * x1;
        let bx = 3.0 * (x2 - x1) - cx;
        let ax = 1.0 - cx - bx;
        let cy = 3.0 * y1;
        let by = 3.0 * (y2 - y1) - cy;
        let ay = 1.0 - cy - by;
        Self { ax, bx, cx, ay, by, cy }
    }

    fn sample_x(&self, t: f64) -> f64 {
        ((self.ax * t + self.bx) * t + self.cx) * t
    }

    fn sample_y(&self, t: f64) -> f64 {
        ((self.ay * t + self.by) * t + self.cy) * t
    }

    fn sample_dx(&self, t: f64) -> f64 {
        (3.0 * self.ax * t + 2.0 * self.bx) * t + self.cx
    }

    fn solve_t_for_x(&self, x: f64) -> f64 {
        // Newton-Raphson converges in a handful of steps for sane curves
        let mut t = x;
        for _ in 0..8 {
            let err = self.sample_x(t) - x;
            if err.abs() < BEZIER_TOLERANCE {
                return t;
            }
            let slope = self.sample_dx(t);
            if slope.abs() < 1e-6 {
                break;
            }
            t -= err / slope;
        }

        // Flat-slope regions fall back to bisection
        let mut lo = 0.0;
        let mut hi = 1.0;
        t = x;
        while hi - lo > BEZIER_TOLERANCE {
            if self.sample_x(t) < x {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) / 2.0;
        }
        t
    }

    fn solve(&self, x: f64) -> f64 {
        self.sample_y(self.solve_t_for_x(x))
    }
}
