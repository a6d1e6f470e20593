//! Parametric profile curves for surfaces of revolution.
//!
//! Bezier and B-spline curves share one evaluator: both are expressed as a
//! B-spline basis over a knot vector and differ only in how that knot vector
//! is built. A Bezier curve of `n` control points is a single span of degree
//! `n - 1` with clamped knots; a B-spline is a uniform cubic.

use std::fmt;

use lathe_math::DVec3;
use thiserror::Error;

/// Degree used for B-spline curves.
pub const BSPLINE_DEGREE: usize = 3;

/// Errors that can occur when constructing a curve.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    #[error("{kind} curve needs at least {required} control points, got {got}")]
    TooFewControlPoints {
        kind: CurveKind,
        required: usize,
        got: usize,
    },

    #[error("Control point {0} is not finite")]
    NonFiniteControlPoint(usize),
}

pub type CurveResult<T> = Result<T, CurveError>;

/// Which construction produced a curve's basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    Bezier,
    BSpline,
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveKind::Bezier => write!(f, "Bezier"),
            CurveKind::BSpline => write!(f, "B-spline"),
        }
    }
}

/// A sample taken along a curve: position, unit tangent and parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub position: DVec3,
    pub tangent: DVec3,
    pub t: f64,
}

/// B-spline basis over a knot vector.
#[derive(Debug, Clone)]
struct Basis {
    degree: usize,
    knots: Vec<f64>,
}

impl Basis {
    fn bezier(count: usize) -> Self {
        let degree = count - 1;
        let mut knots = vec![0.0; count];
        knots.extend(std::iter::repeat(1.0).take(count));
        Self { degree, knots }
    }

    fn uniform(count: usize, degree: usize) -> Self {
        let segments = (count + degree) as f64;
        let knots = (0..=count + degree).map(|i| i as f64 / segments).collect();
        Self { degree, knots }
    }

    /// Number of basis functions (equals the number of control points).
    fn count(&self) -> usize {
        self.knots.len() - self.degree - 1
    }

    fn valid_range(&self) -> (f64, f64) {
        (self.knots[self.degree], self.knots[self.count()])
    }

    /// Index `i` of the non-empty knot span `[knots[i], knots[i + 1])` holding `t`.
    fn span(&self, t: f64) -> usize {
        (self.degree..self.count())
            .rev()
            .find(|&i| self.knots[i] <= t && self.knots[i] < self.knots[i + 1])
            .unwrap_or(self.degree)
    }

    /// Values and first derivatives of every basis function at `t`
    /// (Cox-de Boor recursion).
    fn evaluate(&self, t: f64) -> (Vec<f64>, Vec<f64>) {
        let knots = &self.knots;
        let mut values = vec![0.0; knots.len() - 1];
        values[self.span(t)] = 1.0;
        let mut derivatives = vec![0.0; self.count()];

        for p in 1..=self.degree {
            let next: Vec<f64> = (0..knots.len() - 1 - p)
                .map(|i| {
                    let left = knots[i + p] - knots[i];
                    let right = knots[i + p + 1] - knots[i + 1];
                    let mut value = 0.0;
                    if left > 0.0 {
                        value += (t - knots[i]) / left * values[i];
                    }
                    if right > 0.0 {
                        value += (knots[i + p + 1] - t) / right * values[i + 1];
                    }
                    value
                })
                .collect();

            if p == self.degree {
                for (i, derivative) in derivatives.iter_mut().enumerate() {
                    let left = knots[i + p] - knots[i];
                    let right = knots[i + p + 1] - knots[i + 1];
                    let mut d = 0.0;
                    if left > 0.0 {
                        d += values[i] / left;
                    }
                    if right > 0.0 {
                        d -= values[i + 1] / right;
                    }
                    *derivative = p as f64 * d;
                }
            }
            values = next;
        }

        (values, derivatives)
    }
}

/// A profile curve defined by control points and a basis.
#[derive(Debug, Clone)]
pub struct Curve {
    kind: CurveKind,
    controls: Vec<DVec3>,
    basis: Basis,
}

impl Curve {
    /// Create a single Bezier curve of degree `controls.len() - 1`.
    pub fn bezier(controls: Vec<DVec3>) -> CurveResult<Self> {
        Self::validate(CurveKind::Bezier, &controls, 2)?;
        let basis = Basis::bezier(controls.len());
        Ok(Self {
            kind: CurveKind::Bezier,
            controls,
            basis,
        })
    }

    /// Create a uniform cubic B-spline.
    pub fn bspline(controls: Vec<DVec3>) -> CurveResult<Self> {
        Self::validate(CurveKind::BSpline, &controls, BSPLINE_DEGREE + 1)?;
        let basis = Basis::uniform(controls.len(), BSPLINE_DEGREE);
        Ok(Self {
            kind: CurveKind::BSpline,
            controls,
            basis,
        })
    }

    fn validate(kind: CurveKind, controls: &[DVec3], required: usize) -> CurveResult<()> {
        if controls.len() < required {
            return Err(CurveError::TooFewControlPoints {
                kind,
                required,
                got: controls.len(),
            });
        }
        if let Some(index) = controls.iter().position(|p| !p.is_finite()) {
            return Err(CurveError::NonFiniteControlPoint(index));
        }
        Ok(())
    }

    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    pub fn controls(&self) -> &[DVec3] {
        &self.controls
    }

    pub fn degree(&self) -> usize {
        self.basis.degree
    }

    /// Parameter range `[t_min, t_max]` on which the curve is defined.
    pub fn valid_range(&self) -> (f64, f64) {
        self.basis.valid_range()
    }

    /// Point and (unnormalized) tangent at parameter `t`.
    ///
    /// `t` is clamped into [`Curve::valid_range`].
    pub fn evaluate(&self, t: f64) -> (DVec3, DVec3) {
        let (lo, hi) = self.valid_range();
        let (values, derivatives) = self.basis.evaluate(t.clamp(lo, hi));

        self.controls
            .iter()
            .zip(values.iter().zip(&derivatives))
            .fold((DVec3::ZERO, DVec3::ZERO), |(point, tangent), (p, (n, dn))| {
                (point + *p * *n, tangent + *p * *dn)
            })
    }

    /// Sample the curve with `resolution` steps per knot span.
    ///
    /// The first and last samples sit exactly on the ends of the valid range.
    pub fn discretize(&self, resolution: usize) -> Vec<CurvePoint> {
        let resolution = resolution.max(1);
        let knots = &self.basis.knots;
        let (_, end) = self.valid_range();

        let mut params = Vec::new();
        for i in self.basis.degree..self.basis.count() {
            let (a, b) = (knots[i], knots[i + 1]);
            if a >= b {
                continue;
            }
            params.extend((0..resolution).map(|j| a + (b - a) * j as f64 / resolution as f64));
        }
        params.push(end);

        params
            .into_iter()
            .map(|t| {
                let (position, tangent) = self.evaluate(t);
                CurvePoint {
                    position,
                    tangent: tangent.normalize_or_zero(),
                    t,
                }
            })
            .collect()
    }
}
