//! Surface of revolution around the y axis.
//!
//! A profile curve in the xy plane is swept around the y axis. The surface is
//! parameterized by `(theta, v)`:
//!
//! ```text
//! S(theta, v) = (c(v).x cos(theta), c(v).y, c(v).x sin(theta))
//! ```
//!
//! Ray queries descend a quad-tree of bounding boxes over the `(theta, v)`
//! domain to a single leaf patch, then refine `(t, theta, v)` with
//! Newton-Raphson on `ray(t) - S(theta, v) = 0`.

use crate::hittable::{Hit, Hittable, MaterialId};
use crate::scene::{SceneError, SceneResult};
use lathe_core::{Curve, CurvePoint};
use lathe_math::{Aabb, DMat3, DVec2, DVec3, Interval, Ray};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Control points must lie this close to the z = 0 plane.
const FLATNESS_TOLERANCE: f64 = 1e-9;

/// Jacobians with a determinant this small end the Newton iteration.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Newton iterates with `t` below this are heading away from the surface.
const NEGATIVE_T_LIMIT: f64 = -0.05;

/// Tessellation and solver settings for a surface of revolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevSurfaceSettings {
    /// Number of angular steps around the axis
    pub steps: usize,
    /// Curve samples per knot span
    pub samples_per_span: usize,
    /// Newton iteration budget
    pub newton_max_iter: usize,
    /// Newton convergence threshold on each residual component
    pub newton_eps: f64,
}

impl Default for RevSurfaceSettings {
    fn default() -> Self {
        Self {
            steps: 40,
            samples_per_span: 30,
            newton_max_iter: 100,
            newton_eps: 1e-7,
        }
    }
}

/// A node of the parameter-space quad-tree.
#[derive(Debug, Clone)]
enum Node {
    Leaf {
        theta: Interval,
        v: Interval,
        bbox: Aabb,
    },
    Internal {
        children: Vec<usize>,
        bbox: Aabb,
    },
}

impl Node {
    fn bbox(&self) -> &Aabb {
        match self {
            Node::Leaf { bbox, .. } | Node::Internal { bbox, .. } => bbox,
        }
    }
}

/// A profile curve revolved around the y axis.
pub struct RevSurface {
    curve: Curve,
    material: MaterialId,
    settings: RevSurfaceSettings,
    /// Node arena; leaves come first, the root is last
    nodes: Vec<Node>,
    root: usize,
    leaf_count: usize,
    v_range: Interval,
}

/// Point on the surface for a profile point revolved by `theta`.
#[inline]
fn revolve(p: DVec3, theta: f64) -> DVec3 {
    let (sin, cos) = theta.sin_cos();
    DVec3::new(p.x * cos, p.y, p.x * sin)
}

impl RevSurface {
    /// Create a surface of revolution with default settings.
    pub fn new(curve: Curve, material: MaterialId) -> SceneResult<Self> {
        Self::with_settings(curve, material, RevSurfaceSettings::default())
    }

    /// Create a surface of revolution.
    ///
    /// Fails if any control point of the profile lies off the z = 0 plane.
    pub fn with_settings(curve: Curve, material: MaterialId, settings: RevSurfaceSettings) -> SceneResult<Self> {
        if let Some((index, p)) = curve
            .controls()
            .iter()
            .enumerate()
            .find(|(_, p)| p.z.abs() > FLATNESS_TOLERANCE)
        {
            return Err(SceneError::ProfileNotFlat { index, z: p.z });
        }
        if settings.steps == 0 || settings.samples_per_span == 0 {
            return Err(SceneError::invalid("revsurface", "steps and samples per span must be positive"));
        }

        let samples = curve.discretize(settings.samples_per_span);
        let (v_lo, v_hi) = curve.valid_range();

        let mut surface = Self {
            curve,
            material,
            settings,
            nodes: Vec::new(),
            root: 0,
            leaf_count: 0,
            v_range: Interval::new(v_lo, v_hi),
        };
        surface.build(&samples);

        log::info!(
            "Built surface of revolution: {} curve samples, {} leaves, {} nodes",
            samples.len(),
            surface.leaf_count,
            surface.nodes.len()
        );

        Ok(surface)
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn settings(&self) -> &RevSurfaceSettings {
        &self.settings
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Create one leaf per (angular step, curve segment) cell, then merge
    /// them into a quad-tree.
    fn build(&mut self, samples: &[CurvePoint]) {
        let steps = self.settings.steps;
        let segments = samples.len().saturating_sub(1);

        let r_max = samples.iter().map(|s| s.position.x.abs()).fold(0.0, f64::max);
        // Sagitta of the arc spanned by one angular step
        let arc_pad = r_max * (1.0 - (PI / steps as f64).cos());

        for i in 0..steps {
            let theta = Interval::new(TAU * i as f64 / steps as f64, TAU * (i + 1) as f64 / steps as f64);
            for pair in samples.windows(2) {
                let v = Interval::new(pair[0].t, pair[1].t);
                let bbox = self.leaf_box(theta, v, arc_pad);
                self.nodes.push(Node::Leaf { theta, v, bbox });
            }
        }
        self.leaf_count = self.nodes.len();

        self.root = if self.leaf_count == 0 {
            self.nodes.push(Node::Internal {
                children: Vec::new(),
                bbox: Aabb::EMPTY,
            });
            0
        } else {
            self.merge(segments, 0..steps, 0..segments)
        };
    }

    /// Bounds of the patch over `theta x v`.
    ///
    /// Samples the patch on a 3x3 grid and pads by the arc sagitta.
    fn leaf_box(&self, theta: Interval, v: Interval, arc_pad: f64) -> Aabb {
        let mut points = Vec::with_capacity(9);
        for cv in [v.min, v.midpoint(), v.max] {
            let (p, _) = self.curve.evaluate(cv);
            for angle in [theta.min, theta.midpoint(), theta.max] {
                points.push(revolve(p, angle));
            }
        }
        Aabb::from_corners(&points).expand(arc_pad + 1e-9)
    }

    /// Merge the leaf grid cells `thetas x segs` into one subtree and return its root.
    fn merge(&mut self, segments: usize, thetas: std::ops::Range<usize>, segs: std::ops::Range<usize>) -> usize {
        let (wi, wj) = (thetas.len(), segs.len());
        if wi == 1 && wj == 1 {
            return thetas.start * segments + segs.start;
        }

        // Split every dimension wider than 2; if none is, split those of width 2
        let (split_i, split_j) = if wi > 2 || wj > 2 {
            (wi > 2, wj > 2)
        } else {
            (wi == 2, wj == 2)
        };

        let halves = |range: std::ops::Range<usize>, split: bool| {
            if split {
                let mid = range.start + range.len() / 2;
                vec![range.start..mid, mid..range.end]
            } else {
                vec![range]
            }
        };

        let mut children = Vec::with_capacity(4);
        for ti in halves(thetas, split_i) {
            for sj in halves(segs.clone(), split_j) {
                children.push(self.merge(segments, ti.clone(), sj));
            }
        }

        let bbox = children
            .iter()
            .fold(Aabb::EMPTY, |bbox, &child| Aabb::surrounding(&bbox, self.nodes[child].bbox()));
        self.nodes.push(Node::Internal { children, bbox });
        self.nodes.len() - 1
    }

    /// Descend to the leaf whose box the ray enters first.
    fn find_leaf(&self, node: usize, ray: &Ray) -> Option<(usize, Interval)> {
        let span = self.nodes[node].bbox().hit_span(ray)?;
        match &self.nodes[node] {
            Node::Leaf { .. } => Some((node, span)),
            Node::Internal { children, .. } => children
                .iter()
                .filter_map(|&child| self.find_leaf(child, ray))
                .reduce(|best, candidate| if prefer(candidate.1, best.1) { candidate } else { best }),
        }
    }

    /// Newton-Raphson on `F(t, theta, v) = ray(t) - S(theta, v)`.
    fn newton(&self, ray: &Ray, theta: Interval, v: Interval, span: Interval, hit: &mut Hit, t_min: f64) -> bool {
        let mut x = DVec3::new(span.midpoint(), theta.midpoint(), v.midpoint());

        for _ in 0..self.settings.newton_max_iter {
            let (t, angle, cv) = (x.x, x.y, x.z);
            let (p, dp) = self.curve.evaluate(cv);
            let (sin, cos) = angle.sin_cos();

            let surface = DVec3::new(p.x * cos, p.y, p.x * sin);
            let d_theta = DVec3::new(-p.x * sin, 0.0, p.x * cos);
            let d_v = DVec3::new(dp.x * cos, dp.y, dp.x * sin);

            let residual = ray.at(t) - surface;
            if residual.abs().max_element() < self.settings.newton_eps {
                if !hit.accepts(t, t_min) {
                    return false;
                }
                let Some(normal) = d_v.cross(d_theta).try_normalize() else {
                    return false;
                };
                hit.set(t, self.material, normal, DVec2::new(angle / TAU, cv));
                return true;
            }

            let jacobian = DMat3::from_cols(ray.direction(), -d_theta, -d_v);
            if jacobian.determinant().abs() < SINGULAR_EPSILON {
                return false;
            }
            x -= jacobian.inverse() * residual;

            if !x.is_finite()
                || !self.v_range.contains(x.z)
                || !(0.0..TAU).contains(&x.y)
                || x.x < NEGATIVE_T_LIMIT
            {
                return false;
            }
        }

        false
    }
}

/// Whether box span `a` is a better leaf candidate than `b`.
///
/// Entries in front of the origin win, nearest first; among boxes holding the
/// origin the one reaching farther wins.
fn prefer(a: Interval, b: Interval) -> bool {
    match (a.min > 0.0, b.min > 0.0) {
        (true, true) => a.min < b.min,
        (true, false) => true,
        (false, true) => false,
        (false, false) => a.max > b.max,
    }
}

impl Hittable for RevSurface {
    fn intersect(&self, ray: &Ray, hit: &mut Hit, t_min: f64) -> bool {
        let Some((leaf, span)) = self.find_leaf(self.root, ray) else {
            return false;
        };
        let Node::Leaf { theta, v, .. } = self.nodes[leaf] else {
            return false;
        };
        self.newton(ray, theta, v, span, hit, t_min)
    }

    fn bounding_box(&self) -> Aabb {
        *self.nodes[self.root].bbox()
    }
}
