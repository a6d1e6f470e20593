use crate::{DVec3, Interval, Ray};

/// Axis-Aligned Bounding Box used for culling and the surface-of-revolution tree.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two corner points.
    pub fn from_points(a: DVec3, b: DVec3) -> Self {
        let x = Interval::new(a.x.min(b.x), a.x.max(b.x));
        let y = Interval::new(a.y.min(b.y), a.y.max(b.y));
        let z = Interval::new(a.z.min(b.z), a.z.max(b.z));

        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create the tightest AABB containing every point in `points`.
    ///
    /// Returns [`Aabb::EMPTY`] for an empty slice.
    pub fn from_corners(points: &[DVec3]) -> Self {
        let Some(first) = points.first() else {
            return Self::EMPTY;
        };
        let (min, max) = points
            .iter()
            .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Self::from_points(min, max)
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Uses the slab method.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.clip(ray, ray_t).is_some()
    }

    /// Entry and exit parameters of a ray through the box.
    ///
    /// Unlike [`Aabb::hit`] the span is not clipped at the ray origin, so
    /// `min` is negative when the origin lies inside the box. Returns `None`
    /// when the slabs do not overlap or the box lies entirely behind the origin.
    pub fn hit_span(&self, ray: &Ray) -> Option<Interval> {
        self.clip(ray, Interval::UNIVERSE)
            .filter(|span| span.max >= 0.0)
    }

    fn clip(&self, ray: &Ray, mut ray_t: Interval) -> Option<Interval> {
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];

            if direction == 0.0 {
                // Parallel to the slab: either always inside or never.
                if origin < slab.min || origin > slab.max {
                    return None;
                }
                continue;
            }

            let adinv = 1.0 / direction;
            let mut t0 = (slab.min - origin) * adinv;
            let mut t1 = (slab.max - origin) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return None;
            }
        }
        Some(ray_t)
    }

    /// Grow the box by `margin` on every side.
    pub fn expand(&self, margin: f64) -> Aabb {
        Aabb {
            x: self.x.expand(2.0 * margin),
            y: self.y.expand(2.0 * margin),
            z: self.z.expand(2.0 * margin),
        }
    }

    /// Returns true if every bound is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.z]
            .iter()
            .all(|i| i.min.is_finite() && i.max.is_finite())
    }

    /// The eight corner points of the box.
    pub fn corners(&self) -> [DVec3; 8] {
        let (x, y, z) = (self.x, self.y, self.z);
        [
            DVec3::new(x.min, y.min, z.min),
            DVec3::new(x.max, y.min, z.min),
            DVec3::new(x.min, y.max, z.min),
            DVec3::new(x.max, y.max, z.min),
            DVec3::new(x.min, y.min, z.max),
            DVec3::new(x.max, y.min, z.max),
            DVec3::new(x.min, y.max, z.max),
            DVec3::new(x.max, y.max, z.max),
        ]
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> DVec3 {
        DVec3::new(self.x.midpoint(), self.y.midpoint(), self.z.midpoint())
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        let delta = 0.0001;
        if self.x.size() < delta {
            self.x = self.x.expand(delta);
        }
        if self.y.size() < delta {
            self.y = self.y.expand(delta);
        }
        if self.z.size() < delta {
            self.z = self.z.expand(delta);
        }
    }

    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    pub const UNIVERSE: Aabb = Aabb {
        x: Interval::UNIVERSE,
        y: Interval::UNIVERSE,
        z: Interval::UNIVERSE,
    };
}
