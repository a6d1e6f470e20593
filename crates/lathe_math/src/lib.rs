//! Vector and matrix algebra for the lathe path tracer.
//!
//! Geometry is computed in double precision; the glam `D*` types are
//! re-exported so downstream crates only depend on this one.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::MatrixExt;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dvec3_operations() {
        let a = DVec3::new(1.0, 2.0, 3.0);
        let b = DVec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, DVec3::new(5.0, 7.0, 9.0));
        assert_eq!(a.dot(b), 32.0);
        assert_eq!(DVec3::X.cross(DVec3::Y), DVec3::Z);
    }
}
