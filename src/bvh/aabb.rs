use nalgebra::Point3;

use crate::error::{Error, Result};

/// Axis-aligned bounding box. For any box built from at least one point,
/// `min[i] <= max[i]` holds on every axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn from_points(points: &[Point3<f32>]) -> Result<Aabb> {
        let (first, rest) = points.split_first().ok_or(Error::EmptyPointSet)?;
        let mut min = *first;
        let mut max = *first;
        for point in rest {
            min = min.inf(point);
            max = max.sup(point);
        }
        Ok(Aabb { min, max })
    }

    // smallest box containing both inputs; commutative and associative
    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    pub fn contains(&self, other: &Aabb) -> bool {
        (0..3).all(|axis| self.min[axis] <= other.min[axis] && other.max[axis] <= self.max[axis])
    }
}
