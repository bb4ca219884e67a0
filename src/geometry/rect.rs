use geo_traits::{CoordTrait, RectTrait};

use crate::geometry::{partial_max, partial_min, Geometry};
use crate::r#type::GeometryNum;

/// An axis-aligned box in `D` dimensions, stored as its `min` and `max`
/// corners. Boundaries are closed on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect<N, const D: usize> {
    min: [N; D],
    max: [N; D],
}

impl<N: GeometryNum, const D: usize> Rect<N, D> {
    pub fn new(min: [N; D], max: [N; D]) -> Self {
        debug_assert!((0..D).all(|axis| min[axis] <= max[axis]));
        Self { min, max }
    }

    /// Degenerate box covering a single point.
    pub fn point(at: [N; D]) -> Self {
        Self { min: at, max: at }
    }

    pub fn min(&self) -> &[N; D] {
        &self.min
    }

    pub fn max(&self) -> &[N; D] {
        &self.max
    }
}

impl<N: GeometryNum> Rect<N, 2> {
    /// Build from any georust rect.
    pub fn from_rect(rect: &impl RectTrait<T = N>) -> Self {
        Self {
            min: [rect.min().x(), rect.min().y()],
            max: [rect.max().x(), rect.max().y()],
        }
    }
}

impl<N: GeometryNum, const D: usize> Geometry for Rect<N, D> {
    type Scalar = N;

    fn merge(&self, other: &Self) -> Self {
        Self {
            min: std::array::from_fn(|axis| partial_min(self.min[axis], other.min[axis])),
            max: std::array::from_fn(|axis| partial_max(self.max[axis], other.max[axis])),
        }
    }

    fn area(&self) -> N {
        let mut area = N::one();
        for axis in 0..D {
            area = area * (self.max[axis] - self.min[axis]);
        }
        area
    }

    fn intersects(&self, other: &Self) -> bool {
        (0..D).all(|axis| self.min[axis] <= other.max[axis] && other.min[axis] <= self.max[axis])
    }

    fn contains(&self, other: &Self) -> bool {
        (0..D).all(|axis| self.min[axis] <= other.min[axis] && other.max[axis] <= self.max[axis])
    }
}
