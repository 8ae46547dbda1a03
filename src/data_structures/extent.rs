//! Axis-aligned bounding extents.
//!
//! A [`BoundingExtent`] encloses the geometry of a mesh or a whole scene-graph
//! subtree. Mesh nodes store the extent of their vertices in local space, and
//! subtree extents are assembled in world space by transforming those local
//! boxes with each node's world matrix (see
//! [`crate::data_structures::scene_graph::world_extent`]).

use cgmath::{Matrix4, Point3, Transform, Vector3};

/// An axis-aligned box given by its minimum and maximum corner.
///
/// An extent is never "empty": geometry without vertices has no extent at all
/// and is represented as `Option::None` by the constructors below.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingExtent {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingExtent {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self {
            min: Point3::new(min.x.min(max.x), min.y.min(max.y), min.z.min(max.z)),
            max: Point3::new(min.x.max(max.x), min.y.max(max.y), min.z.max(max.z)),
        }
    }

    /// Smallest extent containing every point, `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut extent = Self {
            min: first,
            max: first,
        };
        for p in points {
            extent.expand_to(p);
        }
        Some(extent)
    }

    pub fn expand_to(&mut self, p: Point3<f32>) {
        self.min = Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    pub fn union(&self, other: &BoundingExtent) -> BoundingExtent {
        let mut out = *self;
        out.expand_to(other.min);
        out.expand_to(other.max);
        out
    }

    /// `max - min` per axis. Zero on any axis for flat geometry.
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Largest edge of the box.
    pub fn max_dimension(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }

    pub fn corners(&self) -> [Point3<f32>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Re-bounds the eight transformed corners.
    ///
    /// This is a conservative box: rotated geometry may end up with a larger
    /// extent than a box fitted to the transformed vertices directly.
    pub fn transformed(&self, transform: &Matrix4<f32>) -> BoundingExtent {
        let corners = self.corners().map(|corner| transform.transform_point(corner));
        let mut out = BoundingExtent {
            min: corners[0],
            max: corners[0],
        };
        corners[1..].iter().for_each(|&c| out.expand_to(c));
        out
    }
}
