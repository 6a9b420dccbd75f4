//! Traced streamlines.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A point in continuous grid-index space.
pub type Point3 = Vec3;

/// An ordered point sequence traced through a vector field.
///
/// Points run from the end of the backward path, through the seed, to the
/// end of the forward path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Streamline {
    points: Vec<Point3>,
}

impl Streamline {
    /// Streamlines with at most this many points carry no usable curve.
    pub const DEGENERATE_LEN: usize = 2;

    /// Creates a streamline from its points.
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    /// Returns the points.
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Returns the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the streamline has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns true if the streamline is too short to keep.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() <= Self::DEGENERATE_LEN
    }

    /// Sum of distances between consecutive points.
    pub fn arc_length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// Returns the axis-aligned `(min, max)` corners, or `None` when empty.
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }

    /// Consumes the streamline and returns its points.
    pub fn into_points(self) -> Vec<Point3> {
        self.points
    }
}

impl From<Vec<Point3>> for Streamline {
    fn from(points: Vec<Point3>) -> Self {
        Self::new(points)
    }
}
