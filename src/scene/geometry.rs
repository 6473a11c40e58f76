//! Plane and lattice math shared by the wall tools and the grid generator.
//!
//! Coplanarity here is the loose, editor-grade test the wall tools need:
//! a plane is fitted to the first three points and every remaining point
//! must sit within [`COPLANAR_TOLERANCE`] of it. Nodes are hand-placed,
//! so the tolerance is a full world unit rather than a float epsilon.

use cgmath::{InnerSpace, Vector3};
use thiserror::Error;

/// World-space position. All geometry in the crate uses f32.
pub type Point = Vector3<f32>;

/// Maximum distance from the fitted plane for a point to still count as
/// coplanar, in world units.
pub const COPLANAR_TOLERANCE: f32 = 1.0;

/// Cross products with a magnitude below this are treated as degenerate.
pub const COLLINEAR_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("at least 3 points are required to define a plane")]
    TooFewPoints,
    #[error("the first three points are collinear")]
    Collinear,
    #[error("points do not lie on a common plane")]
    NotCoplanar,
}

/// True when the three points fail to span a plane.
pub fn are_collinear(a: Point, b: Point, c: Point) -> bool {
    (b - a).cross(c - a).magnitude() < COLLINEAR_EPSILON
}

/// Unit normal of the plane through three points, or `None` when they
/// are collinear. The collinearity check happens *before* normalizing,
/// so a degenerate cross product is never divided by its own length.
pub fn plane_normal(a: Point, b: Point, c: Point) -> Option<Vector3<f32>> {
    let cross = (b - a).cross(c - a);
    if cross.magnitude() < COLLINEAR_EPSILON {
        return None;
    }
    Some(cross.normalize())
}

/// Signed distance from `point` to the plane through `origin` with unit
/// `normal`.
pub fn plane_distance(origin: Point, normal: Vector3<f32>, point: Point) -> f32 {
    normal.dot(point - origin)
}

/// Checks that all points lie on a common plane, within
/// [`COPLANAR_TOLERANCE`] of the plane fitted to the first three.
///
/// Fewer than three points cannot define a plane; exactly three
/// non-collinear points always succeed.
pub fn check_coplanar(points: &[Point]) -> Result<(), GeometryError> {
    if points.len() < 3 {
        return Err(GeometryError::TooFewPoints);
    }
    let normal =
        plane_normal(points[0], points[1], points[2]).ok_or(GeometryError::Collinear)?;
    for &p in &points[3..] {
        if plane_distance(points[0], normal, p).abs() > COPLANAR_TOLERANCE {
            return Err(GeometryError::NotCoplanar);
        }
    }
    Ok(())
}

/// Arithmetic mean of the points; zero for an empty slice.
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::new(0.0, 0.0, 0.0);
    }
    let sum = points
        .iter()
        .fold(Point::new(0.0, 0.0, 0.0), |acc, &p| acc + p);
    sum / points.len() as f32
}

/// Axis-aligned bounding box, used by geometry import (camera framing)
/// and the dominant-plane UV projection at export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point,
    pub max: Point,
}

impl Aabb {
    /// Smallest box containing all points. Degenerates to a point box
    /// for a single position; returns a zero box for no points.
    pub fn from_points<'a, I: IntoIterator<Item = &'a Point>>(points: I) -> Self {
        let mut iter = points.into_iter();
        let first = match iter.next() {
            Some(&p) => p,
            None => Point::new(0.0, 0.0, 0.0),
        };
        let mut min = first;
        let mut max = first;
        for &p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Aabb { min, max }
    }

    pub fn center(&self) -> Point {
        (self.min + self.max) / 2.0
    }

    pub fn extents(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

/// Positions and undirected nearest-neighbor edges of a cubic lattice.
///
/// `dimension` nodes per axis, spanning `extent` world units, centered
/// on `center`. Nodes are emitted in z-outer, y-middle, x-inner order;
/// edges link axis-aligned neighbors only (no diagonals). Each edge
/// appears once, with `a < b`.
pub fn grid_lattice(
    center: Point,
    extent: f32,
    dimension: usize,
) -> (Vec<Point>, Vec<(usize, usize)>) {
    if dimension < 2 {
        return (vec![center], Vec::new());
    }
    let spacing = extent / (dimension - 1) as f32;
    let half = extent / 2.0;

    let mut points = Vec::with_capacity(dimension * dimension * dimension);
    for z in 0..dimension {
        for y in 0..dimension {
            for x in 0..dimension {
                points.push(Point::new(
                    center.x - half + x as f32 * spacing,
                    center.y - half + y as f32 * spacing,
                    center.z - half + z as f32 * spacing,
                ));
            }
        }
    }

    let index = |x: usize, y: usize, z: usize| z * dimension * dimension + y * dimension + x;
    let mut edges = Vec::new();
    for z in 0..dimension {
        for y in 0..dimension {
            for x in 0..dimension {
                let here = index(x, y, z);
                if x + 1 < dimension {
                    edges.push((here, index(x + 1, y, z)));
                }
                if y + 1 < dimension {
                    edges.push((here, index(x, y + 1, z)));
                }
                if z + 1 < dimension {
                    edges.push((here, index(x, y, z + 1)));
                }
            }
        }
    }
    (points, edges)
}
