//! Collision shapes
//!
//! Geometric primitives owned by bodies: circles and convex polygons.
//! Shapes cache their world-space data (vertices, SAT axes, bounding box)
//! and are mutated in place every frame rather than reallocated.

use thiserror::Error;

use crate::foundation::math::{self, Aabb, Vec2};

/// Shape construction errors
///
/// All of these are configuration errors: fatal to the construction call,
/// never retried. The caller must fix its inputs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// A polygon needs at least three vertices
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// The vertex list does not describe a convex polygon
    #[error("polygon vertices do not form a convex hull")]
    NotConvex,

    /// Circle radius must be strictly positive
    #[error("circle radius must be positive, got {0}")]
    InvalidRadius(f32),
}

/// Circle shape with cached world-space center
#[derive(Debug, Clone)]
pub struct Circle {
    /// Center offset in body-local space
    local_center: Vec2,
    /// Center in world space, updated on every transform
    world_center: Vec2,
    /// Radius in world units
    radius: f32,
    /// Cached world-space bounding box
    bounds: Aabb,
}

impl Circle {
    /// World-space center
    pub fn center(&self) -> Vec2 {
        self.world_center
    }

    /// Radius
    pub fn radius(&self) -> f32 {
        self.radius
    }
}

/// Convex polygon shape with cached world-space vertices and SAT axes
#[derive(Debug, Clone)]
pub struct Polygon {
    /// Vertices in body-local space, immutable after construction
    local_vertices: Vec<Vec2>,
    /// Vertices in world space, recomputed on every transform
    world_vertices: Vec<Vec2>,
    /// World-space edge normals used as separating axes
    axes: Vec<Vec2>,
    /// Cached world-space bounding box
    bounds: Aabb,
}

impl Polygon {
    /// World-space vertices
    pub fn world_vertices(&self) -> &[Vec2] {
        &self.world_vertices
    }

    /// World-space separating axes (edge normals)
    pub fn axes(&self) -> &[Vec2] {
        &self.axes
    }
}

/// Collision shape owned by a body
#[derive(Debug, Clone)]
pub enum Shape {
    /// A circle (cheapest narrow-phase tests)
    Circle(Circle),
    /// A convex polygon (full SAT)
    Polygon(Polygon),
}

impl Shape {
    /// Create a circle shape centered on the body origin
    pub fn circle(radius: f32) -> Result<Self, ShapeError> {
        if radius <= 0.0 || !radius.is_finite() {
            return Err(ShapeError::InvalidRadius(radius));
        }
        Ok(Self::Circle(Circle {
            local_center: Vec2::zeros(),
            world_center: Vec2::zeros(),
            radius,
            bounds: Aabb::from_center_extents(Vec2::zeros(), Vec2::new(radius, radius)),
        }))
    }

    /// Create a convex polygon shape from body-local vertices
    ///
    /// Rejects vertex lists with fewer than three entries and lists that do
    /// not form a convex hull. Convexity is verified by requiring a uniform
    /// sign across the cross products of consecutive edges, so concave and
    /// self-intersecting outlines both fail here instead of producing a
    /// malformed shape.
    pub fn polygon(vertices: Vec<Vec2>) -> Result<Self, ShapeError> {
        if vertices.len() < 3 {
            return Err(ShapeError::TooFewVertices(vertices.len()));
        }

        let n = vertices.len();
        let mut sign = 0.0f32;
        for i in 0..n {
            let e1 = vertices[(i + 1) % n] - vertices[i];
            let e2 = vertices[(i + 2) % n] - vertices[(i + 1) % n];
            if e1.norm_squared() == 0.0 {
                // A repeated vertex would yield an unnormalizable axis
                return Err(ShapeError::NotConvex);
            }
            let c = math::cross(e1, e2);
            if c != 0.0 {
                if sign != 0.0 && c.signum() != sign {
                    return Err(ShapeError::NotConvex);
                }
                sign = c.signum();
            }
        }
        if sign == 0.0 {
            // All vertices collinear: zero-area outline
            return Err(ShapeError::NotConvex);
        }

        let world_vertices = vertices.clone();
        let axes = Self::axes_from(&world_vertices);
        let bounds = Aabb::from_points(&world_vertices);
        Ok(Self::Polygon(Polygon {
            local_vertices: vertices,
            world_vertices,
            axes,
            bounds,
        }))
    }

    /// Create an axis-aligned box polygon of the given full width and height
    pub fn rect(width: f32, height: f32) -> Result<Self, ShapeError> {
        let hw = width * 0.5;
        let hh = height * 0.5;
        Self::polygon(vec![
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ])
    }

    fn axes_from(world_vertices: &[Vec2]) -> Vec<Vec2> {
        let n = world_vertices.len();
        (0..n)
            .map(|i| {
                let edge = world_vertices[(i + 1) % n] - world_vertices[i];
                math::perp(edge).normalize()
            })
            .collect()
    }

    /// Recompute the world-space cache for a new pose
    ///
    /// This is the expensive path: every vertex is rotated, the axes are
    /// rebuilt from the new edges, and the bounding box is refit.
    pub fn apply_transform(&mut self, position: Vec2, rotation: f32) {
        match self {
            Self::Circle(circle) => {
                circle.world_center = position + math::rotate(circle.local_center, rotation);
                circle.bounds = Aabb::from_center_extents(
                    circle.world_center,
                    Vec2::new(circle.radius, circle.radius),
                );
            }
            Self::Polygon(polygon) => {
                for (world, local) in polygon
                    .world_vertices
                    .iter_mut()
                    .zip(polygon.local_vertices.iter())
                {
                    *world = position + math::rotate(*local, rotation);
                }
                polygon.axes = Self::axes_from(&polygon.world_vertices);
                polygon.bounds = Aabb::from_points(&polygon.world_vertices);
            }
        }
    }

    /// Shift the world-space cache by a delta without re-deriving rotation
    ///
    /// Valid only while the rotation is unchanged: vertices and bounds
    /// translate, edge normals stay as they are.
    pub fn apply_translation(&mut self, delta: Vec2) {
        match self {
            Self::Circle(circle) => {
                circle.world_center += delta;
                circle.bounds = circle.bounds.translated(delta);
            }
            Self::Polygon(polygon) => {
                for world in &mut polygon.world_vertices {
                    *world += delta;
                }
                polygon.bounds = polygon.bounds.translated(delta);
            }
        }
    }

    /// Cached world-space bounding box
    pub fn bounds(&self) -> Aabb {
        match self {
            Self::Circle(circle) => circle.bounds,
            Self::Polygon(polygon) => polygon.bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_rejects_too_few_vertices() {
        let result = Shape::polygon(vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)]);
        assert_eq!(result.unwrap_err(), ShapeError::TooFewVertices(2));
    }

    #[test]
    fn test_polygon_rejects_concave_outline() {
        // Arrowhead: the notch at (0.5, 0.5) flips the cross-product sign
        let result = Shape::polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.5, 0.5),
            Vec2::new(0.0, 2.0),
        ]);
        assert_eq!(result.unwrap_err(), ShapeError::NotConvex);
    }

    #[test]
    fn test_polygon_rejects_self_intersecting_outline() {
        // Bowtie quad
        let result = Shape::polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 2.0),
        ]);
        assert_eq!(result.unwrap_err(), ShapeError::NotConvex);
    }

    #[test]
    fn test_polygon_rejects_collinear_vertices() {
        let result = Shape::polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
        ]);
        assert_eq!(result.unwrap_err(), ShapeError::NotConvex);
    }

    #[test]
    fn test_circle_rejects_nonpositive_radius() {
        assert!(matches!(Shape::circle(0.0), Err(ShapeError::InvalidRadius(_))));
        assert!(matches!(Shape::circle(-1.5), Err(ShapeError::InvalidRadius(_))));
    }

    #[test]
    fn test_transform_then_translation_agree() {
        let mut by_transform = Shape::rect(2.0, 2.0).unwrap();
        let mut by_translation = Shape::rect(2.0, 2.0).unwrap();

        by_transform.apply_transform(Vec2::zeros(), 0.0);
        by_translation.apply_transform(Vec2::zeros(), 0.0);

        by_transform.apply_transform(Vec2::new(3.0, -1.0), 0.0);
        by_translation.apply_translation(Vec2::new(3.0, -1.0));

        let (Shape::Polygon(a), Shape::Polygon(b)) = (&by_transform, &by_translation) else {
            panic!("expected polygons");
        };
        for (va, vb) in a.world_vertices().iter().zip(b.world_vertices()) {
            assert!((va - vb).norm() < 1e-6);
        }
        assert_eq!(by_transform.bounds(), by_translation.bounds());
    }

    #[test]
    fn test_box_axes_are_cardinal() {
        let mut shape = Shape::rect(4.0, 4.0).unwrap();
        shape.apply_transform(Vec2::new(10.0, 10.0), 0.0);

        let Shape::Polygon(polygon) = &shape else { panic!("expected polygon") };
        for axis in polygon.axes() {
            assert!(
                axis.x.abs() > 0.999 && axis.y.abs() < 1e-6
                    || axis.y.abs() > 0.999 && axis.x.abs() < 1e-6
            );
        }
    }

    #[test]
    fn test_rotation_refits_bounds() {
        let mut shape = Shape::rect(2.0, 2.0).unwrap();
        shape.apply_transform(Vec2::zeros(), std::f32::consts::FRAC_PI_4);

        // A unit half-extent box rotated 45 degrees spans sqrt(2) on each axis
        let extents = shape.bounds().extents();
        assert!((extents.x - 2.0f32.sqrt()).abs() < 1e-4);
        assert!((extents.y - 2.0f32.sqrt()).abs() < 1e-4);
    }
}
