//! Narrow-phase contact solving
//!
//! Resolves candidate pairs into exact contacts using the separating axis
//! theorem. Polygon pairs scan both bodies' edge normals, polygon-circle
//! pairs add one axis through the nearest vertex, and circle pairs use the
//! closed form. Every resolved contact carries the minimum-translation
//! vector that separates the pair.

use crate::foundation::math::Vec2;
use crate::physics::body::{Body, BodyType};
use crate::physics::contact::Contact;
use crate::physics::shape::{Circle, Polygon, Shape};

/// Overlaps smaller than this are ignored to keep near-tangent
/// polygon-circle contacts from snapping frame to frame.
const CONTACT_EPSILON: f32 = 0.005;

/// Pairing table indexed by [`BodyType`] ordinal (static, dynamic, sensor).
/// Anything not explicitly allowed short-circuits before geometry runs.
const PAIRING: [[bool; 3]; 3] = [
    [false, true, false], // static: dynamic only
    [true, true, true],   // dynamic: static, dynamic, sensor
    [false, true, false], // sensor: dynamic only
];

/// Whether a body-type pairing is ever resolved
pub fn pairing_allowed(a: BodyType, b: BodyType) -> bool {
    PAIRING[a.ordinal()][b.ordinal()]
}

/// Resolves candidate pairs into contacts with minimum-translation vectors
#[derive(Debug, Default)]
pub struct NarrowPhaseContactSolver {
    contacts: Vec<Contact>,
}

impl NarrowPhaseContactSolver {
    /// Create an empty solver
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve one candidate pair
    ///
    /// Returns whether a contact was produced. The queued contact is
    /// canonicalized so that `first` is the sensor-or-dynamic member and
    /// the translation moves `first` away from `second`; pairs involving a
    /// sensor always yield a zero translation, the touch fact alone.
    pub fn solve(&mut self, body_a: &Body, body_b: &Body) -> bool {
        if !pairing_allowed(body_a.body_type(), body_b.body_type()) {
            return false;
        }

        let (first, second) =
            if body_a.body_type() == BodyType::Static || body_b.body_type() == BodyType::Sensor {
                (body_b, body_a)
            } else {
                (body_a, body_b)
            };

        let Some(translation) = resolve_shapes(first, second) else {
            return false;
        };

        let sensor_pair = first.body_type() == BodyType::Sensor
            || second.body_type() == BodyType::Sensor;
        self.contacts.push(Contact {
            first: first.id(),
            second: second.id(),
            translation: if sensor_pair { Vec2::zeros() } else { translation },
        });
        true
    }

    /// Pop the most recently resolved contact (LIFO, mirrors the broad
    /// phase's pop contract)
    pub fn next(&mut self) -> Option<Contact> {
        self.contacts.pop()
    }

    /// Whether unconsumed contacts remain
    pub fn contains_contacts(&self) -> bool {
        !self.contacts.is_empty()
    }

    /// Number of unconsumed contacts
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Whether the contact queue is empty
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

/// Dispatch on the shape pair; returns the translation separating `first`
/// from `second`, or `None` when a separating axis exists.
fn resolve_shapes(first: &Body, second: &Body) -> Option<Vec2> {
    let offset = first.position() - second.position();
    match (first.shape(), second.shape()) {
        (Shape::Polygon(a), Shape::Polygon(b)) => solve_polygon_polygon(a, b, offset),
        (Shape::Polygon(polygon), Shape::Circle(circle))
        | (Shape::Circle(circle), Shape::Polygon(polygon)) => {
            solve_polygon_circle(polygon, circle, offset)
        }
        (Shape::Circle(a), Shape::Circle(b)) => solve_circle_circle(a, b),
    }
}

/// Project vertices onto an axis, returning the covered interval
fn project(vertices: &[Vec2], axis: Vec2) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for vertex in vertices {
        let p = vertex.dot(&axis);
        min = min.min(p);
        max = max.max(p);
    }
    (min, max)
}

fn interval_overlap(a: (f32, f32), b: (f32, f32)) -> f32 {
    a.1.min(b.1) - a.0.max(b.0)
}

/// Flip the axis so it points along the first-minus-second offset, making
/// the translation push `first` away from `second`
fn orient(axis: Vec2, offset: Vec2) -> Vec2 {
    if axis.dot(&offset) < 0.0 {
        -axis
    } else {
        axis
    }
}

/// Classic SAT over both polygons' edge normals
fn solve_polygon_polygon(a: &Polygon, b: &Polygon, offset: Vec2) -> Option<Vec2> {
    let mut mt = f32::INFINITY;
    let mut mta = Vec2::zeros();

    for &axis in a.axes().iter().chain(b.axes().iter()) {
        let overlap = interval_overlap(
            project(a.world_vertices(), axis),
            project(b.world_vertices(), axis),
        );
        if overlap <= 0.0 {
            return None; // separating axis
        }
        if overlap < mt {
            mt = overlap;
            mta = axis;
        }
    }

    Some(orient(mta, offset) * mt)
}

/// SAT with the polygon's normals plus one axis through the vertex nearest
/// the circle center
fn solve_polygon_circle(polygon: &Polygon, circle: &Circle, offset: Vec2) -> Option<Vec2> {
    let center = circle.center();
    let radius = circle.radius();

    let nearest = polygon
        .world_vertices()
        .iter()
        .copied()
        .min_by(|a, b| {
            let da = (a - center).norm_squared();
            let db = (b - center).norm_squared();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .expect("polygon construction guarantees vertices");

    let mut axes: Vec<Vec2> = polygon.axes().to_vec();
    let to_nearest = nearest - center;
    if to_nearest.norm_squared() > f32::EPSILON {
        axes.push(to_nearest.normalize());
    }

    let mut mt = f32::INFINITY;
    let mut mta = Vec2::zeros();
    for axis in axes {
        let c = center.dot(&axis);
        let overlap = interval_overlap(
            project(polygon.world_vertices(), axis),
            (c - radius, c + radius),
        );
        if overlap <= 0.0 {
            return None;
        }
        if overlap < mt {
            mt = overlap;
            mta = axis;
        }
    }

    if mt < CONTACT_EPSILON {
        return None; // near-tangent: ignore instead of jittering
    }

    Some(orient(mta, offset) * mt)
}

/// Closed-form circle pair: translation magnitude is exactly the radius sum
/// minus the center distance
fn solve_circle_circle(a: &Circle, b: &Circle) -> Option<Vec2> {
    let diff = a.center() - b.center();
    let radius_sum = a.radius() + b.radius();
    let distance_sq = diff.norm_squared();
    if distance_sq >= radius_sum * radius_sum {
        return None;
    }

    let distance = distance_sq.sqrt();
    let direction = if distance > f32::EPSILON {
        diff / distance
    } else {
        // Concentric centers have no meaningful axis; pick one
        Vec2::new(1.0, 0.0)
    };
    Some(direction * (radius_sum - distance))
}
