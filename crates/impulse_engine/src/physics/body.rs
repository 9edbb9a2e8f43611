//! Physical bodies
//!
//! A body wraps a shape with a pose and a pending-motion state. Motion is
//! recorded first and committed later so the broad phase can query
//! speculative bounds before anything actually moves.

use crate::foundation::math::{Aabb, Vec2};
use crate::physics::shape::Shape;

/// Stable body handle issued by [`BodySet`](crate::physics::BodySet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub(crate) u32);

impl BodyId {
    /// Raw index value of the handle
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Physical role of a body
///
/// The role is fixed at setup and drives both broad-phase bucketing and the
/// narrow-phase pairing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyType {
    /// Immovable obstacle; never accepts motion
    Static,
    /// Moving, collision-resolved body
    Dynamic,
    /// Overlap detector; reports touches but never receives a response vector
    Sensor,
}

impl BodyType {
    /// Ordinal used to index the narrow-phase pairing table
    pub(crate) fn ordinal(self) -> usize {
        match self {
            Self::Static => 0,
            Self::Dynamic => 1,
            Self::Sensor => 2,
        }
    }
}

/// Pending motion recorded on a body
///
/// Exactly one kind of motion can be pending at a time; recording one kind
/// replaces the other. `Translating` carries deltas, `Transforming` carries
/// an absolute target pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// No pending motion
    Idle,
    /// Relative motion awaiting commit
    Translating {
        /// Positional delta
        delta: Vec2,
        /// Rotational delta in radians
        angle: f32,
    },
    /// Absolute repositioning awaiting commit
    Transforming {
        /// Target position
        position: Vec2,
        /// Target rotation in radians
        angle: f32,
    },
}

/// A physical entity: shape, pose, and pending motion
#[derive(Debug, Clone)]
pub struct Body {
    id: BodyId,
    body_type: BodyType,
    shape: Shape,
    position: Vec2,
    rotation: f32,
    motion: Motion,
    normalized: bool,
    /// Speculative bounds covering the current pose plus pending motion
    transform_bounds: Aabb,
}

impl Body {
    /// Set up a body at a pose
    ///
    /// Dynamic bodies start with a zero pending translation so the very
    /// first broad-phase pass already sees a valid speculative bound.
    pub(crate) fn new(
        id: BodyId,
        body_type: BodyType,
        mut shape: Shape,
        position: Vec2,
        rotation: f32,
    ) -> Self {
        shape.apply_transform(position, rotation);
        let bounds = shape.bounds();
        let motion = if body_type == BodyType::Dynamic {
            Motion::Translating { delta: Vec2::zeros(), angle: 0.0 }
        } else {
            Motion::Idle
        };
        Self {
            id,
            body_type,
            shape,
            position,
            rotation,
            motion,
            normalized: false,
            transform_bounds: bounds,
        }
    }

    /// Stable handle of this body
    pub fn id(&self) -> BodyId {
        self.id
    }

    /// Physical role
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// Owned collision shape
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Current committed position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current committed rotation in radians
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Committed world-space bounds of the shape
    pub fn bounds(&self) -> Aabb {
        self.shape.bounds()
    }

    /// Speculative bounds covering committed pose plus pending motion
    pub fn transform_bounds(&self) -> Aabb {
        self.transform_bounds
    }

    /// Pending motion state
    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// Whether this body has pending motion this frame
    pub fn is_active(&self) -> bool {
        self.motion != Motion::Idle
    }

    /// Bounds used when inserting into the spatial partition
    ///
    /// Statics rest where they are; everything else is indexed by its
    /// speculative bound so pending motion is already visible to queries.
    pub fn broad_bounds(&self) -> Aabb {
        match self.body_type {
            BodyType::Static => self.bounds(),
            BodyType::Dynamic | BodyType::Sensor => self.transform_bounds,
        }
    }

    /// Record a relative translation
    ///
    /// Replaces any pending absolute transform; accumulates onto a pending
    /// translation. Static bodies ignore the call.
    pub fn translate(&mut self, delta: Vec2) {
        if self.body_type == BodyType::Static {
            return;
        }
        self.motion = match self.motion {
            Motion::Translating { delta: pending, angle } => Motion::Translating {
                delta: pending + delta,
                angle,
            },
            _ => Motion::Translating { delta, angle: 0.0 },
        };
        self.update_transform_bounds();
    }

    /// Record a relative rotation in radians
    ///
    /// Same replacement rule as [`Self::translate`].
    pub fn rotate_by(&mut self, angle: f32) {
        if self.body_type == BodyType::Static {
            return;
        }
        self.motion = match self.motion {
            Motion::Translating { delta, angle: pending } => Motion::Translating {
                delta,
                angle: pending + angle,
            },
            _ => Motion::Translating { delta: Vec2::zeros(), angle },
        };
        self.update_transform_bounds();
    }

    /// Record an absolute target pose
    ///
    /// Replaces any pending translation. Static bodies ignore the call.
    pub fn transform_to(&mut self, position: Vec2, angle: f32) {
        if self.body_type == BodyType::Static {
            return;
        }
        self.motion = Motion::Transforming { position, angle };
        self.update_transform_bounds();
    }

    /// Scale the pending translation by a sub-step fraction
    ///
    /// Runs at most once per frame; repeated calls before the next commit
    /// are ignored so the delta is never scaled twice. Absolute transforms
    /// are targets, not rates, and are left untouched.
    pub fn normalize_motion(&mut self, fraction: f32) {
        if self.normalized {
            return;
        }
        self.normalized = true;
        if let Motion::Translating { delta, angle } = self.motion {
            self.motion = Motion::Translating {
                delta: delta * fraction,
                angle: angle * fraction,
            };
            self.update_transform_bounds();
        }
    }

    /// Commit pending motion into the pose and the shape's world cache
    ///
    /// A pure translation takes the cheap vertex-shift path; any rotation
    /// forces a full re-transform. Afterwards the speculative bound
    /// collapses onto the real one.
    pub fn apply_motion(&mut self) {
        match self.motion {
            Motion::Idle => {}
            Motion::Translating { delta, angle } => {
                self.position += delta;
                self.rotation += angle;
                if angle == 0.0 {
                    self.shape.apply_translation(delta);
                } else {
                    self.shape.apply_transform(self.position, self.rotation);
                }
            }
            Motion::Transforming { position, angle } => {
                self.position = position;
                self.rotation = angle;
                self.shape.apply_transform(position, angle);
            }
        }
        self.motion = Motion::Idle;
        self.normalized = false;
        self.transform_bounds = self.shape.bounds();
    }

    fn update_transform_bounds(&mut self) {
        let bounds = self.shape.bounds();
        self.transform_bounds = match self.motion {
            Motion::Idle => bounds,
            Motion::Translating { delta, .. } => bounds.union(&bounds.translated(delta)),
            Motion::Transforming { position, .. } => {
                bounds.union(&bounds.translated(position - self.position))
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dynamic_box(id: u32) -> Body {
        Body::new(
            BodyId(id),
            BodyType::Dynamic,
            Shape::rect(2.0, 2.0).unwrap(),
            Vec2::zeros(),
            0.0,
        )
    }

    #[test]
    fn test_static_ignores_motion() {
        let mut body = Body::new(
            BodyId(0),
            BodyType::Static,
            Shape::rect(2.0, 2.0).unwrap(),
            Vec2::zeros(),
            0.0,
        );
        body.translate(Vec2::new(5.0, 0.0));
        body.transform_to(Vec2::new(5.0, 5.0), 1.0);

        assert!(!body.is_active());
        assert_eq!(body.position(), Vec2::zeros());
    }

    #[test]
    fn test_dynamic_starts_active_with_valid_bounds() {
        let body = dynamic_box(1);
        assert!(body.is_active());
        assert_eq!(body.transform_bounds(), body.bounds());
    }

    #[test]
    fn test_translate_replaces_pending_transform() {
        let mut body = dynamic_box(1);
        body.transform_to(Vec2::new(10.0, 0.0), 0.5);
        body.translate(Vec2::new(1.0, 0.0));

        assert_eq!(
            body.motion(),
            Motion::Translating { delta: Vec2::new(1.0, 0.0), angle: 0.0 }
        );
    }

    #[test]
    fn test_transform_replaces_pending_translation() {
        let mut body = dynamic_box(1);
        body.translate(Vec2::new(1.0, 0.0));
        body.transform_to(Vec2::new(10.0, 0.0), 0.5);

        assert_eq!(
            body.motion(),
            Motion::Transforming { position: Vec2::new(10.0, 0.0), angle: 0.5 }
        );
    }

    #[test]
    fn test_translations_accumulate() {
        let mut body = dynamic_box(1);
        body.translate(Vec2::new(1.0, 0.0));
        body.translate(Vec2::new(0.0, 2.0));

        assert_eq!(
            body.motion(),
            Motion::Translating { delta: Vec2::new(1.0, 2.0), angle: 0.0 }
        );
    }

    #[test]
    fn test_normalize_scales_exactly_once() {
        let mut body = dynamic_box(1);
        body.translate(Vec2::new(10.0, 0.0));
        body.normalize_motion(0.5);
        body.normalize_motion(0.5);

        assert_eq!(
            body.motion(),
            Motion::Translating { delta: Vec2::new(5.0, 0.0), angle: 0.0 }
        );
    }

    #[test]
    fn test_apply_commits_translation_and_clears_state() {
        let mut body = dynamic_box(1);
        body.translate(Vec2::new(3.0, 4.0));
        body.apply_motion();

        assert_eq!(body.position(), Vec2::new(3.0, 4.0));
        assert!(!body.is_active());
        assert_eq!(body.transform_bounds(), body.bounds());

        // The guard resets with the commit, so next frame normalizes again
        body.translate(Vec2::new(10.0, 0.0));
        body.normalize_motion(0.1);
        assert_eq!(
            body.motion(),
            Motion::Translating { delta: Vec2::new(1.0, 0.0), angle: 0.0 }
        );
    }

    #[test]
    fn test_transform_bounds_cover_pending_motion() {
        let mut body = dynamic_box(1);
        body.translate(Vec2::new(6.0, 0.0));

        let speculative = body.transform_bounds();
        assert!(speculative.contains_point(Vec2::new(-1.0, 0.0)));
        assert!(speculative.contains_point(Vec2::new(7.0, 0.0)));
    }

    #[test]
    fn test_rotation_takes_full_transform_path() {
        let mut body = dynamic_box(1);
        body.rotate_by(std::f32::consts::FRAC_PI_4);
        body.apply_motion();

        // Rotated unit box must have refit (wider) bounds
        assert!(body.bounds().extents().x > 1.0);
    }
}
