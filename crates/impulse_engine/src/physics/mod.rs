//! Physics module: two-phase collision detection
//!
//! The broad phase walks the spatial partition and proposes candidate
//! pairs by bounding-box overlap; the narrow phase resolves each pair with
//! the separating axis theorem into exact minimum-translation contacts.
//! [`PhysicsWorld`] ties the pipeline together into one per-frame pass.

pub mod body;
pub mod body_set;
pub mod broad_phase;
pub mod contact;
pub mod narrow_phase;
pub mod shape;
pub mod world;

pub use body::{Body, BodyId, BodyType, Motion};
pub use body_set::BodySet;
pub use broad_phase::BroadPhaseContactSolver;
pub use contact::{Contact, ContactList, ContactPair};
pub use narrow_phase::{pairing_allowed, NarrowPhaseContactSolver};
pub use shape::{Shape, ShapeError};
pub use world::PhysicsWorld;
