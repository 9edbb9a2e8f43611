//! # Impulse Engine
//!
//! A 2D game engine core built around two subsystems:
//!
//! - **Physics**: a two-phase collision pipeline — quadtree broad phase
//!   proposing candidate pairs, SAT narrow phase resolving them into
//!   minimum-translation contacts — with per-body contact bookkeeping.
//! - **Protocol**: a compact self-describing binary wire format with
//!   type-tagged headers, null-masked optional fields, and per-type value
//!   serializers, plus the client connection lifecycle.
//!
//! ## Quick Start
//!
//! ```rust
//! use impulse_engine::prelude::*;
//!
//! let mut world = PhysicsWorld::new(&PhysicsConfig::default());
//!
//! let wall = world.add_body(
//!     BodyType::Static,
//!     Shape::rect(10.0, 10.0)?,
//!     Vec2::new(8.0, 0.0),
//!     0.0,
//! );
//! let player = world.add_body(
//!     BodyType::Dynamic,
//!     Shape::rect(10.0, 10.0)?,
//!     Vec2::zeros(),
//!     0.0,
//! );
//!
//! world.step(1.0 / 60.0);
//! assert_eq!(world.entering_contacts(player), vec![wall]);
//! # Ok::<(), impulse_engine::physics::ShapeError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;
pub mod foundation;
pub mod physics;
pub mod protocol;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::core::config::{Config, EngineConfig, PhysicsConfig, ProtocolConfig};
    pub use crate::foundation::math::{Aabb, Vec2};
    pub use crate::physics::{
        Body, BodyId, BodyType, BroadPhaseContactSolver, Contact, ContactPair,
        NarrowPhaseContactSolver, PhysicsWorld, Shape,
    };
    pub use crate::protocol::{
        ProtocolError, WireBuffer, WireMessage, WireValue,
    };
    pub use crate::spatial::{QuadTree, QuadTreeConfig};
}
