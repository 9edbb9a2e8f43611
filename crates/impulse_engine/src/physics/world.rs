//! Physics world
//!
//! Owns the body arena, the spatial partition, and both solvers, and runs
//! the per-frame pass: normalize pending motion, rebuild the partition,
//! propose pairs, resolve contacts, update per-body contact lists, commit
//! motion. Solving is single-threaded and pass-oriented; bodies must not be
//! mutated while a pass runs.

use std::collections::HashMap;

use log::debug;

use crate::core::config::PhysicsConfig;
use crate::foundation::math::{Aabb, Vec2};
use crate::physics::body::{Body, BodyId, BodyType};
use crate::physics::body_set::BodySet;
use crate::physics::broad_phase::BroadPhaseContactSolver;
use crate::physics::contact::{Contact, ContactList};
use crate::physics::narrow_phase::NarrowPhaseContactSolver;
use crate::physics::shape::Shape;
use crate::spatial::{QuadTree, QuadTreeConfig};

/// Complete physics simulation state
pub struct PhysicsWorld {
    bodies: BodySet,
    tree: QuadTree,
    broad_phase: BroadPhaseContactSolver,
    narrow_phase: NarrowPhaseContactSolver,
    contact_lists: HashMap<BodyId, ContactList>,
    contacts: Vec<Contact>,
    frame: u64,
}

impl PhysicsWorld {
    /// Create a world from physics configuration
    pub fn new(config: &PhysicsConfig) -> Self {
        let bounds = Aabb::from_center_extents(Vec2::zeros(), config.world_extents());
        let tree_config = QuadTreeConfig {
            max_bodies_per_node: config.partition.max_bodies_per_node,
            max_depth: config.partition.max_depth,
            min_node_size: config.partition.min_node_size,
        };
        Self {
            bodies: BodySet::new(),
            tree: QuadTree::new(bounds, tree_config),
            broad_phase: BroadPhaseContactSolver::new(),
            narrow_phase: NarrowPhaseContactSolver::new(),
            contact_lists: HashMap::new(),
            contacts: Vec::new(),
            frame: 0,
        }
    }

    /// Allocate a new body and return its handle
    pub fn add_body(
        &mut self,
        body_type: BodyType,
        shape: Shape,
        position: Vec2,
        rotation: f32,
    ) -> BodyId {
        let id = self.bodies.insert(body_type, shape, position, rotation);
        self.contact_lists.insert(id, ContactList::new());
        id
    }

    /// Destroy a body and drop its contact bookkeeping
    pub fn remove_body(&mut self, id: BodyId) -> bool {
        self.contact_lists.remove(&id);
        self.tree.remove(id);
        self.bodies.remove(id).is_some()
    }

    /// Look up a body
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    /// Look up a body mutably (record motion between steps only)
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id)
    }

    /// Run one complete solve pass
    ///
    /// `delta_time` is the sub-step fraction applied to pending
    /// translations before anything is queried or committed.
    pub fn step(&mut self, delta_time: f32) {
        self.frame += 1;

        for body in self.bodies.iter_mut() {
            body.normalize_motion(delta_time);
        }

        self.tree.rebuild(&self.bodies);
        self.broad_phase.solve(&self.tree, &self.bodies, delta_time);

        while let Some(pair) = self.broad_phase.next() {
            let (Some(first), Some(second)) =
                (self.bodies.get(pair.first), self.bodies.get(pair.second))
            else {
                continue;
            };
            self.narrow_phase.solve(first, second);
        }

        self.contacts.clear();
        while let Some(contact) = self.narrow_phase.next() {
            self.contact_lists
                .entry(contact.first)
                .or_default()
                .add(contact.second, self.frame);
            self.contact_lists
                .entry(contact.second)
                .or_default()
                .add(contact.first, self.frame);
            self.contacts.push(contact);
        }

        for body in self.bodies.iter_mut() {
            body.apply_motion();
        }

        debug!(
            "frame {}: {} bodies, {} contacts",
            self.frame,
            self.bodies.len(),
            self.contacts.len()
        );
    }

    /// Contacts resolved by the most recent step
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Per-body contact bookkeeping
    pub fn contact_list(&self, id: BodyId) -> Option<&ContactList> {
        self.contact_lists.get(&id)
    }

    /// Bodies whose contact with `id` started this frame
    pub fn entering_contacts(&self, id: BodyId) -> Vec<BodyId> {
        self.contact_lists
            .get(&id)
            .map(|list| list.entering().collect())
            .unwrap_or_default()
    }

    /// Bodies whose contact with `id` ended this frame
    pub fn leaving_contacts(&self, id: BodyId) -> Vec<BodyId> {
        self.contact_lists
            .get(&id)
            .map(|list| list.leaving().collect())
            .unwrap_or_default()
    }

    /// Number of completed frames
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(&PhysicsConfig::default())
    }

    #[test]
    fn test_dynamic_into_static_produces_contact() {
        let mut world = world();
        let wall = world.add_body(
            BodyType::Static,
            Shape::rect(10.0, 10.0).unwrap(),
            Vec2::new(8.0, 0.0),
            0.0,
        );
        let mover = world.add_body(
            BodyType::Dynamic,
            Shape::rect(10.0, 10.0).unwrap(),
            Vec2::zeros(),
            0.0,
        );

        world.step(1.0);

        assert_eq!(world.contacts().len(), 1);
        let contact = world.contacts()[0];
        assert_eq!(contact.first, mover);
        assert_eq!(contact.second, wall);
        assert_relative_eq!(contact.translation.x.abs(), 2.0, epsilon = 1e-5);
        assert_relative_eq!(contact.translation.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_motion_is_committed_after_step() {
        let mut world = world();
        let mover = world.add_body(
            BodyType::Dynamic,
            Shape::rect(2.0, 2.0).unwrap(),
            Vec2::zeros(),
            0.0,
        );

        world.body_mut(mover).unwrap().translate(Vec2::new(3.0, 0.0));
        world.step(1.0);

        let body = world.body(mover).unwrap();
        assert_eq!(body.position(), Vec2::new(3.0, 0.0));
        assert!(!body.is_active());
    }

    #[test]
    fn test_sub_step_fraction_scales_translation() {
        let mut world = world();
        let mover = world.add_body(
            BodyType::Dynamic,
            Shape::rect(2.0, 2.0).unwrap(),
            Vec2::zeros(),
            0.0,
        );

        world.body_mut(mover).unwrap().translate(Vec2::new(10.0, 0.0));
        world.step(0.25);

        assert_relative_eq!(world.body(mover).unwrap().position().x, 2.5, epsilon = 1e-6);
    }

    #[test]
    fn test_entering_then_leaving_contacts() {
        let mut world = world();
        let near_wall = world.add_body(
            BodyType::Static,
            Shape::rect(10.0, 10.0).unwrap(),
            Vec2::new(8.0, 0.0),
            0.0,
        );
        let far_wall = world.add_body(
            BodyType::Static,
            Shape::rect(10.0, 10.0).unwrap(),
            Vec2::new(58.0, 0.0),
            0.0,
        );
        let mover = world.add_body(
            BodyType::Dynamic,
            Shape::rect(10.0, 10.0).unwrap(),
            Vec2::zeros(),
            0.0,
        );

        // Frame 1: overlapping the near wall; registers for both endpoints
        world.step(1.0);
        assert_eq!(world.entering_contacts(mover), vec![near_wall]);
        assert_eq!(world.entering_contacts(near_wall), vec![mover]);

        // Frame 2 solves on pre-motion geometry (still the near wall), then
        // commits the jump over to the far wall
        world.body_mut(mover).unwrap().translate(Vec2::new(50.0, 0.0));
        world.step(1.0);

        // Frame 3: the far-wall contact rolls the buffers, exposing the
        // near wall as leaving
        world.body_mut(mover).unwrap().translate(Vec2::new(0.1, 0.0));
        world.step(1.0);

        assert_eq!(world.leaving_contacts(mover), vec![near_wall]);
        assert_eq!(world.entering_contacts(mover), vec![far_wall]);
    }

    #[test]
    fn test_sensor_reports_idle_overlap_every_frame() {
        let mut world = world();
        let zone = world.add_body(
            BodyType::Sensor,
            Shape::rect(10.0, 10.0).unwrap(),
            Vec2::zeros(),
            0.0,
        );
        let mover = world.add_body(
            BodyType::Dynamic,
            Shape::rect(4.0, 4.0).unwrap(),
            Vec2::new(3.0, 0.0),
            0.0,
        );

        world.step(1.0);
        world.step(1.0);
        world.step(1.0);

        // The dynamic went idle after frame 1, but the sensor keeps seeing it
        assert_eq!(world.contacts().len(), 1);
        let contact = world.contacts()[0];
        assert_eq!(contact.first, zone);
        assert_eq!(contact.second, mover);
        assert_eq!(contact.translation, Vec2::zeros());
    }

    #[test]
    fn test_removed_body_stops_colliding() {
        let mut world = world();
        world.add_body(
            BodyType::Static,
            Shape::rect(10.0, 10.0).unwrap(),
            Vec2::new(8.0, 0.0),
            0.0,
        );
        let mover = world.add_body(
            BodyType::Dynamic,
            Shape::rect(10.0, 10.0).unwrap(),
            Vec2::zeros(),
            0.0,
        );

        world.step(1.0);
        assert_eq!(world.contacts().len(), 1);

        assert!(world.remove_body(mover));
        world.step(1.0);
        assert!(world.contacts().is_empty());
        assert_eq!(world.body_count(), 1);
    }
}
