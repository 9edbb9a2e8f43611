//! Quadtree spatial partitioning structure
//!
//! Divides 2D space into hierarchical quadrants for broad-phase collision
//! queries. Leaves bucket occupants by body type so the broad phase can walk
//! each pairing rule directly instead of filtering a mixed list. A node
//! subdivides when its occupancy exceeds a threshold.

use crate::foundation::math::{Aabb, Vec2};
use crate::physics::body::{BodyId, BodyType};
use crate::physics::body_set::BodySet;

/// Configuration for quadtree behavior
#[derive(Debug, Clone)]
pub struct QuadTreeConfig {
    /// Maximum bodies per leaf before subdivision
    pub max_bodies_per_node: usize,

    /// Maximum subdivision depth
    pub max_depth: u32,

    /// Minimum node size (prevents excessive subdivision)
    pub min_node_size: f32,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            max_bodies_per_node: 8,
            max_depth: 8,
            min_node_size: 1.0,
        }
    }
}

/// Single node in the quadtree hierarchy
///
/// A leaf holds three disjoint id buckets; a split node holds four children
/// and no ids of its own. Body data itself stays in the owning
/// [`BodySet`] — the tree stores handles only.
#[derive(Debug, Clone)]
pub struct QuadTreeNode {
    bounds: Aabb,
    depth: u32,
    statics: Vec<BodyId>,
    dynamics: Vec<BodyId>,
    sensors: Vec<BodyId>,
    children: Option<Box<[QuadTreeNode; 4]>>,
}

impl QuadTreeNode {
    /// Create a new leaf node
    fn new(bounds: Aabb, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            statics: Vec::new(),
            dynamics: Vec::new(),
            sensors: Vec::new(),
            children: None,
        }
    }

    /// World-space region covered by this node
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Whether this node has been split into quadrants
    pub fn is_split(&self) -> bool {
        self.children.is_some()
    }

    /// Static occupants of this leaf
    pub fn statics(&self) -> &[BodyId] {
        &self.statics
    }

    /// Dynamic occupants of this leaf
    pub fn dynamics(&self) -> &[BodyId] {
        &self.dynamics
    }

    /// Sensor occupants of this leaf
    pub fn sensors(&self) -> &[BodyId] {
        &self.sensors
    }

    fn occupancy(&self) -> usize {
        self.statics.len() + self.dynamics.len() + self.sensors.len()
    }

    fn bucket_mut(&mut self, body_type: BodyType) -> &mut Vec<BodyId> {
        match body_type {
            BodyType::Static => &mut self.statics,
            BodyType::Dynamic => &mut self.dynamics,
            BodyType::Sensor => &mut self.sensors,
        }
    }

    /// Split into four quadrants: top-left, top-right, bottom-right,
    /// bottom-left
    fn subdivide(&mut self, bodies: &BodySet, config: &QuadTreeConfig) {
        if self.children.is_some() {
            return;
        }

        let center = self.bounds.center();
        let quarter = self.bounds.extents() * 0.5;
        let depth = self.depth + 1;
        let child = |offset: Vec2| {
            QuadTreeNode::new(Aabb::from_center_extents(center + offset, quarter), depth)
        };
        self.children = Some(Box::new([
            child(Vec2::new(-quarter.x, quarter.y)),
            child(Vec2::new(quarter.x, quarter.y)),
            child(Vec2::new(quarter.x, -quarter.y)),
            child(Vec2::new(-quarter.x, -quarter.y)),
        ]));

        // Redistribute occupants through the body table; a body spanning
        // multiple quadrants lands in each of them.
        let statics = std::mem::take(&mut self.statics);
        let dynamics = std::mem::take(&mut self.dynamics);
        let sensors = std::mem::take(&mut self.sensors);
        for id in statics.into_iter().chain(dynamics).chain(sensors) {
            if let Some(body) = bodies.get(id) {
                self.insert(id, body.body_type(), &body.broad_bounds(), bodies, config);
            }
        }
    }

    fn insert(
        &mut self,
        id: BodyId,
        body_type: BodyType,
        body_bounds: &Aabb,
        bodies: &BodySet,
        config: &QuadTreeConfig,
    ) {
        if !self.bounds.intersects(body_bounds) {
            return;
        }

        if let Some(children) = &mut self.children {
            for child in children.iter_mut() {
                child.insert(id, body_type, body_bounds, bodies, config);
            }
            return;
        }

        let should_subdivide = self.occupancy() >= config.max_bodies_per_node
            && self.depth < config.max_depth
            && self.bounds.extents().x > config.min_node_size;

        if should_subdivide {
            self.subdivide(bodies, config);
            if let Some(children) = &mut self.children {
                for child in children.iter_mut() {
                    child.insert(id, body_type, body_bounds, bodies, config);
                }
            }
            return;
        }

        self.bucket_mut(body_type).push(id);
    }

    fn remove(&mut self, id: BodyId) {
        if let Some(children) = &mut self.children {
            for child in children.iter_mut() {
                child.remove(id);
            }
            return;
        }
        self.statics.retain(|&other| other != id);
        self.dynamics.retain(|&other| other != id);
        self.sensors.retain(|&other| other != id);
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a QuadTreeNode>) {
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.collect_leaves(leaves);
            }
        } else {
            leaves.push(self);
        }
    }
}

/// Quadtree spatial partitioning structure
#[derive(Debug, Clone)]
pub struct QuadTree {
    root: QuadTreeNode,
    config: QuadTreeConfig,
}

impl QuadTree {
    /// Create a new quadtree over the given world bounds
    pub fn new(world_bounds: Aabb, config: QuadTreeConfig) -> Self {
        Self {
            root: QuadTreeNode::new(world_bounds, 0),
            config,
        }
    }

    /// Insert a body into every leaf its broad-phase bounds overlap
    pub fn insert(&mut self, bodies: &BodySet, id: BodyId) {
        if let Some(body) = bodies.get(id) {
            self.root
                .insert(id, body.body_type(), &body.broad_bounds(), bodies, &self.config);
        }
    }

    /// Remove a body id from every leaf that holds it
    pub fn remove(&mut self, id: BodyId) {
        self.root.remove(id);
    }

    /// Clear and reinsert every live body
    ///
    /// Dynamic and sensor bodies are indexed by speculative bounds, so the
    /// partition is rebuilt once per frame before the broad phase runs.
    pub fn rebuild(&mut self, bodies: &BodySet) {
        self.clear();
        for body in bodies.iter() {
            self.root.insert(
                body.id(),
                body.body_type(),
                &body.broad_bounds(),
                bodies,
                &self.config,
            );
        }
    }

    /// Drop all occupants and subdivisions
    pub fn clear(&mut self) {
        self.root = QuadTreeNode::new(self.root.bounds, 0);
    }

    /// All leaf nodes, each visited exactly once
    pub fn leaves(&self) -> Vec<&QuadTreeNode> {
        let mut leaves = Vec::new();
        self.root.collect_leaves(&mut leaves);
        leaves
    }
}
