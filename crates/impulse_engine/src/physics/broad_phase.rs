//! Broad-phase contact solving
//!
//! Walks the spatial partition and proposes candidate colliding pairs from
//! AABB overlap alone. Each solve is a complete, restartable pass: it fills
//! a pair queue that the narrow phase drains before the next pass.

use std::collections::HashSet;

use log::debug;

use crate::physics::body::BodyId;
use crate::physics::body_set::BodySet;
use crate::physics::contact::ContactPair;
use crate::spatial::QuadTree;

/// Proposes candidate pairs by walking quadtree leaves
///
/// Pairing rules: an *active* dynamic body against each static body in the
/// same leaf (a body with no pending motion cannot newly overlap anything),
/// and each sensor against each dynamic body regardless of activity, since
/// sensors must detect stationary overlaps too. A hash set keyed by the
/// unordered pair guarantees at most one emission per pair per pass even
/// when bodies span several leaves.
#[derive(Debug, Default)]
pub struct BroadPhaseContactSolver {
    pairs: Vec<ContactPair>,
    lookup: HashSet<(BodyId, BodyId)>,
}

impl BroadPhaseContactSolver {
    /// Create an empty solver
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one complete pass over the partition
    ///
    /// Any pairs left over from a previous pass are discarded first; the
    /// narrow phase is expected to have drained them already.
    pub fn solve(&mut self, tree: &QuadTree, bodies: &BodySet, _delta_time: f32) {
        self.pairs.clear();
        self.lookup.clear();

        for leaf in tree.leaves() {
            if !leaf.dynamics().is_empty() && !leaf.statics().is_empty() {
                for &dynamic_id in leaf.dynamics() {
                    let Some(dynamic) = bodies.get(dynamic_id) else { continue };
                    if !dynamic.is_active() {
                        continue;
                    }
                    for &static_id in leaf.statics() {
                        let Some(fixed) = bodies.get(static_id) else { continue };
                        let pair = ContactPair::new(dynamic_id, static_id);
                        if self.lookup.contains(&pair.key()) {
                            continue;
                        }
                        if dynamic.transform_bounds().intersects(&fixed.bounds()) {
                            self.lookup.insert(pair.key());
                            self.pairs.push(pair);
                        }
                    }
                }
            }

            for &sensor_id in leaf.sensors() {
                let Some(sensor) = bodies.get(sensor_id) else { continue };
                for &dynamic_id in leaf.dynamics() {
                    let Some(dynamic) = bodies.get(dynamic_id) else { continue };
                    let pair = ContactPair::new(sensor_id, dynamic_id);
                    if self.lookup.contains(&pair.key()) {
                        continue;
                    }
                    if sensor.transform_bounds().intersects(&dynamic.transform_bounds()) {
                        self.lookup.insert(pair.key());
                        self.pairs.push(pair);
                    }
                }
            }
        }

        debug!("broad phase proposed {} candidate pairs", self.pairs.len());
    }

    /// Pop the most recently emitted pair
    ///
    /// Consumption is LIFO; the queue must be drained before the next
    /// [`Self::solve`] pass.
    pub fn next(&mut self) -> Option<ContactPair> {
        let pair = self.pairs.pop()?;
        self.lookup.remove(&pair.key());
        Some(pair)
    }

    /// Whether undrained pairs remain
    pub fn contains_pairs(&self) -> bool {
        !self.pairs.is_empty()
    }

    /// Number of undrained pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the pair queue is empty
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
