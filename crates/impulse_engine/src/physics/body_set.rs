//! Body storage
//!
//! Arena keyed by integer handles with free-list reuse. Bodies are always
//! addressed through [`BodyId`]; nothing holds a long-lived reference into
//! the arena.

use crate::foundation::math::Vec2;
use crate::physics::body::{Body, BodyId, BodyType};
use crate::physics::shape::Shape;

/// Free-list arena owning every body in a world
#[derive(Debug, Default)]
pub struct BodySet {
    slots: Vec<Option<Body>>,
    free: Vec<u32>,
}

impl BodySet {
    /// Create an empty body set
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a body and return its handle
    ///
    /// Reuses the most recently freed slot when one exists.
    pub fn insert(
        &mut self,
        body_type: BodyType,
        shape: Shape,
        position: Vec2,
        rotation: f32,
    ) -> BodyId {
        if let Some(index) = self.free.pop() {
            let id = BodyId(index);
            self.slots[index as usize] = Some(Body::new(id, body_type, shape, position, rotation));
            id
        } else {
            let index = u32::try_from(self.slots.len()).expect("body count exceeds u32 range");
            let id = BodyId(index);
            self.slots.push(Some(Body::new(id, body_type, shape, position, rotation)));
            id
        }
    }

    /// Destroy a body, returning its slot to the free list
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let slot = self.slots.get_mut(id.0 as usize)?;
        let body = slot.take()?;
        self.free.push(id.0);
        Some(body)
    }

    /// Look up a body by handle
    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    /// Look up a body mutably by handle
    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.slots.get_mut(id.0 as usize)?.as_mut()
    }

    /// Iterate over all live bodies
    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Iterate over all live bodies mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    /// Number of live bodies
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Whether the set holds no live bodies
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
