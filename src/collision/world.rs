use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;

use crate::arena::{Arena, Handle};
use crate::config::CollisionConfig;
use crate::geometry::Rect;
use crate::physics::PhysicsWorld;

use super::broadphase::{self, BroadPhase, Proxy};
use super::shape::{self, Contact, Shape};
use super::{Collider, STATIC_LAYER};

type PairKey = (Handle, Handle);

/// Change in a pair's contact state between two steps. `a < b` always.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CollisionEvent {
    Enter { a: Handle, b: Handle, contact: Contact },
    Stay { a: Handle, b: Handle, contact: Contact },
    /// Either handle may already be removed.
    Exit { a: Handle, b: Handle },
}

impl CollisionEvent {
    pub fn pair(&self) -> (Handle, Handle) {
        match *self {
            CollisionEvent::Enter { a, b, .. }
            | CollisionEvent::Stay { a, b, .. }
            | CollisionEvent::Exit { a, b } => (a, b),
        }
    }

    /// The handle paired with `h`, if `h` is part of this event.
    pub fn other(&self, h: Handle) -> Option<Handle> {
        let (a, b) = self.pair();
        if a == h {
            Some(b)
        } else if b == h {
            Some(a)
        } else {
            None
        }
    }

    pub fn involves(&self, h: Handle) -> bool {
        self.other(h).is_some()
    }
}

pub struct CollisionWorld {
    colliders: Arena<Collider>,
    broad: Box<dyn BroadPhase>,
    active: BTreeMap<PairKey, Contact>,
    events: Vec<CollisionEvent>,
    proxies: Vec<Proxy>,
}

impl CollisionWorld {
    pub fn new(config: &CollisionConfig) -> Self {
        Self::with_broad_phase(broadphase::from_kind(config.broad_phase, config.cell_size))
    }

    pub fn with_broad_phase(broad: Box<dyn BroadPhase>) -> Self {
        Self {
            colliders: Arena::new(),
            broad,
            active: BTreeMap::new(),
            events: Vec::new(),
            proxies: Vec::new(),
        }
    }

    // -- Colliders ----------------------------------------------------------

    pub fn insert(&mut self, collider: Collider) -> Handle {
        self.colliders.insert(collider)
    }

    /// Pairs involving the collider report `Exit` on the next step.
    pub fn remove(&mut self, handle: Handle) -> Option<Collider> {
        self.colliders.remove(handle)
    }

    pub fn get(&self, handle: Handle) -> Option<&Collider> {
        self.colliders.get(handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Collider> {
        self.colliders.get_mut(handle)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.colliders.contains(handle)
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &Collider)> {
        self.colliders.iter()
    }

    pub fn set_position(&mut self, handle: Handle, position: Vec2) -> bool {
        match self.colliders.get_mut(handle) {
            Some(c) => {
                c.position = position;
                true
            }
            None => false,
        }
    }

    /// Copy attached body positions onto their colliders. Colliders whose
    /// body no longer exists keep their last position.
    pub fn sync_from_bodies(&mut self, physics: &PhysicsWorld) {
        for (handle, collider) in self.colliders.iter_mut() {
            let Some(body) = collider.body else { continue };
            match physics.body(body) {
                Some(b) => collider.position = b.position,
                None => log::debug!("collider {handle:?}: attached body {body:?} is gone"),
            }
        }
    }

    /// Register solid rectangles (usually from a tilemap) as static
    /// colliders on [`STATIC_LAYER`].
    pub fn add_static_rects(&mut self, rects: &[Rect]) -> Vec<Handle> {
        rects
            .iter()
            .map(|&r| self.insert(Collider::from_rect(r).with_layer(STATIC_LAYER, !STATIC_LAYER)))
            .collect()
    }

    // -- Stepping -----------------------------------------------------------

    /// Detect contacts and diff them against the previous step.
    pub fn step(&mut self) -> &[CollisionEvent] {
        self.proxies.clear();
        self.proxies
            .extend(self.colliders.iter().map(|(handle, c)| Proxy { handle, bounds: c.bounds() }));

        let mut current = BTreeMap::new();
        for (a, b) in self.broad.candidate_pairs(&self.proxies) {
            let (Some(ca), Some(cb)) = (self.colliders.get(a), self.colliders.get(b)) else {
                continue;
            };
            if !ca.interacts(cb) {
                continue;
            }
            if let Some(contact) = shape::test(&ca.shape, ca.position, &cb.shape, cb.position) {
                current.insert((a, b), contact);
            }
        }

        self.events.clear();
        let keys: BTreeSet<PairKey> = current.keys().chain(self.active.keys()).copied().collect();
        for (a, b) in keys {
            let event = match (current.get(&(a, b)), self.active.contains_key(&(a, b))) {
                (Some(&contact), false) => CollisionEvent::Enter { a, b, contact },
                (Some(&contact), true) => CollisionEvent::Stay { a, b, contact },
                (None, _) => CollisionEvent::Exit { a, b },
            };
            self.events.push(event);
        }

        self.active = current;
        &self.events
    }

    /// Events produced by the last [`step`](Self::step).
    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    // -- Queries ------------------------------------------------------------

    /// Contacts active after the last step.
    pub fn contacts(&self) -> impl Iterator<Item = (Handle, Handle, &Contact)> {
        self.active.iter().map(|(&(a, b), c)| (a, b, c))
    }

    pub fn contact(&self, a: Handle, b: Handle) -> Option<&Contact> {
        let key = if a < b { (a, b) } else { (b, a) };
        self.active.get(&key)
    }

    pub fn query_point(&self, p: Vec2) -> Vec<Handle> {
        self.colliders
            .iter()
            .filter(|(_, c)| c.shape.contains_point(c.position, p))
            .map(|(h, _)| h)
            .collect()
    }

    /// Colliders overlapping `rect` (touching edges excluded).
    pub fn query_rect(&self, rect: Rect) -> Vec<Handle> {
        let probe = Shape::Aabb { half_extents: rect.half_extents() };
        let center = rect.center();
        self.colliders
            .iter()
            .filter(|(_, c)| shape::test(&probe, center, &c.shape, c.position).is_some())
            .map(|(h, _)| h)
            .collect()
    }
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new(&CollisionConfig::default())
    }
}
