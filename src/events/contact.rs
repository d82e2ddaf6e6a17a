//! Contact notifications delivered by the host physics engine.
//!
//! The host detects overlaps and collisions; this crate only reacts to them.
//! Each contact begin/end is reported once as a [`ContactEvent`] triggered on
//! the world, from the point of view of `entity`. Observers registered by
//! [`crate::game::register_observers`] route them to bullets and dialogue
//! proximity zones.
//!
//! # Example
//!
//! ```ignore
//! notify_contact(&mut world, ContactEvent::trigger_enter(bullet, enemy));
//! ```

use bevy_ecs::prelude::*;
use glam::Vec3;

/// Whether the contact comes from a trigger volume or a solid collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Trigger,
    Collision,
}

/// Begin or end of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Enter,
    Exit,
}

/// A contact between `entity` and `other`, reported once per begin/end.
#[derive(Event, Debug, Clone, Copy)]
pub struct ContactEvent {
    /// The entity receiving the notification.
    pub entity: Entity,
    /// The entity it touched.
    pub other: Entity,
    /// World-space contact point, when the physics engine reports one.
    pub point: Option<Vec3>,
    pub kind: ContactKind,
    pub phase: ContactPhase,
}

impl ContactEvent {
    pub fn trigger_enter(entity: Entity, other: Entity) -> Self {
        Self {
            entity,
            other,
            point: None,
            kind: ContactKind::Trigger,
            phase: ContactPhase::Enter,
        }
    }

    pub fn trigger_exit(entity: Entity, other: Entity) -> Self {
        Self {
            entity,
            other,
            point: None,
            kind: ContactKind::Trigger,
            phase: ContactPhase::Exit,
        }
    }

    pub fn collision_enter(entity: Entity, other: Entity, point: Option<Vec3>) -> Self {
        Self {
            entity,
            other,
            point,
            kind: ContactKind::Collision,
            phase: ContactPhase::Enter,
        }
    }
}

/// Trigger `event` and apply the commands its observers queued.
pub fn notify_contact(world: &mut World, event: ContactEvent) {
    world.trigger(event);
    world.flush();
}
