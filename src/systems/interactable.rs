//! World-facing behaviour of [`Interactable`] entities.
//!
//! - [`spawn_interactable`] spawns the component and subscribes it to the
//!   signal bus.
//! - [`interact`] runs one interaction: guard check, outgoing signals, toggle.
//! - [`interactable_signal_callback`] maps received signals to interactions
//!   and enable/disable changes.
//!
//! Outgoing signals are published *before* the toggle is applied, and the
//! component is not borrowed while they are dispatched, so listeners may
//! freely touch this interactable (even re-trigger it) from their callbacks.

use bevy_ecs::prelude::*;
use log::{debug, warn};

use crate::components::interactable::Interactable;
use crate::resources::bus::{Signal, publish_signal, subscribe_signal};

/// Spawn `interactable` together with `extra` components and subscribe it to
/// the signal bus.
pub fn spawn_interactable(
    world: &mut World,
    interactable: Interactable,
    extra: impl Bundle,
) -> Entity {
    let entity = world.spawn((interactable, extra)).id();
    subscribe_signal(world, entity, interactable_signal_callback);
    entity
}

/// Interact with `entity`.
///
/// `actor` is the entity doing the interaction, if any; `by_signal` marks
/// interactions caused by a received signal. Returns true when the
/// interaction was accepted.
pub fn interact(world: &mut World, entity: Entity, actor: Option<Entity>, by_signal: bool) -> bool {
    let Some(interactable) = world.get::<Interactable>(entity) else {
        warn!("interact: {} has no Interactable", entity);
        return false;
    };
    if !interactable.accepts(by_signal) {
        debug!("interact: {} refused (by_signal={})", entity, by_signal);
        return false;
    }
    let outgoing = if interactable.sends_signals(by_signal) {
        interactable.signals_to_send.clone()
    } else {
        Vec::new()
    };

    debug!(
        "interact: {} by {:?} (by_signal={})",
        entity, actor, by_signal
    );
    for name in outgoing {
        publish_signal(world, entity, name);
    }

    // A listener may have despawned us while the signals went out.
    if let Some(mut interactable) = world.get_mut::<Interactable>(entity) {
        interactable.toggle();
    }
    true
}

/// Signal bus callback for interactables.
pub fn interactable_signal_callback(
    world: &mut World,
    entity: Entity,
    _source: Entity,
    signal: &Signal,
) {
    let Some(interactable) = world.get::<Interactable>(entity) else {
        return;
    };
    let reaction = interactable.react_to(signal.as_str());

    for _ in 0..reaction.triggers {
        interact(world, entity, None, true);
    }
    if let Some(mut interactable) = world.get_mut::<Interactable>(entity) {
        if reaction.disable {
            interactable.disabled = true;
        }
        if reaction.enable {
            interactable.disabled = false;
        }
    }
}
