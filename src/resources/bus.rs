//! Publish/subscribe buses for signals and game events.
//!
//! A [`Bus`] is a world resource holding an ordered list of subscriptions.
//! Two instances exist: [`SignalBus`] carries named [`Signal`]s between
//! interactables, dialogue and spell effects, and [`EventBus`] carries the
//! closed set of [`GameEvent`]s (pause/resume) that every simulated entity
//! reacts to.
//!
//! # Dispatch rules
//!
//! - [`publish`] calls every subscriber registered *before* the call, once,
//!   in registration order. The subscriber list is snapshotted first, so
//!   callbacks that subscribe or unsubscribe only affect the next publish.
//! - Subscribers whose entity has been despawned are skipped, and their
//!   subscriptions are pruned once the dispatch finishes.
//! - A callback may publish again. The nested dispatch runs to completion
//!   before the outer one continues (depth-first, nothing is queued).
//!   Nothing detects publish cycles: callbacks that re-publish each other
//!   forever will overflow the stack.
//!
//! Buses are created on first access and removed by [`teardown_buses`].
//!
//! # Example
//!
//! ```ignore
//! fn on_open(world: &mut World, me: Entity, source: Entity, signal: &Signal) {
//!     if signal == "open" { /* ... */ }
//! }
//! subscribe_signal(&mut world, door, on_open);
//! publish_signal(&mut world, lever, "open");
//! ```

use std::fmt;

use bevy_ecs::prelude::*;
use log::{debug, trace};
use smallvec::SmallVec;

use crate::events::gameevent::GameEvent;

/// Callback invoked for each published payload.
///
/// Arguments are the world, the subscribing entity, the publishing entity
/// and the payload.
pub type BusCallback<P> = fn(&mut World, Entity, Entity, &P);

/// Handle returned by [`Bus::subscribe`], used to remove a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// A single registered callback.
pub struct Subscription<P: 'static> {
    pub id: SubscriptionId,
    pub subscriber: Entity,
    pub callback: BusCallback<P>,
}

impl<P: 'static> Clone for Subscription<P> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<P: 'static> Copy for Subscription<P> {}

impl<P: 'static> fmt::Debug for Subscription<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("subscriber", &self.subscriber)
            .finish()
    }
}

/// Ordered subscriber list for one payload type.
#[derive(Resource)]
pub struct Bus<P: Send + Sync + 'static> {
    subscriptions: Vec<Subscription<P>>,
    next_id: u64,
}

impl<P: Send + Sync + 'static> Default for Bus<P> {
    fn default() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 0,
        }
    }
}

impl<P: Send + Sync + 'static> Bus<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `subscriber`. Subscriptions are appended, so
    /// dispatch order is registration order.
    pub fn subscribe(&mut self, subscriber: Entity, callback: BusCallback<P>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            subscriber,
            callback,
        });
        id
    }

    /// Remove one subscription. Returns false if it was not registered for
    /// that entity.
    pub fn unsubscribe(&mut self, subscriber: Entity, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions
            .retain(|s| !(s.id == id && s.subscriber == subscriber));
        before != self.subscriptions.len()
    }

    /// Remove every subscription owned by `subscriber`.
    pub fn unsubscribe_entity(&mut self, subscriber: Entity) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.subscriber != subscriber);
        before - self.subscriptions.len()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn is_subscribed(&self, subscriber: Entity) -> bool {
        self.subscriptions.iter().any(|s| s.subscriber == subscriber)
    }

    /// Copy of the current subscriber list, used as the dispatch set.
    pub fn snapshot(&self) -> SmallVec<[Subscription<P>; 16]> {
        self.subscriptions.iter().copied().collect()
    }
}

/// Name of a signal broadcast on the [`SignalBus`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signal(String);

impl Signal {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Signal {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Signal {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for Signal {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Signal {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for Signal {
    fn eq(&self, other: &String) -> bool {
        &self.0 == other
    }
}

pub type SignalBus = Bus<Signal>;
pub type EventBus = Bus<GameEvent>;

/// Register a callback on the bus for `P`, creating the bus if needed.
pub fn subscribe<P: Send + Sync + 'static>(
    world: &mut World,
    subscriber: Entity,
    callback: BusCallback<P>,
) -> SubscriptionId {
    world
        .get_resource_or_insert_with(Bus::<P>::new)
        .subscribe(subscriber, callback)
}

/// Remove one subscription from the bus for `P`.
pub fn unsubscribe<P: Send + Sync + 'static>(
    world: &mut World,
    subscriber: Entity,
    id: SubscriptionId,
) -> bool {
    world
        .get_resource_mut::<Bus<P>>()
        .is_some_and(|mut bus| bus.unsubscribe(subscriber, id))
}

/// Dispatch `payload` from `source` to every current subscriber.
///
/// Returns the number of callbacks that ran.
pub fn publish<P: Send + Sync + 'static>(world: &mut World, source: Entity, payload: &P) -> usize {
    let snapshot = world
        .get_resource_or_insert_with(Bus::<P>::new)
        .snapshot();

    let mut delivered = 0;
    let mut dead: SmallVec<[Entity; 4]> = SmallVec::new();
    for sub in snapshot {
        if world.get_entity(sub.subscriber).is_err() {
            trace!("skipping despawned subscriber {}", sub.subscriber);
            if !dead.contains(&sub.subscriber) {
                dead.push(sub.subscriber);
            }
            continue;
        }
        (sub.callback)(world, sub.subscriber, source, payload);
        delivered += 1;
    }

    if !dead.is_empty() {
        if let Some(mut bus) = world.get_resource_mut::<Bus<P>>() {
            for entity in dead {
                bus.unsubscribe_entity(entity);
            }
        }
    }
    delivered
}

pub fn subscribe_signal(
    world: &mut World,
    subscriber: Entity,
    callback: BusCallback<Signal>,
) -> SubscriptionId {
    subscribe::<Signal>(world, subscriber, callback)
}

pub fn subscribe_event(
    world: &mut World,
    subscriber: Entity,
    callback: BusCallback<GameEvent>,
) -> SubscriptionId {
    subscribe::<GameEvent>(world, subscriber, callback)
}

/// Broadcast a named signal with `source` as sender.
pub fn publish_signal(world: &mut World, source: Entity, name: impl Into<Signal>) -> usize {
    let signal = name.into();
    debug!("signal '{}' from {}", signal, source);
    publish(world, source, &signal)
}

/// Broadcast a game event with `source` as sender.
pub fn publish_event(world: &mut World, source: Entity, event: GameEvent) -> usize {
    debug!("event {:?} from {}", event, source);
    publish(world, source, &event)
}

/// Drop every subscription `entity` holds on both buses.
pub fn unsubscribe_all(world: &mut World, entity: Entity) {
    if let Some(mut bus) = world.get_resource_mut::<SignalBus>() {
        bus.unsubscribe_entity(entity);
    }
    if let Some(mut bus) = world.get_resource_mut::<EventBus>() {
        bus.unsubscribe_entity(entity);
    }
}

/// Remove both buses from the world. They are recreated on next access.
pub fn teardown_buses(world: &mut World) {
    world.remove_resource::<SignalBus>();
    world.remove_resource::<EventBus>();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut World, _: Entity, _: Entity, _: &Signal) {}

    #[test]
    fn test_subscribe_assigns_increasing_ids() {
        let mut world = World::new();
        let e = world.spawn_empty().id();
        let mut bus = SignalBus::new();
        let a = bus.subscribe(e, noop);
        let b = bus.subscribe(e, noop);
        assert!(a < b);
        assert_eq!(bus.len(), 2);
    }

    #[test]
    fn test_unsubscribe_requires_matching_entity() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let other = world.spawn_empty().id();
        let mut bus = SignalBus::new();
        let id = bus.subscribe(owner, noop);
        assert!(!bus.unsubscribe(other, id));
        assert!(bus.unsubscribe(owner, id));
        assert!(bus.is_empty());
    }

    #[test]
    fn test_unsubscribe_entity_removes_all() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let mut bus = SignalBus::new();
        bus.subscribe(a, noop);
        bus.subscribe(b, noop);
        bus.subscribe(a, noop);
        assert_eq!(bus.unsubscribe_entity(a), 2);
        assert!(!bus.is_subscribed(a));
        assert!(bus.is_subscribed(b));
    }

    #[test]
    fn test_bus_created_on_first_publish() {
        let mut world = World::new();
        let source = world.spawn_empty().id();
        assert!(world.get_resource::<SignalBus>().is_none());
        assert_eq!(publish_signal(&mut world, source, "hello"), 0);
        assert!(world.get_resource::<SignalBus>().is_some());
    }

    #[test]
    fn test_teardown_removes_both_buses() {
        let mut world = World::new();
        let e = world.spawn_empty().id();
        subscribe_signal(&mut world, e, noop);
        publish_event(&mut world, e, GameEvent::Paused);
        teardown_buses(&mut world);
        assert!(world.get_resource::<SignalBus>().is_none());
        assert!(world.get_resource::<EventBus>().is_none());
    }

    #[test]
    fn test_signal_compares_with_str() {
        let s = Signal::from("open");
        assert!(s == "open");
        assert_eq!(s.as_str(), "open");
        assert_eq!(s.to_string(), "open");
    }
}
