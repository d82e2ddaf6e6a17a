//! Dialogue sequencer behaviour.
//!
//! # Activation
//!
//! - Entering the sequencer's proximity zone with the player sets
//!   `can_activate` and shows the hint; leaving clears both. Both are left
//!   alone (hint hidden) while the sequencer is disabled.
//! - Pressing the interact key while activatable and enabled starts the
//!   dialogue, disables the sequencer and hides the hint.
//! - Receiving the configured trigger signal starts the dialogue regardless
//!   of proximity or `disabled`.
//!
//! A start request while a dialogue is already running is ignored.
//!
//! # Playback
//!
//! [`dialogue_system`] advances every running task once per frame. Per run
//! the world is paused, the dialogue UI replaces the in-game UI, each segment
//! is revealed one character per `reveal_interval` seconds, held for its
//! display time, followed by its animation and signal, and finally the world
//! is resumed and the in-game UI restored. A click during reveal or hold
//! skips to the end of that stage of the current segment only.

use std::sync::Arc;

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::{debug, info, warn};

use crate::components::dialogue::{
    Dialogue, DialogueSequencer, DialogueTask, Speaker, Step, Wait,
};
use crate::components::group::{Group, PLAYER};
use crate::error::{GameplayError, GameplayResult};
use crate::events::contact::{ContactEvent, ContactKind, ContactPhase};
use crate::events::gameevent::GameEvent;
use crate::resources::bus::{Signal, publish_event, publish_signal, subscribe_signal};
use crate::resources::dialogueui::{DialogueUi, UiGroup, UiGroups};
use crate::resources::gameconfig::GameConfig;
use crate::resources::input::InputState;
use crate::resources::worldtime::WorldTime;

/// Spawn a sequencer with `extra` components and subscribe it to the signal
/// bus.
///
/// Fails when the [`DialogueUi`] resource has not been registered.
pub fn spawn_dialogue_sequencer(
    world: &mut World,
    sequencer: DialogueSequencer,
    extra: impl Bundle,
) -> GameplayResult<Entity> {
    if !world.contains_resource::<DialogueUi>() {
        return Err(GameplayError::MissingCollaborator("DialogueUi"));
    }
    let entity = world.spawn((sequencer, extra)).id();
    subscribe_signal(world, entity, dialogue_signal_callback);
    Ok(entity)
}

/// Start the sequencer's own dialogue.
pub fn start_dialogue(world: &mut World, entity: Entity) -> bool {
    let Some(dialogue) = world
        .get::<DialogueSequencer>(entity)
        .map(|s| Arc::clone(&s.dialogue))
    else {
        warn!("start_dialogue: {} has no DialogueSequencer", entity);
        return false;
    };
    start_dialogue_with(world, entity, dialogue)
}

/// Start playing `dialogue` on the sequencer. The task begins on the next
/// advance. Returns false if a dialogue is already running.
pub fn start_dialogue_with(world: &mut World, entity: Entity, dialogue: Arc<Dialogue>) -> bool {
    let Some(mut seq) = world.get_mut::<DialogueSequencer>(entity) else {
        return false;
    };
    if seq.active {
        debug!("dialogue on {} already running", entity);
        return false;
    }
    info!(
        "dialogue '{}' starts on {} ({} segments)",
        dialogue.id,
        entity,
        dialogue.segments.len()
    );
    seq.generation = seq.generation.wrapping_add(1);
    seq.active = true;
    seq.can_skip = false;
    seq.task = Some(DialogueTask::new(dialogue));
    true
}

/// Revoke a running dialogue. Undoes the pause and UI swap if they already
/// happened. Returns false when nothing was running.
pub fn cancel_dialogue(world: &mut World, entity: Entity) -> bool {
    let Some(mut seq) = world.get_mut::<DialogueSequencer>(entity) else {
        return false;
    };
    if !seq.active {
        return false;
    }
    seq.generation = seq.generation.wrapping_add(1);
    seq.active = false;
    seq.task = None;
    seq.can_skip = false;
    let was_talking = std::mem::take(&mut seq.talking);
    let paused_world = std::mem::take(&mut seq.paused_world);

    if was_talking {
        set_ui_group(world, UiGroup::Dialogue, false);
        set_ui_group(world, UiGroup::InGame, true);
    }
    if paused_world {
        publish_event(world, entity, GameEvent::Resumed);
    }
    info!("dialogue on {} cancelled", entity);
    true
}

/// Signal bus callback: start on the configured trigger signal.
pub fn dialogue_signal_callback(world: &mut World, entity: Entity, _source: Entity, signal: &Signal) {
    let matches = world
        .get::<DialogueSequencer>(entity)
        .and_then(|s| s.trigger_signal.as_deref())
        .is_some_and(|t| signal == t);
    if matches {
        start_dialogue(world, entity);
    }
}

/// Update the proximity gate after the player entered or left the zone.
pub fn on_proximity(world: &mut World, entity: Entity, other: Entity, entered: bool) {
    let is_player = world.get::<Group>(other).is_some_and(|g| g.is(PLAYER));
    let Some(mut seq) = world.get_mut::<DialogueSequencer>(entity) else {
        return;
    };
    if seq.disabled {
        seq.hint_visible = false;
        return;
    }
    if is_player {
        seq.can_activate = entered;
        seq.hint_visible = entered;
    }
}

/// Observer forwarding trigger contacts on sequencers to [`on_proximity`].
pub fn dialogue_proximity_observer(
    trigger: On<ContactEvent>,
    sequencers: Query<(), With<DialogueSequencer>>,
    mut commands: Commands,
) {
    let contact = *trigger.event();
    if contact.kind != ContactKind::Trigger || sequencers.get(contact.entity).is_err() {
        return;
    }
    let entered = contact.phase == ContactPhase::Enter;
    commands.queue(move |world: &mut World| {
        on_proximity(world, contact.entity, contact.other, entered);
    });
}

/// Per-frame input handling: skip clicks and key activation.
pub fn dialogue_input_system(world: &mut World) {
    let (clicked, interact) = match world.get_resource::<InputState>() {
        Some(input) => (input.was_mouse_released(), input.interact_pressed()),
        None => return,
    };

    let mut query = world.query::<(Entity, &mut DialogueSequencer)>();
    let mut to_start = Vec::new();
    for (entity, mut seq) in query.iter_mut(world) {
        if seq.talking && !seq.can_skip && clicked {
            seq.can_skip = true;
        }
        if seq.disabled || !seq.can_activate {
            continue;
        }
        if interact {
            seq.disabled = true;
            seq.hint_visible = false;
            to_start.push(entity);
        }
    }

    for entity in to_start {
        start_dialogue(world, entity);
    }
}

/// Advance every running dialogue task.
pub fn dialogue_system(world: &mut World) {
    let mut query = world.query::<(Entity, &DialogueSequencer)>();
    let running: Vec<Entity> = query
        .iter(world)
        .filter(|(_, s)| s.active)
        .map(|(e, _)| e)
        .collect();
    for entity in running {
        advance_dialogue(world, entity);
    }
}

/// Advance one sequencer's task until its next suspension point.
pub fn advance_dialogue(world: &mut World, entity: Entity) {
    let dt = world.get_resource::<WorldTime>().map_or(0.0, |t| t.delta);
    let (generation, mut task) = {
        let Some(mut seq) = world.get_mut::<DialogueSequencer>(entity) else {
            return;
        };
        if !seq.active {
            return;
        }
        let Some(task) = seq.task.take() else {
            return;
        };
        (seq.generation, task)
    };

    if task.resume(dt) {
        loop {
            run_step(world, entity, &mut task);
            if !still_current(world, entity, generation) {
                debug!("dialogue task on {} revoked", entity);
                return;
            }
            if task.is_done() || task.wait != Wait::None {
                break;
            }
        }
    }

    let Some(mut seq) = world.get_mut::<DialogueSequencer>(entity) else {
        return;
    };
    if task.is_done() {
        seq.active = false;
    } else {
        seq.task = Some(task);
    }
}

fn still_current(world: &World, entity: Entity, generation: u32) -> bool {
    world
        .get::<DialogueSequencer>(entity)
        .is_some_and(|s| s.active && s.generation == generation)
}

fn set_ui_group(world: &mut World, group: UiGroup, visible: bool) {
    world
        .get_resource_or_insert_with(UiGroups::default)
        .set_visible(group, visible);
}

/// Consume the skip flag if the segment is clickable and it was set.
/// Otherwise clear it so a stale click cannot carry over.
fn take_skip(world: &mut World, entity: Entity, clickable: bool) -> bool {
    let Some(mut seq) = world.get_mut::<DialogueSequencer>(entity) else {
        return false;
    };
    let skip = clickable && seq.can_skip;
    seq.can_skip = false;
    skip
}

fn run_step(world: &mut World, entity: Entity, task: &mut DialogueTask) {
    let dialogue = Arc::clone(&task.dialogue);
    let now = world.get_resource::<WorldTime>().map_or(0.0, |t| t.elapsed);

    match task.step {
        Step::Begin => {
            if let Some(mut seq) = world.get_mut::<DialogueSequencer>(entity) {
                seq.paused_world = true;
            }
            publish_event(world, entity, GameEvent::Paused);
            task.suspend(Step::Open, Wait::Frame);
        }
        Step::Open => {
            if let Some(mut seq) = world.get_mut::<DialogueSequencer>(entity) {
                seq.talking = true;
            }
            set_ui_group(world, UiGroup::Dialogue, true);
            set_ui_group(world, UiGroup::InGame, false);
            task.suspend(Step::Segment { index: 0 }, Wait::None);
        }
        Step::Segment { index } => {
            let Some(segment) = dialogue.segments.get(index) else {
                task.suspend(Step::Finish, Wait::None);
                return;
            };
            if let Some(mut ui) = world.get_resource_mut::<DialogueUi>() {
                ui.text.clear();
                match segment.speaker {
                    Speaker::Protagonist => {
                        ui.protagonist.show(segment.portrait.clone());
                        ui.other.hide();
                    }
                    Speaker::Other => {
                        ui.protagonist.hide();
                        ui.other.show(segment.portrait.clone());
                    }
                }
            }
            task.suspend(Step::Reveal { index, next: 0 }, Wait::None);
        }
        Step::Reveal { index, next } => {
            let Some(segment) = dialogue.segments.get(index) else {
                task.suspend(Step::Finish, Wait::None);
                return;
            };
            let Some(c) = segment.text.chars().nth(next) else {
                task.suspend(Step::Hold { index, since: now }, Wait::None);
                return;
            };
            if take_skip(world, entity, segment.clickable) {
                if let Some(mut ui) = world.get_resource_mut::<DialogueUi>() {
                    ui.set_text(segment.text.clone());
                }
                task.suspend(Step::Hold { index, since: now }, Wait::None);
                return;
            }
            if let Some(mut ui) = world.get_resource_mut::<DialogueUi>() {
                ui.push_char(c);
            }
            let interval = world
                .get_resource::<GameConfig>()
                .map_or(GameConfig::new().reveal_interval, |c| c.reveal_interval);
            task.suspend(
                Step::Reveal {
                    index,
                    next: next + 1,
                },
                Wait::Seconds(interval),
            );
        }
        Step::Hold { index, since } => {
            let Some(segment) = dialogue.segments.get(index) else {
                task.suspend(Step::Finish, Wait::None);
                return;
            };
            if now - since >= segment.display_time
                || take_skip(world, entity, segment.clickable)
            {
                task.suspend(Step::Animate { index }, Wait::Frame);
            } else {
                task.suspend(Step::Hold { index, since }, Wait::Frame);
            }
        }
        Step::Animate { index } => {
            let animation = dialogue
                .segments
                .get(index)
                .and_then(|s| s.animation.clone());
            let Some(animation) = animation else {
                task.suspend(Step::Emit { index }, Wait::None);
                return;
            };
            if let Some(mut ui) = world.get_resource_mut::<DialogueUi>() {
                ui.request_animation(animation.name.clone(), animation.wait);
            }
            if animation.wait {
                set_ui_group(world, UiGroup::Dialogue, false);
                task.suspend(
                    Step::AnimationDone { index },
                    Wait::Seconds(animation.duration),
                );
            } else {
                task.suspend(Step::Emit { index }, Wait::None);
            }
        }
        Step::AnimationDone { index } => {
            set_ui_group(world, UiGroup::Dialogue, true);
            task.suspend(Step::Emit { index }, Wait::None);
        }
        Step::Emit { index } => {
            if let Some(signal) = dialogue.segments.get(index).and_then(|s| s.signal.clone()) {
                publish_signal(world, entity, signal);
            }
            task.suspend(Step::Segment { index: index + 1 }, Wait::Frame);
        }
        Step::Finish => {
            if let Some(mut seq) = world.get_mut::<DialogueSequencer>(entity) {
                seq.paused_world = false;
            }
            publish_event(world, entity, GameEvent::Resumed);
            set_ui_group(world, UiGroup::Dialogue, false);
            set_ui_group(world, UiGroup::InGame, true);
            if let Some(mut seq) = world.get_mut::<DialogueSequencer>(entity) {
                seq.talking = false;
            }
            info!("dialogue '{}' on {} finished", dialogue.id, entity);
            task.suspend(Step::Done, Wait::None);
        }
        Step::Done => {}
    }
}
