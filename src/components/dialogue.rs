//! Scripted dialogue data and the per-entity sequencer state.
//!
//! A [`Dialogue`] is authored content: an ordered list of
//! [`DialogueSegment`]s, shared read-only (`Arc`) between every sequencer
//! that plays it. A [`DialogueSequencer`] is the component placed on an NPC
//! or trigger volume; it holds the activation gates and, while playing, a
//! [`DialogueTask`].
//!
//! The task is a resumable state machine. Each call to
//! [`crate::systems::dialogue::advance_dialogue`] first checks the pending
//! [`Wait`]; when it is satisfied the task runs [`Step`]s until one of them
//! suspends again. Because the task lives on the component, despawning the
//! entity drops it, and [`crate::systems::dialogue::cancel_dialogue`] revokes
//! it by bumping the sequencer's generation.

use std::sync::Arc;

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Which portrait slot a segment is spoken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    #[default]
    Protagonist,
    Other,
}

/// Animation played after a segment's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentAnimation {
    pub name: String,
    /// Hide the dialogue UI and wait for the animation before continuing.
    #[serde(default)]
    pub wait: bool,
    /// Seconds the animation runs; only used when `wait` is set.
    #[serde(default)]
    pub duration: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueSegment {
    pub text: String,
    #[serde(default)]
    pub speaker: Speaker,
    /// Sprite shown in the speaker's portrait slot.
    #[serde(default)]
    pub portrait: Option<String>,
    /// Seconds the completed text stays up before moving on.
    #[serde(default)]
    pub display_time: f32,
    /// A mouse click skips the reveal and the hold.
    #[serde(default = "default_clickable")]
    pub clickable: bool,
    #[serde(default)]
    pub animation: Option<SegmentAnimation>,
    /// Signal published once the segment is done.
    #[serde(default)]
    pub signal: Option<String>,
}

fn default_clickable() -> bool {
    true
}

impl DialogueSegment {
    pub fn new(text: impl Into<String>, speaker: Speaker) -> Self {
        Self {
            text: text.into(),
            speaker,
            portrait: None,
            display_time: 0.0,
            clickable: true,
            animation: None,
            signal: None,
        }
    }

    pub fn display_time(mut self, seconds: f32) -> Self {
        self.display_time = seconds;
        self
    }

    pub fn clickable(mut self, clickable: bool) -> Self {
        self.clickable = clickable;
        self
    }

    pub fn portrait(mut self, sprite: impl Into<String>) -> Self {
        self.portrait = Some(sprite.into());
        self
    }

    pub fn animation(mut self, name: impl Into<String>, wait: bool, duration: f32) -> Self {
        self.animation = Some(SegmentAnimation {
            name: name.into(),
            wait,
            duration,
        });
        self
    }

    pub fn signal(mut self, signal: impl Into<String>) -> Self {
        self.signal = Some(signal.into());
        self
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dialogue {
    #[serde(default)]
    pub id: String,
    pub segments: Vec<DialogueSegment>,
}

impl Dialogue {
    pub fn new(id: impl Into<String>, segments: Vec<DialogueSegment>) -> Self {
        Self {
            id: id.into(),
            segments,
        }
    }
}

/// Suspension point a task is parked on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wait {
    /// Runnable now.
    None,
    /// Resume on the next advance.
    Frame,
    /// Resume once this much more time has passed.
    Seconds(f32),
}

/// Where a task continues when it resumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Pause the world.
    Begin,
    /// Swap the in-game UI for the dialogue UI.
    Open,
    /// Reset the text box and pick the portrait for segment `index`.
    Segment { index: usize },
    /// Reveal character `next` of segment `index`.
    Reveal { index: usize, next: usize },
    /// Keep the finished text up, started at world time `since`.
    Hold { index: usize, since: f32 },
    /// Play the segment's animation, if any.
    Animate { index: usize },
    /// A blocking animation finished.
    AnimationDone { index: usize },
    /// Publish the segment's signal, if any.
    Emit { index: usize },
    /// Resume the world and restore the in-game UI.
    Finish,
    Done,
}

#[derive(Debug, Clone)]
pub struct DialogueTask {
    pub dialogue: Arc<Dialogue>,
    pub step: Step,
    pub wait: Wait,
}

impl DialogueTask {
    pub fn new(dialogue: Arc<Dialogue>) -> Self {
        Self {
            dialogue,
            step: Step::Begin,
            wait: Wait::None,
        }
    }

    /// Advance the pending wait by `dt`. Returns true when the task may run.
    pub fn resume(&mut self, dt: f32) -> bool {
        match self.wait {
            Wait::None => true,
            Wait::Frame => {
                self.wait = Wait::None;
                true
            }
            Wait::Seconds(remaining) => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.wait = Wait::None;
                    true
                } else {
                    self.wait = Wait::Seconds(remaining);
                    false
                }
            }
        }
    }

    /// Park on `wait` and continue at `next` once it is satisfied.
    pub fn suspend(&mut self, next: Step, wait: Wait) {
        self.step = next;
        self.wait = wait;
    }

    pub fn is_done(&self) -> bool {
        self.step == Step::Done
    }
}

#[derive(Component, Debug, Clone)]
pub struct DialogueSequencer {
    /// Blocks key activation; set after the first activation.
    pub disabled: bool,
    /// The player is inside the proximity zone.
    pub can_activate: bool,
    pub talking: bool,
    /// Set by a click while talking, consumed by the reveal and hold steps.
    pub can_skip: bool,
    pub hint_visible: bool,
    /// Signal that starts the dialogue regardless of proximity.
    pub trigger_signal: Option<String>,
    pub dialogue: Arc<Dialogue>,
    pub(crate) task: Option<DialogueTask>,
    pub(crate) generation: u32,
    pub(crate) active: bool,
    pub(crate) paused_world: bool,
}

impl DialogueSequencer {
    pub fn new(dialogue: Arc<Dialogue>) -> Self {
        Self {
            disabled: false,
            can_activate: false,
            talking: false,
            can_skip: false,
            hint_visible: false,
            trigger_signal: None,
            dialogue,
            task: None,
            generation: 0,
            active: false,
            paused_world: false,
        }
    }

    pub fn triggered_by(mut self, signal: impl Into<String>) -> Self {
        self.trigger_signal = Some(signal.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// A dialogue task is running (started and not finished or cancelled).
    pub fn is_running(&self) -> bool {
        self.active
    }

    pub fn task(&self) -> Option<&DialogueTask> {
        self.task.as_ref()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Whether the world is currently paused by this sequencer.
    pub fn has_paused_world(&self) -> bool {
        self.paused_world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> DialogueTask {
        DialogueTask::new(Arc::new(Dialogue::default()))
    }

    #[test]
    fn test_frame_wait_resumes_once() {
        let mut t = task();
        t.suspend(Step::Open, Wait::Frame);
        assert!(t.resume(0.0));
        assert_eq!(t.wait, Wait::None);
        assert_eq!(t.step, Step::Open);
    }

    #[test]
    fn test_seconds_wait_counts_down() {
        let mut t = task();
        t.suspend(Step::Finish, Wait::Seconds(0.25));
        assert!(!t.resume(0.1));
        assert!(!t.resume(0.1));
        assert!(t.resume(0.1));
    }

    #[test]
    fn test_char_count_is_unicode_aware() {
        let seg = DialogueSegment::new("héllo", Speaker::Other);
        assert_eq!(seg.char_count(), 5);
    }

    #[test]
    fn test_segment_from_json_defaults() {
        let json = r#"{ "text": "Hi", "speaker": "other" }"#;
        let seg: DialogueSegment = serde_json::from_str(json).unwrap();
        assert_eq!(seg.speaker, Speaker::Other);
        assert!(seg.clickable);
        assert_eq!(seg.display_time, 0.0);
        assert!(seg.animation.is_none());
        assert!(seg.signal.is_none());
    }

    #[test]
    fn test_new_sequencer_is_idle() {
        let seq = DialogueSequencer::new(Arc::new(Dialogue::default())).triggered_by("talk");
        assert!(!seq.is_running());
        assert!(!seq.talking);
        assert_eq!(seq.trigger_signal.as_deref(), Some("talk"));
    }
}
