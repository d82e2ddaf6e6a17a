//! Presentation state the dialogue sequencer writes to.
//!
//! The host renders from these resources; gameplay code never draws.
//! [`DialogueUi`] is the dialogue box (text region, two portrait slots and
//! the queue of requested animations). [`UiGroups`] tracks which UI groups
//! are visible.

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;

/// A portrait image slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortraitSlot {
    pub visible: bool,
    pub sprite: Option<String>,
}

impl PortraitSlot {
    pub fn show(&mut self, sprite: Option<String>) {
        self.visible = true;
        self.sprite = sprite;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// Animation the host should play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationRequest {
    pub name: String,
    pub blocking: bool,
}

#[derive(Resource, Debug, Default)]
pub struct DialogueUi {
    pub text: String,
    pub protagonist: PortraitSlot,
    pub other: PortraitSlot,
    pending_animations: Vec<AnimationRequest>,
}

impl DialogueUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn request_animation(&mut self, name: impl Into<String>, blocking: bool) {
        self.pending_animations.push(AnimationRequest {
            name: name.into(),
            blocking,
        });
    }

    pub fn pending_animations(&self) -> &[AnimationRequest] {
        &self.pending_animations
    }

    /// Hand the queued animation requests to the host.
    pub fn drain_animations(&mut self) -> Vec<AnimationRequest> {
        std::mem::take(&mut self.pending_animations)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiGroup {
    InGame,
    Dialogue,
}

/// Visibility of each UI group. Groups never set are visible only if they
/// are [`UiGroup::InGame`].
#[derive(Resource, Debug, Default)]
pub struct UiGroups {
    visible: FxHashMap<UiGroup, bool>,
}

impl UiGroups {
    pub fn set_visible(&mut self, group: UiGroup, visible: bool) {
        self.visible.insert(group, visible);
    }

    pub fn is_visible(&self, group: UiGroup) -> bool {
        self.visible
            .get(&group)
            .copied()
            .unwrap_or(group == UiGroup::InGame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_visibility() {
        let groups = UiGroups::default();
        assert!(groups.is_visible(UiGroup::InGame));
        assert!(!groups.is_visible(UiGroup::Dialogue));
    }

    #[test]
    fn test_drain_animations_empties_queue() {
        let mut ui = DialogueUi::new();
        ui.request_animation("wave", false);
        ui.request_animation("bow", true);
        let drained = ui.drain_animations();
        assert_eq!(drained.len(), 2);
        assert!(drained[1].blocking);
        assert!(ui.pending_animations().is_empty());
    }
}
