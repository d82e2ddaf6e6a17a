//! Tag component for grouping entities by name.
//!
//! Bullets decide what they may hit by group (`enemy`, `player`, `mob`),
//! spell casters find their designated ally by the `player` group and
//! dialogue zones only react to the player.

use bevy_ecs::prelude::Component;

pub const PLAYER: &str = "player";
pub const ENEMY: &str = "enemy";
pub const MOB: &str = "mob";
pub const BULLET: &str = "bullet";

#[derive(Component, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Group(String);

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
    pub fn name(&self) -> &str {
        &self.0
    }
    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }
    /// Groups a bullet treats as living targets.
    pub fn is_hittable(&self) -> bool {
        matches!(self.name(), ENEMY | PLAYER | MOB)
    }
}
