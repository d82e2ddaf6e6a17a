//! Spell effects carried by projectiles.
//!
//! A [`SpellEffect`] pairs an [`EffectKind`] (what it does, with its tunable
//! parameters) with a [`PhaseMask`] (when it runs). A bullet holds an ordered
//! list of effects shared with every other bullet of the same archetype; the
//! pipeline in [`crate::systems::spelleffect`] walks that list once per
//! lifecycle phase and runs the effects whose mask contains the phase, in
//! authored order.
//!
//! Each kind only has behaviour for some phases (an explosion means nothing
//! during flight). Running a kind in a phase it has no behaviour for is a
//! silent no-op, so the mask can be authored freely.
//!
//! # JSON form
//!
//! ```json
//! { "phases": ["on_hit"], "type": "knockback", "force": 4.0 }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle point of a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectPhase {
    /// Right after the bullet is spawned, before it is fired.
    OnCreation,
    /// Right after the bullet is fired.
    OnShot,
    /// Every frame while the bullet flies.
    OnFlight,
    /// When the bullet strikes something.
    OnHit,
}

impl EffectPhase {
    pub const ALL: [EffectPhase; 4] = [
        EffectPhase::OnCreation,
        EffectPhase::OnShot,
        EffectPhase::OnFlight,
        EffectPhase::OnHit,
    ];

    pub const fn bit(self) -> u8 {
        match self {
            EffectPhase::OnCreation => 1 << 0,
            EffectPhase::OnShot => 1 << 1,
            EffectPhase::OnFlight => 1 << 2,
            EffectPhase::OnHit => 1 << 3,
        }
    }
}

/// Set of phases an effect participates in.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<EffectPhase>", into = "Vec<EffectPhase>")]
pub struct PhaseMask(u8);

impl PhaseMask {
    pub const NONE: PhaseMask = PhaseMask(0);
    pub const ON_CREATION: PhaseMask = PhaseMask(EffectPhase::OnCreation.bit());
    pub const ON_SHOT: PhaseMask = PhaseMask(EffectPhase::OnShot.bit());
    pub const ON_FLIGHT: PhaseMask = PhaseMask(EffectPhase::OnFlight.bit());
    pub const ON_HIT: PhaseMask = PhaseMask(EffectPhase::OnHit.bit());
    pub const ALL: PhaseMask = PhaseMask(0b1111);

    pub const fn from_bits(bits: u8) -> Self {
        PhaseMask(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, phase: EffectPhase) -> bool {
        self.0 & phase.bit() != 0
    }

    pub const fn with(self, phase: EffectPhase) -> Self {
        PhaseMask(self.0 | phase.bit())
    }

    pub fn phases(self) -> impl Iterator<Item = EffectPhase> {
        EffectPhase::ALL.into_iter().filter(move |p| self.contains(*p))
    }
}

impl std::ops::BitOr for PhaseMask {
    type Output = PhaseMask;
    fn bitor(self, rhs: Self) -> Self::Output {
        PhaseMask(self.0 | rhs.0)
    }
}

impl From<EffectPhase> for PhaseMask {
    fn from(phase: EffectPhase) -> Self {
        PhaseMask(phase.bit())
    }
}

impl From<Vec<EffectPhase>> for PhaseMask {
    fn from(phases: Vec<EffectPhase>) -> Self {
        phases
            .into_iter()
            .fold(PhaseMask::NONE, |mask, phase| mask.with(phase))
    }
}

impl From<PhaseMask> for Vec<EffectPhase> {
    fn from(mask: PhaseMask) -> Self {
        mask.phases().collect()
    }
}

impl fmt::Debug for PhaseMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.phases()).finish()
    }
}

/// What an effect does, with its tunable parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectKind {
    /// Creation: scale the bullet's base damage and speed before launch.
    Empower { damage_factor: f32, speed_factor: f32 },
    /// Shot: push the shooter back against the firing direction.
    Recoil { force: f32 },
    /// Flight: grow (or shrink) velocity by `rate` per second.
    Accelerate { rate: f32 },
    /// Flight: steer toward the bullet's target, `turn_rate` per second.
    Homing { turn_rate: f32 },
    /// Hit: deal `scale` times the bullet's damage to the struck entity.
    Damage { scale: f32 },
    /// Hit: shove the struck entity along the bullet's path.
    Knockback { force: f32 },
    /// Hit: damage everything within `radius` of the impact, fading
    /// linearly with distance by the bullet's falloff.
    Explosion { radius: f32, damage: f32 },
    /// Any phase: broadcast a signal with the bullet as source.
    EmitSignal { signal: String },
}

impl EffectKind {
    /// Phases this kind has behaviour for.
    pub fn supported_phases(&self) -> PhaseMask {
        match self {
            EffectKind::Empower { .. } => PhaseMask::ON_CREATION,
            EffectKind::Recoil { .. } => PhaseMask::ON_SHOT,
            EffectKind::Accelerate { .. } | EffectKind::Homing { .. } => PhaseMask::ON_FLIGHT,
            EffectKind::Damage { .. }
            | EffectKind::Knockback { .. }
            | EffectKind::Explosion { .. } => PhaseMask::ON_HIT,
            EffectKind::EmitSignal { .. } => PhaseMask::ALL,
        }
    }
}

/// An effect and the phases it is authored to run in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellEffect {
    pub phases: PhaseMask,
    #[serde(flatten)]
    pub kind: EffectKind,
}

impl SpellEffect {
    pub fn new(phases: impl Into<PhaseMask>, kind: EffectKind) -> Self {
        Self {
            phases: phases.into(),
            kind,
        }
    }

    /// An effect authored for exactly the phases its kind supports.
    pub fn natural(kind: EffectKind) -> Self {
        Self {
            phases: kind.supported_phases(),
            kind,
        }
    }

    pub fn runs_in(&self, phase: EffectPhase) -> bool {
        self.phases.contains(phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_bits_are_distinct() {
        let mask = EffectPhase::ALL
            .iter()
            .fold(PhaseMask::NONE, |m, p| m.with(*p));
        assert_eq!(mask, PhaseMask::ALL);
        assert_eq!(mask.bits(), 0b1111);
    }

    #[test]
    fn test_mask_contains() {
        let mask = PhaseMask::ON_CREATION | PhaseMask::ON_HIT;
        assert!(mask.contains(EffectPhase::OnCreation));
        assert!(!mask.contains(EffectPhase::OnShot));
        assert!(!mask.contains(EffectPhase::OnFlight));
        assert!(mask.contains(EffectPhase::OnHit));
    }

    #[test]
    fn test_from_bits_drops_unknown() {
        assert_eq!(PhaseMask::from_bits(0xFF), PhaseMask::ALL);
    }

    #[test]
    fn test_effect_from_json() {
        let json = r#"{ "phases": ["on_hit", "on_flight"], "type": "knockback", "force": 4.0 }"#;
        let effect: SpellEffect = serde_json::from_str(json).unwrap();
        assert!(effect.runs_in(EffectPhase::OnHit));
        assert!(effect.runs_in(EffectPhase::OnFlight));
        assert!(!effect.runs_in(EffectPhase::OnShot));
        assert_eq!(effect.kind, EffectKind::Knockback { force: 4.0 });
    }

    #[test]
    fn test_emit_signal_from_json() {
        let json = r#"{ "phases": ["on_creation"], "type": "emit_signal", "signal": "whoosh" }"#;
        let effect: SpellEffect = serde_json::from_str(json).unwrap();
        assert_eq!(
            effect.kind,
            EffectKind::EmitSignal {
                signal: "whoosh".into()
            }
        );
    }

    #[test]
    fn test_natural_uses_supported_phases() {
        let effect = SpellEffect::natural(EffectKind::Homing { turn_rate: 2.0 });
        assert_eq!(effect.phases, PhaseMask::ON_FLIGHT);
    }
}
