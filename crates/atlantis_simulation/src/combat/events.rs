//! Combat events (input → ECS, ECS → presentation)

use bevy::prelude::*;

/// Attack button pressed by `attacker`.
#[derive(Event, Debug, Clone, Copy)]
pub struct AttackInput {
    pub attacker: Entity,
}

/// Attack-notify from the animation track (primary hit-sweep path).
#[derive(Event, Debug, Clone, Copy)]
pub struct AttackNotify {
    pub attacker: Entity,
}

/// Presentation layer closed the bloom widget. Informational only.
#[derive(Event, Debug, Clone, Copy)]
pub struct BloomWindowClosed {
    pub entity: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AttackStarted {
    pub attacker: Entity,
    pub stage: usize,
    pub clip: usize,
    pub duration: f32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SparkTriggered {
    pub attacker: Entity,
    pub stage: usize,
}

/// `in_combat` flips when a chain starts or ends.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboStateChanged {
    pub entity: Entity,
    pub in_combat: bool,
}

/// Chain returned to idle (timeout, completion, reset).
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboEnded {
    pub entity: Entity,
}

/// Attack notify reached: sweep for hits around `attacker`.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeleeSweepRequested {
    pub attacker: Entity,
    pub stage: usize,
}
