//! Observer events. `PursuitEvent` goes out to the presentation layer;
//! `GameWon` and `QuarryCaught` come in from the host game.

use bevy::prelude::*;

use crate::ai::WizardEvent;

/// A wizard changed state in a way worth reacting to (sound, animation, UI).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PursuitEvent {
    pub wizard: Entity,
    pub kind: WizardEvent,
}

/// The quarry escaped. Every wizard stops where it stands.
#[derive(Event, Debug, Clone, Copy)]
pub struct GameWon;

/// A wizard touched the quarry.
#[derive(Event, Debug, Clone, Copy)]
pub struct QuarryCaught {
    pub wizard: Entity,
}
