//! Wizard AI: the pursuit state machine and the path follower it drives.

pub mod follower;
pub mod wizard;

use bevy::math::DVec3;

pub use follower::{move_towards, FollowStep, PathFollower};
pub use wizard::{WizardBrain, WizardEvent, WizardState, WizardTuning};

/// What the wizard needs to know about whatever it is chasing.
pub trait PursuitTarget {
    fn world_position(&self) -> DVec3;

    fn is_defeated(&self) -> bool;

    /// Called once when the wizard's cast lands.
    fn mark_defeated(&mut self);
}

/// A target that only moves when told to. Handy for scripted scenes and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedTarget {
    pub position: DVec3,
    pub defeated: bool,
}

impl FixedTarget {
    pub fn at(position: DVec3) -> Self {
        Self {
            position,
            defeated: false,
        }
    }
}

impl PursuitTarget for FixedTarget {
    fn world_position(&self) -> DVec3 {
        self.position
    }

    fn is_defeated(&self) -> bool {
        self.defeated
    }

    fn mark_defeated(&mut self) {
        self.defeated = true;
    }
}
