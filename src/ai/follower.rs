//! Resumable path follower. Each `step` performs one bounded move toward the
//! current waypoint and returns, so the caller decides when the next one runs.

use bevy::math::DVec3;

/// Outcome of a single `PathFollower::step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowStep {
    /// Nothing to follow.
    Idle,
    /// Moved toward the current waypoint without reaching it.
    Advanced,
    /// Landed on a waypoint; more remain.
    ReachedWaypoint,
    /// A stop request was honoured; the remaining waypoints were dropped.
    Interrupted,
    /// Landed on the last waypoint; the path has been cleared.
    Exhausted,
}

/// Move `current` toward `target` by at most `max_distance`, snapping onto
/// `target` once it is within reach.
pub fn move_towards(current: DVec3, target: DVec3, max_distance: f64) -> DVec3 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_distance || distance == 0.0 {
        target
    } else {
        current + delta / distance * max_distance
    }
}

/// Waypoints plus a cursor to the one being approached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathFollower {
    waypoints: Vec<DVec3>,
    cursor: usize,
}

impl PathFollower {
    /// Replace whatever was being followed.
    pub fn start(&mut self, waypoints: Vec<DVec3>) {
        self.waypoints = waypoints;
        self.cursor = 0;
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.cursor = 0;
    }

    pub fn is_active(&self) -> bool {
        self.cursor < self.waypoints.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn waypoints(&self) -> &[DVec3] {
        &self.waypoints
    }

    /// Waypoints not yet reached, current one first.
    pub fn remaining(&self) -> &[DVec3] {
        self.waypoints.get(self.cursor..).unwrap_or(&[])
    }

    pub fn current_waypoint(&self) -> Option<DVec3> {
        self.waypoints.get(self.cursor).copied()
    }

    /// Advance one increment. `stop_requested` is checked before moving and
    /// cleared when honoured. Distance left over after reaching a waypoint is
    /// not carried into the next one.
    pub fn step(
        &mut self,
        position: &mut DVec3,
        max_distance: f64,
        stop_requested: &mut bool,
    ) -> FollowStep {
        let Some(target) = self.current_waypoint() else {
            return FollowStep::Idle;
        };
        if *stop_requested {
            *stop_requested = false;
            self.clear();
            return FollowStep::Interrupted;
        }

        *position = move_towards(*position, target, max_distance);
        if *position != target {
            return FollowStep::Advanced;
        }

        self.cursor += 1;
        if self.is_active() {
            FollowStep::ReachedWaypoint
        } else {
            self.clear();
            FollowStep::Exhausted
        }
    }
}
