//! The wizard: chases its target along A* paths, notices when the target is
//! somewhere it cannot reach, and casts once it catches up.
//!
//! `WizardBrain::tick` is called once per fixed simulation step. Pathing is
//! synchronous; movement is one bounded follower step per tick.

use bevy::math::DVec3;
use bevy::prelude::*;
use micromegas_tracing::prelude::info;
use rand::Rng;

use super::follower::{FollowStep, PathFollower};
use super::PursuitTarget;
use crate::navigation::{find_path, MovementGrid};

/// Tuning the brain reads every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WizardTuning {
    /// World units per second.
    pub speed: f64,
    /// Target displacement (world units) that forces a fresh path.
    pub recalculation_threshold: f64,
    /// Seconds between the collision and the target being defeated.
    pub cast_delay: f64,
    /// Inclusive range of seconds between taunts.
    pub taunt_interval: (f64, f64),
}

impl Default for WizardTuning {
    fn default() -> Self {
        Self {
            speed: 3.0,
            recalculation_threshold: 1.0,
            cast_delay: 1.0,
            taunt_interval: (6.0, 12.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WizardState {
    #[default]
    Idle,
    Following,
    /// The last search came back empty: the target is off the floor or walled in.
    Blocked,
    /// Terminal. Entered on collision or when the session is won.
    Casting,
}

/// Transitions the presentation layer may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardEvent {
    PathStarted { nodes: usize },
    PathInterrupted,
    PathExhausted,
    TargetUnreachable,
    TargetReachable,
    TargetCollision,
    TargetDefeated,
    ForcedStop,
    Taunt,
}

#[derive(Component, Debug, Clone)]
pub struct WizardBrain {
    position: DVec3,
    tuning: WizardTuning,
    state: WizardState,
    follower: PathFollower,
    stop_requested: bool,
    cheating_detected: bool,
    last_target_position: Option<DVec3>,
    elapsed_time: f64,
    next_taunt_time: f64,
    /// Seconds until the pending cast defeats the target.
    defeat_in: Option<f64>,
}

impl WizardBrain {
    pub fn new(position: DVec3, tuning: WizardTuning) -> Self {
        Self {
            position,
            tuning,
            state: WizardState::Idle,
            follower: PathFollower::default(),
            stop_requested: false,
            cheating_detected: false,
            last_target_position: None,
            elapsed_time: 0.0,
            next_taunt_time: tuning.taunt_interval.0.max(tuning.taunt_interval.1),
            defeat_in: None,
        }
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn tuning(&self) -> &WizardTuning {
        &self.tuning
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn is_moving(&self) -> bool {
        self.follower.is_active()
    }

    pub fn is_casting(&self) -> bool {
        self.state == WizardState::Casting
    }

    pub fn is_cheating_detected(&self) -> bool {
        self.cheating_detected
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    pub fn next_taunt_time(&self) -> f64 {
        self.next_taunt_time
    }

    pub fn last_target_position(&self) -> Option<DVec3> {
        self.last_target_position
    }

    /// Waypoints still ahead of the wizard.
    pub fn path(&self) -> &[DVec3] {
        self.follower.remaining()
    }

    /// Ask the follower to drop its path at the next step.
    pub fn request_stop(&mut self) {
        if self.is_moving() {
            self.stop_requested = true;
        }
    }

    /// Advance one fixed step of `dt` seconds.
    pub fn tick(
        &mut self,
        grid: &MovementGrid,
        target: &mut impl PursuitTarget,
        dt: f64,
        rng: &mut impl Rng,
    ) -> Vec<WizardEvent> {
        let mut events = Vec::new();

        if self.is_casting() {
            self.tick_cast(target, dt, &mut events);
            return events;
        }
        if target.is_defeated() {
            return events;
        }

        self.tick_taunts(dt, rng, &mut events);
        self.update_destination(grid, target.world_position(), &mut events);
        self.step_follower(dt, &mut events);
        events
    }

    /// Alert that the target cannot be reached. Repeated calls are no-ops
    /// until the target becomes reachable again; never fires while casting.
    pub fn alert_unreachable(&mut self) -> Option<WizardEvent> {
        if self.is_casting() || self.cheating_detected {
            return None;
        }
        self.cheating_detected = true;
        info!("wizard: target unreachable, cheating suspected");
        Some(WizardEvent::TargetUnreachable)
    }

    /// The wizard touched its target: stop and start casting. The target is
    /// defeated `cast_delay` seconds later.
    pub fn on_target_collision(&mut self) -> Option<WizardEvent> {
        if self.is_casting() {
            return None;
        }
        self.halt();
        self.defeat_in = Some(self.tuning.cast_delay.max(0.0));
        info!("wizard: caught target, casting");
        Some(WizardEvent::TargetCollision)
    }

    /// The session is over (the target won). Freeze in the casting pose
    /// without defeating anyone.
    pub fn force_stop(&mut self) -> Option<WizardEvent> {
        if self.is_casting() && self.defeat_in.is_none() {
            return None;
        }
        self.halt();
        self.defeat_in = None;
        info!("wizard: forced stop");
        Some(WizardEvent::ForcedStop)
    }

    fn halt(&mut self) {
        self.follower.clear();
        self.stop_requested = false;
        self.state = WizardState::Casting;
    }

    fn tick_cast(&mut self, target: &mut impl PursuitTarget, dt: f64, events: &mut Vec<WizardEvent>) {
        let Some(remaining) = self.defeat_in.as_mut() else {
            return;
        };
        *remaining -= dt;
        if *remaining > 0.0 {
            return;
        }
        self.defeat_in = None;
        if !target.is_defeated() {
            target.mark_defeated();
            info!("wizard: target defeated");
            events.push(WizardEvent::TargetDefeated);
        }
    }

    fn tick_taunts(&mut self, dt: f64, rng: &mut impl Rng, events: &mut Vec<WizardEvent>) {
        self.elapsed_time += dt;
        if self.elapsed_time < self.next_taunt_time {
            return;
        }
        let (a, b) = self.tuning.taunt_interval;
        let (lo, hi) = (a.min(b), a.max(b));
        self.next_taunt_time = self.elapsed_time + rng.gen_range(lo..=hi);
        events.push(WizardEvent::Taunt);
    }

    fn update_destination(
        &mut self,
        grid: &MovementGrid,
        target_position: DVec3,
        events: &mut Vec<WizardEvent>,
    ) {
        if self.is_moving() {
            let moved = self
                .last_target_position
                .map_or(f64::INFINITY, |last| last.distance(target_position));
            if moved > self.tuning.recalculation_threshold {
                self.stop_requested = true;
                self.last_target_position = Some(target_position);
            }
            return;
        }

        self.last_target_position = Some(target_position);
        self.stop_requested = false;

        let here = grid.world_to_node(self.position).map(|n| n.grid);
        let there = grid.world_to_node(target_position).map(|n| n.grid);
        if here.is_some() && here == there {
            // Same cell: no search, nothing suspicious. Close the rest of the
            // gap in a straight line so an off-centre target is still reached.
            self.clear_cheating(events);
            if self.position == target_position {
                self.state = WizardState::Idle;
                return;
            }
            self.follower.start(vec![target_position]);
            self.state = WizardState::Following;
            events.push(WizardEvent::PathStarted { nodes: 1 });
            return;
        }

        let path = find_path(grid, self.position, target_position);
        if path.is_empty() {
            self.state = WizardState::Blocked;
            events.extend(self.alert_unreachable());
            return;
        }

        self.clear_cheating(events);
        self.follower
            .start(path.iter().map(|node| node.world_position).collect());
        self.state = WizardState::Following;
        events.push(WizardEvent::PathStarted { nodes: path.len() });
    }

    fn clear_cheating(&mut self, events: &mut Vec<WizardEvent>) {
        if self.cheating_detected {
            self.cheating_detected = false;
            info!("wizard: target reachable again");
            events.push(WizardEvent::TargetReachable);
        }
    }

    fn step_follower(&mut self, dt: f64, events: &mut Vec<WizardEvent>) {
        let max_distance = self.tuning.speed * dt;
        match self
            .follower
            .step(&mut self.position, max_distance, &mut self.stop_requested)
        {
            FollowStep::Interrupted => {
                self.state = WizardState::Idle;
                events.push(WizardEvent::PathInterrupted);
            }
            FollowStep::Exhausted => {
                self.state = WizardState::Idle;
                events.push(WizardEvent::PathExhausted);
            }
            FollowStep::Idle | FollowStep::Advanced | FollowStep::ReachedWaypoint => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
