//! Tick-level telemetry: wraps the fixed simulation step with Micromegas
//! instrumentation.

use bevy::prelude::*;
use micromegas_tracing::prelude::{fmetric, imetric, span_scope};

use crate::ai::WizardBrain;
use crate::app_state::AppState;
use crate::components::Quarry;

pub struct TelemetryPlugin;

impl Plugin for TelemetryPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Last, frame_telemetry);
        app.add_systems(
            FixedPostUpdate,
            pursuit_telemetry.run_if(in_state(AppState::InGame)),
        );
    }
}

fn frame_telemetry(time: Res<Time>) {
    span_scope!("frame");
    let dt_ms = time.delta_secs_f64() * 1000.0;
    fmetric!("frame_time_ms", "ms", dt_ms);
}

fn pursuit_telemetry(wizards: Query<&WizardBrain>, quarry: Query<&Transform, With<Quarry>>) {
    span_scope!("pursuit_tick");
    let target = quarry.single().ok().map(|t| t.translation.as_dvec3());
    for brain in &wizards {
        imetric!("waypoints_remaining", "count", brain.path().len() as u64);
        if let Some(target) = target {
            fmetric!("quarry_distance", "units", brain.position().distance(target));
        }
    }
}
