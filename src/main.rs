use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::tasks::{ComputeTaskPool, TaskPoolBuilder};
use micromegas_telemetry_sink::TelemetryGuardBuilder;
use micromegas_telemetry_sink::tracing_interop::TracingCaptureLayer;
use micromegas_tracing::dispatch::{flush_thread_buffer, init_thread_stream, unregister_thread_stream};
use micromegas_tracing::levels::LevelFilter;
use micromegas_tracing::prelude::{info, warn};
use tracing_subscriber::Registry;
use tracing_subscriber::layer::SubscriberExt;
use wizard_pursuit::PursuitPlugin;
use wizard_pursuit::app_state::AppState;
use wizard_pursuit::resources::{PursuitConfig, SessionStats};

const DEFAULT_CONFIG: &str = "assets/config/pursuit.json";

fn main() {
    // Spans need MICROMEGAS_ENABLE_CPU_TRACING=true; logs and metrics always flow.
    let _telemetry_guard = TelemetryGuardBuilder::default()
        .with_install_tracing_capture(false)
        .build()
        .expect("failed to initialize telemetry");

    let log_layer = TracingCaptureLayer {
        max_level: LevelFilter::Info,
    };
    let subscriber = Registry::default().with(log_layer);
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");

    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = match PursuitConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{e}; using default config");
            PursuitConfig::default()
        }
    };
    info!("wizard pursuit starting: maze {}", config.maze_file);

    // Must happen before App::new() so TaskPoolPlugin keeps this pool.
    ComputeTaskPool::get_or_init(|| {
        TaskPoolBuilder::new()
            .on_thread_spawn(|| {
                init_thread_stream();
            })
            .on_thread_destroy(|| {
                flush_thread_buffer();
                unregister_thread_stream();
            })
            .build()
    });

    let frame = Duration::from_secs_f64(1.0 / config.fixed_hz);
    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(frame)))
        .add_plugins(StatesPlugin)
        .add_plugins(PursuitPlugin { config })
        .add_systems(OnEnter(AppState::GameOver), report_and_exit)
        .run();
}

fn report_and_exit(stats: Res<SessionStats>, mut exit: MessageWriter<AppExit>) {
    info!(
        "session over: paths={} nodes={} interrupts={} unreachable={} taunts={} defeated={} forced_stop={}",
        stats.paths_started,
        stats.path_nodes,
        stats.interrupts,
        stats.unreachable_alerts,
        stats.taunts,
        stats.target_defeated,
        stats.forced_stop
    );
    exit.write(AppExit::Success);
}
