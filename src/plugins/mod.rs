pub mod maze;
pub mod player;
pub mod telemetry;
pub mod wizard;
