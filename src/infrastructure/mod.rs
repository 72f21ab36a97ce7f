// Infrastructure layer - External dependencies and adapters
pub mod chart_png;
pub mod config;
pub mod http_snapshot_repository;
pub mod kettle_cli;
pub mod wire;
