// Domain layer - Core models
pub mod card;
pub mod chart;
pub mod kettle;
pub mod telemetry;
