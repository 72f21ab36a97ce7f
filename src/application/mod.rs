// Application layer - Use cases and service seams
pub mod card_presenter;
pub mod card_service;
pub mod collector_service;
pub mod poller_service;
pub mod snapshot_repository;
