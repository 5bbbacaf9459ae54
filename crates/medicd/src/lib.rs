//! Medic daemon library - exposes modules for testing.

pub mod classifier;
pub mod config;
pub mod diagnoser;
pub mod executor;
pub mod ingest;
pub mod planner;
pub mod plan_store;
pub mod routes;
pub mod server;
