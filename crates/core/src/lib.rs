//! Core library: name filtering, date reconciliation, scanning and the
//! incremental classification pipeline.

pub mod classifier;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod rules;
pub mod scanner;
