//! Score aggregation and timeline engine for project transparency.
//!
//! This crate defines the data model, storage traits, the aggregation engine
//! and the dashboard read model that the rest of the workspace builds on.

pub mod dashboard;
pub mod engine;
pub mod error;
pub mod model;
pub mod seed;
pub mod service;
pub mod statistics;
pub mod traits;

pub use error::{Result, TransparencyError};
