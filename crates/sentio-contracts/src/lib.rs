//! # sentio-contracts
//!
//! Shared types, schemas, and contracts for the Sentio feedback analysis
//! workflow.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate; only data definitions, the response schemas, configuration,
//! and error types.

pub mod analysis;
pub mod config;
pub mod error;
pub mod feedback;
pub mod run;
pub mod schema;
pub mod stage;
