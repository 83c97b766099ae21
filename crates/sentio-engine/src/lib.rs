//! # sentio-engine
//!
//! The dependency-graph run engine for Sentio analysis workflows.
//!
//! This crate provides:
//! - The two seams of the engine (`Stage`, `Aggregator`)
//! - `GraphBuilder` / `WorkflowGraph` for declaring and validating the DAG
//! - The `Engine` that schedules ready stages concurrently under one
//!   overall deadline and aggregates partial results
//!
//! The engine is domain-blind: everything it runs and combines comes in
//! through the traits. The sentiment/themes/actions workflow itself lives in
//! `sentio-stages`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sentio_engine::{Engine, GraphBuilder, traits::{Aggregator, Stage}};
//! ```

pub mod context;
pub mod engine;
pub mod graph;
pub mod traits;

pub use context::RunContext;
pub use engine::Engine;
pub use graph::{GraphBuilder, WorkflowGraph};
pub use traits::{Aggregator, Stage};
