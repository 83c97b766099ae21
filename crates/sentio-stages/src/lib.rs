//! The standard feedback analysis workflow.
//!
//! This crate supplies the domain stages that run on top of the engine in
//! `sentio-engine`, wired into the fixed five-stage graph that
//! [`workflow::standard_workflow`] builds:
//!
//! ```text
//!     ┌──────────────────────┐      ┌─────────────────┐
//!     │ sentiment-classifier │      │ theme-extractor │
//!     └──────────┬───────────┘      └────────┬────────┘
//!                └──────────┬────────────────┘
//!         ┌─────────────────┼─────────────────┐
//!         ▼                 ▼                 ▼
//!   hr-action-      customer-service-   product-action-
//!   generator       action-generator    generator
//!         └─────────────────┼─────────────────┘
//!                           ▼
//!                       aggregator
//! ```
//!
//! A walk-through of one run:
//!
//! 1. The two root stages each call the generation capability with the raw
//!    feedback text and normalize its answer (label coercion and confidence
//!    clamping in [`sentiment`], trim/dedupe/cap in [`themes`]).
//! 2. The three action stages run once both roots are terminal. Each reads
//!    the root payloads from its input, substitutes documented defaults for
//!    failed ones, and asks the capability for that department's follow-ups.
//! 3. [`aggregate::AnalysisAggregator`] merges whatever completed into the
//!    outbound `AnalysisResult`. It never fails; failed stages contribute
//!    defaults and the summary reports how many degraded.
//!
//! Stage identifiers are fixed strings owned by [`ids`]; graphs, reports,
//! and log lines all use them.

pub mod actions;
pub mod aggregate;
pub mod ids;
pub mod sentiment;
pub mod themes;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use actions::ActionItemStage;
pub use aggregate::AnalysisAggregator;
pub use sentiment::SentimentStage;
pub use themes::ThemeStage;
pub use workflow::{standard_engine, standard_workflow};
