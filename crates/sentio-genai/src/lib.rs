//! # sentio-genai
//!
//! Generation capability backends for the Sentio feedback workflow.
//!
//! This crate provides:
//! - The [`TextGenerator`] trait every stage calls through
//! - [`LiveGenerator`], a chat-completions HTTP client with retries
//! - [`DemoGenerator`], a deterministic keyword-driven stand-in
//! - [`create_generator`], which picks a backend from configuration at
//!   startup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sentio_genai::{create_generator, GenerationRequest, TextGenerator};
//! ```

pub mod demo;
pub mod generator;
pub mod live;

pub use demo::DemoGenerator;
pub use generator::{create_generator, GenerationRequest, TextGenerator};
pub use live::LiveGenerator;
