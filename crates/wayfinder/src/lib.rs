//! Wayfinder - Activity Recommendations from a Local Model
//!
//! A small retrieval-augmented generation pipeline: pick the corpus document
//! with the highest Jaccard word overlap with the query, wrap it and the
//! query in an instruction prompt, and stream the answer from an
//! Ollama-style generate endpoint.

pub mod commands;
pub mod config;
pub mod corpus;
pub mod error;
pub mod generation;
pub mod pipeline;
pub mod prompt;
pub mod retriever;

pub use error::{Result, WayfinderError};
