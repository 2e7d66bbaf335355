//! Remote RAG gateway abstractions.
//!
//! This module defines the port the session orchestrator talks to:
//! - `RagGateway`: RPITIT trait for concrete backends
//! - `BoxRagGateway`: object-safe wrapper for runtime backend selection
//! - `wait_for_operation`: long-running operation polling with backoff
//! - `questions`: suggested-question payload parsing with fallback

pub mod box_gateway;
pub mod gateway;
pub mod poll;
pub mod questions;
