//! Gemini File Search backend.
//!
//! Provides [`GeminiGateway`], the production implementation of the
//! `RagGateway` port.

pub mod client;
pub mod types;

pub use client::GeminiGateway;
