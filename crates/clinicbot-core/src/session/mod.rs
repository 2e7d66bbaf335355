//! Session lifecycle orchestration.
//!
//! `SessionOrchestrator` owns the single `Session` and sequences
//! setup -> upload -> binding -> chat, calling the remote gateway and
//! applying the crisis filter on every outbound message.

pub mod orchestrator;

#[cfg(test)]
mod tests;

pub use orchestrator::{SessionOrchestrator, SessionSettings};
