//! Shared domain types for the clinic assistant.
//!
//! This crate contains the data model used across the workspace: the
//! session record and its lifecycle status, chat messages, patients,
//! rendered markup blocks, configuration, and the error enums.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod event;
pub mod markup;
pub mod message;
pub mod patient;
pub mod rag;
pub mod session;
