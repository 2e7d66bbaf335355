//! Business logic and port definitions for the clinic assistant.
//!
//! This crate defines the "ports" (gateway, credential and patient
//! directory traits) that the infrastructure layer implements, plus the
//! session state machine, markup renderer and crisis detector. It depends
//! only on `clinicbot-types` -- never on `clinicbot-infra` or any HTTP crate.

pub mod credential;
pub mod crisis;
pub mod event;
pub mod i18n;
pub mod identity;
pub mod markup;
pub mod rag;
pub mod session;
