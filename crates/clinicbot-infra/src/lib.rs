//! Infrastructure layer for the clinic assistant.
//!
//! Contains implementations of the ports defined in `clinicbot-core`: the
//! Gemini File Search gateway, the env/keychain credential store and the
//! mock patient directory, plus config loading and local file helpers.

pub mod config;
pub mod credential;
pub mod filesystem;
pub mod gemini;
pub mod patients;
