//! Observability for the clinic assistant: subscriber setup and the
//! attribute names used on remote-call spans.

pub mod rag_attrs;
pub mod tracing_setup;
