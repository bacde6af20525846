//! `herald-core` — building blocks shared by the emitter crates.
//!
//! This crate contains no dispatch logic: only identifiers, the error model
//! and configuration.

pub mod config;
pub mod error;
pub mod id;

pub use config::{DEFAULT_MAX_LISTENERS, EmitterConfig, OverflowPolicy};
pub use error::{EmitterError, EmitterResult, ErrorKind, SharedError};
pub use id::{EventId, ListenerId, Symbol};
