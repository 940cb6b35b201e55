//! Respite: self-care breaks for the terminal.
//!
//! Two self-contained subsystems under one roof:
//! - `core`: the falling-block puzzle engine (pure in-memory state
//!   transitions, no I/O — callable from any thread model).
//! - `content`: the batch-rotation system that keeps a deduplicated,
//!   periodically refreshed sample of content per kind, usable fully
//!   offline after the first success.
//!
//! `term` and `input` are the thin terminal shell around them.

pub mod config;
pub mod content;
pub mod core;
pub mod input;
pub mod term;
pub mod types;
