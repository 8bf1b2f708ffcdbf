//! vbrindex - VBRI seek indexes for MPEG audio files
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod indexer;
