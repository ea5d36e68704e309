//! Reelmatch - keyword playlist builder for Plex libraries
//!
//! This library crate exposes the core functionality for integration testing.

pub mod catalog;
pub mod config;
pub mod matching;
pub mod metadata;
pub mod model;
pub mod pipeline;
pub mod plex;
