//! Core types and definitions for PITFALL match sessions.
//!
//! This crate defines the vocabulary shared across all other crates:
//! identities, replicated records, client messages, broadcasts, the map
//! description format, configuration, constants and error types.
//! It has no dependency on the physics engine or any runtime framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod map;
pub mod state;
pub mod types;
