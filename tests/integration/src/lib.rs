//! Integration test utilities for the direct-messaging server
//!
//! Spawns the real HTTP stack on an ephemeral port and drives it with
//! `reqwest`.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
