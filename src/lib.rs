//! Traffic-mirror launch-configuration manager.
//!
//! Keeps the launch script for a gor traffic-mirroring process synchronized
//! with a dynamically changing set of mirror destination endpoints, without
//! disrupting the mirroring process more than necessary.
//!
//! ```text
//!   Endpoint Source ──add/remove──▶ Reconciliation Engine
//!                                        │ debounced tick
//!                                        ▼
//!                                 Command Generation ──▶ Launch-Script Writer
//!                                        │                      │ changed
//!                                        ▼                      ▼
//!                                 (fallback when empty)   Process Reaper
//!                                                               │
//!                                          external supervisor restarts gor
//! ```
//!
//! The engine itself mirrors no traffic. gor has no in-place reload, so the
//! full update cycle is: write a new launch script, kill the old process,
//! and rely on the external supervisor to start it back up.

// Core subsystems
pub mod command;
pub mod config;
pub mod engine;
pub mod source;

// Side-effect boundaries
pub mod reaper;
pub mod script;

pub use config::{MirrorConfig, MirrorPaths};
pub use engine::MirrorUpdater;
pub use source::{Endpoint, EndpointSource};
