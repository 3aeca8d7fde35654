//! Subscriber-only access control for hosted video
//!
//! Decides whether a requester may list, view or download a video based on
//! per-video flags, instance-wide overrides and channel membership.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod hooks;
pub mod logging;
pub mod models;
pub mod repository;
pub mod service;

#[cfg(test)]
pub mod test_helpers;

pub use config::Config;
pub use error::{Error, Result};
pub use hooks::{HookKind, HookTarget, PluginHooks};
