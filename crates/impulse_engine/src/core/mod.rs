//! Core engine services
//!
//! Currently the configuration system; engine-wide services that are not
//! foundation-level utilities belong here.

pub mod config;

pub use config::{Config, ConfigError, EngineConfig, PhysicsConfig, PartitionConfig, ProtocolConfig};
