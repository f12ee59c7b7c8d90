//! Chat Spaces - membership lifecycle for discussion spaces mirrored in an
//! external group-messaging provider.
//!
//! Local storage is the source of truth. Each membership transition commits
//! locally with its member-count change, then converges the provider on a
//! best-effort basis; divergence is reported and healed by reconciliation.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
