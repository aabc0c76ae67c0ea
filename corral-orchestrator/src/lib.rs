//! Corral Orchestrator
//!
//! HTTP control plane that lets a team's maintainers manage the team's own
//! GitHub Actions runner group without organization admin rights.

pub mod api;
pub mod config;
pub mod service;
