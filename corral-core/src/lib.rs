//! Corral Core
//!
//! Core types shared by the Corral runner-group control plane.
//!
//! This crate contains:
//! - Domain types: views of platform entities (identities, runner groups, repositories)
//! - DTOs: response envelopes and upstream request bodies

pub mod domain;
pub mod dto;
