//! Data Transfer Objects
//!
//! Bodies exchanged over HTTP, both with Corral's callers (envelopes and
//! payloads) and with the CI platform (request bodies).

pub mod envelope;
pub mod group;
