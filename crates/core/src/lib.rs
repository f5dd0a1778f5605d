//! Domain layer for the hook relay.
//!
//! Holds everything that does not touch the network or the hook document:
//! the [`hook::Hook`] entity, registration validation, the signature
//! verifier, and the event router with its template renderer.

pub mod error;
pub mod events;
pub mod hook;
pub mod render;
pub mod signature;
pub mod types;
pub mod validation;
