//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (e.g., ChatProvider) and the RPC transport.

pub mod matrix;
pub mod rpc;
