//! services/app/src/adapters/mod.rs
//!
//! Declares the concrete implementations of the core's transport port.

pub mod http;
pub mod mock;
