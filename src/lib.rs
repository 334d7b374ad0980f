//! Intents swap simulator - quote engine and swap lifecycle orchestration
//!
//! Stands in for a cross-chain intents exchange API during local
//! development: callers request a deterministic quote, then poll a status
//! endpoint while the engine drives the swap to SUCCESS or FAILED through
//! pluggable transfer and cross-chain adapters.

pub mod adapters;
pub mod api;
pub mod assets;
pub mod config;
pub mod coordination;
pub mod error;
pub mod metrics;
pub mod quote;
pub mod service;
pub mod state;

pub use error::{SwapError, SwapResult};
pub use service::{SwapSimulator, SwapSimulatorBuilder};
