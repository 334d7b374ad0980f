//! Swap state management
//!
//! Handles:
//! - Swap records and their lifecycle statuses
//! - The in-memory registry keyed by quote id
//! - Optional retention of settled swaps

mod record;
mod store;

pub use record::{SwapDetails, SwapRecord, SwapStatus, SwapStatusResponse};
pub use store::{SwapStats, SwapStore};
