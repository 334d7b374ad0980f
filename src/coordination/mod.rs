//! Swap lifecycle coordination
//!
//! The coordination layer:
//! 1. Schedules exactly one orchestration task per accepted quote
//! 2. Moves the swap from PENDING_DEPOSIT through PROCESSING
//! 3. Runs the origin transfer, falling back to a placeholder reference
//! 4. Collects destination-chain evidence for cross-chain swaps
//! 5. Records SUCCESS or FAILED in the swap store

pub mod orchestrator;
pub mod scheduler;

pub use orchestrator::{ExecutionOrchestrator, ExecutorBinding};
pub use scheduler::SwapScheduler;
