//! Middleware module
//!
//! This module contains request checks applied before webhook processing

pub mod signature;

// Re-export commonly used middleware
pub use signature::{compute_signature, verify_signature, SIGNATURE_HEADER};
