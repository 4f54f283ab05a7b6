//! Test helpers module
//!
//! This module provides utilities and helpers for testing the Logbook
//! application: in-memory domain fakes, a mock LINE API server and a test
//! context wiring the dialogue together.

#![allow(dead_code)]

pub mod fakes;
pub mod line_mock;
pub mod test_context;

pub use fakes::*;
pub use line_mock::*;
pub use test_context::*;
