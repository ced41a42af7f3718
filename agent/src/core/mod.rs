//! Deterministic, pure decision logic for the diagnosis loop.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod action;
pub mod evidence;
pub mod fallback;
pub mod hypothesis;
pub mod selection;
pub mod stopping;
pub mod types;
