//! Deterministic single-agent diagnosis loop for Amazon ads performance.
//!
//! The agent investigates why an ASIN's advertising underperforms by cycling
//! through observe, belief update, tool selection, and stopping checks, then
//! synthesizes a final action plan. The architecture enforces a strict
//! separation:
//!
//! - **[`core`]**: Pure, deterministic logic (beliefs, evidence, selection,
//!   stopping, action synthesis). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (file-backed tools, config,
//!   scenario loading, trace persistence). Isolated to enable scripted
//!   invokers in tests.
//!
//! Orchestration modules ([`run`], [`memory`], [`sink`], [`render`],
//! [`report`]) coordinate core logic with I/O to implement CLI commands.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod memory;
pub mod render;
pub mod report;
pub mod run;
pub mod sink;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
