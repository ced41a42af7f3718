//! Stable exit codes for agent CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid scenario/config/trace or other errors.
pub const INVALID: i32 = 1;
/// `agent run` finished without a confident diagnosis (final confidence
/// below the weak-confidence threshold).
pub const NO_CONFIDENT_DIAGNOSIS: i32 = 2;
