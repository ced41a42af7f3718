//! Side-effecting operations: file-backed tools, configuration, scenario
//! loading, and trace persistence. Isolated from `core` to enable scripted
//! invokers in tests.

pub mod config;
pub mod invoker;
pub mod scenario;
pub mod tools;
pub mod trace;
