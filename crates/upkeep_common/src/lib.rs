//! Shared library for the upkeep maintenance orchestrator
//!
//! Contains the pieces that carry no orchestration policy of their own:
//! external command execution, the run lock, the session log, version-tag
//! handling and configuration.

pub mod command_exec;
pub mod config;
pub mod lock;
pub mod session_log;
pub mod version;

pub use command_exec::{CmdOutput, CommandRunner};
pub use config::Config;
pub use lock::{LockError, RunLock};
pub use session_log::SessionLog;
