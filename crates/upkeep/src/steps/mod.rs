//! The canonical maintenance steps
//!
//! Each step is a side-effecting operation over the external command
//! runner that yields exactly one outcome. None of them may abort the run.

pub mod cleanup;
pub mod monitor;
pub mod os_update;
pub mod pihole;
pub mod root_hints;
