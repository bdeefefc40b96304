//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, ssh and
//! rsync transport, git, key generation, HTTP probing, config and logging.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod config;
pub mod fs;
pub mod git;
pub mod http_probe;
pub mod keys;
pub mod logging;
pub mod rsync;
pub mod ssh;
