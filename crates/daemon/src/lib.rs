// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Valor daemon library: configuration and the worker supervisor.
//!
//! The binary (`valord`) is thin; everything it wires together lives
//! here so tests can drive the same paths.

pub mod config;
pub mod env;
pub mod supervisor;

pub use config::{Config, ConfigError};
pub use supervisor::{Supervisor, SupervisorExit};
