//! Common test utilities for the screengrab CLI.
//!
//! - `cli`: CLI runner with output verification and fluent assertions
//! - `env`: Process environment guards
//! - `fixtures`: Temporary Dropbox folders, client databases and settings stores
//! - `assertions`: Output assertions shared by the suites
#![allow(dead_code)]

pub mod cli;
pub mod env;
pub mod fixtures;

use tracing_subscriber::EnvFilter;

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
