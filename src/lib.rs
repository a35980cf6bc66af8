//! screengrab library - capture screenshots into a Dropbox Public folder.
//!
//! This library exposes the capture pipeline used by the `screengrab` CLI
//! for use in tests and other front ends.
//!
//! # Modules
//!
//! - `capture`: Full-screen and active-window capture
//! - `export`: File naming, resizing and PNG/JPEG encoding
//! - `publish`: Public URL, shortening and clipboard delivery
//! - `sync_folder`: Dropbox folder discovery
//! - `config`: Persistent settings store
//! - `settings`: Typed settings record and defaults
//! - `update`: Latest-version check
//! - `pipeline`: Capture → export → publish glue and auto-grab
//! - `error`: Error types with user-recoverable hints
#![forbid(unsafe_code)]

pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod pipeline;
pub mod publish;
pub mod settings;
pub mod sync_folder;
pub mod update;
