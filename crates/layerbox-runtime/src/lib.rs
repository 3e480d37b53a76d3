//! Container launch pipeline for the layerbox runtime.
//!
//! [`engine::Engine`] runs on the host: it prepares the staging root,
//! spawns the isolated context and reaps it. Inside that context
//! [`container::IsolatedContainer`] composes the filesystem, switches
//! root and hands off to [`process::exec_command`].

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod container;
pub mod engine;
pub mod process;
