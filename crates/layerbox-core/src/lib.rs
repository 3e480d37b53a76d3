//! # layerbox-core
//!
//! Low-level Linux isolation primitives for the layerbox runtime.
//!
//! This crate provides safe abstractions over:
//! - **Namespaces**: spawning a child in fresh mount and PID namespaces,
//!   and making its mount tree private.
//! - **Filesystem**: the `tmpfs` staging root, `OverlayFS` composition,
//!   and root switching via `pivot_root`.
//!
//! All unsafe system calls are encapsulated in safe wrappers with
//! proper error handling and `// SAFETY:` documentation.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod filesystem;
pub mod namespace;
