//! # layerbox-common
//!
//! Shared types, error definitions, path layout, and constants used
//! across the layerbox workspace.
//!
//! This crate is the leaf of the dependency graph. It performs no
//! syscalls beyond reading the working directory, so everything in it
//! can be unit tested without privileges.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
