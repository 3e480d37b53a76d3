//! Filesystem management for container isolation.
//!
//! Provides the `tmpfs` staging root, `OverlayFS` composition over a base
//! image, `pivot_root` for switching the process root, and mount-table
//! helpers.

pub mod mount;
pub mod overlayfs;
pub mod pivot_root;
pub mod staging;
