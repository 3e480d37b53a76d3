//! PID namespace isolation.
//!
//! The first process cloned into a new PID namespace is its init and
//! sees itself as PID 1.

use nix::unistd::{Pid, getpid};

/// Returns whether the calling process is init of its PID namespace.
#[must_use]
pub fn is_namespace_init() -> bool {
    getpid() == Pid::from_raw(1)
}
