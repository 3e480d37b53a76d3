//! Linux namespace management for container isolation.
//!
//! Provides a safe wrapper around `clone(2)` that starts a child in the
//! requested namespaces, and the matching reap on the parent side.

pub mod mount;
pub mod pid;

use std::fmt;

use layerbox_common::constants::CHILD_STACK_SIZE;
use layerbox_common::error::{ContainerError, Result};
use nix::errno::Errno;
use nix::sched::CloneFlags;
use nix::sys::signal::Signal;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::Pid;

/// Which namespaces the isolated child gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceConfig {
    /// Private mount table.
    pub mount: bool,
    /// Private PID space; the child becomes its PID 1.
    pub pid: bool,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            mount: true,
            pid: true,
        }
    }
}

impl NamespaceConfig {
    /// Translates the configuration into `clone(2)` flags.
    #[must_use]
    pub fn clone_flags(&self) -> CloneFlags {
        let mut flags = CloneFlags::empty();
        if self.mount {
            flags |= CloneFlags::CLONE_NEWNS;
        }
        if self.pid {
            flags |= CloneFlags::CLONE_NEWPID;
        }
        flags
    }
}

/// How the isolated child terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReport {
    /// Normal exit with the given status code.
    Exited(i32),
    /// Killed by a signal.
    Signaled(Signal),
}

impl ExitReport {
    /// Whether the child exited with status `0`.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

impl fmt::Display for ExitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exited with status {code}"),
            Self::Signaled(sig) => write!(f, "killed by {sig}"),
        }
    }
}

/// Runs `child` in a new process carrying the configured namespace flags.
///
/// The parent is notified of the child's end with `SIGCHLD`. The child
/// runs on a dedicated [`CHILD_STACK_SIZE`] stack and exits with the
/// value `child` returns, unless it replaces its own image first.
///
/// # Errors
///
/// Returns an error if `clone(2)` fails, typically `EPERM` without
/// `CAP_SYS_ADMIN`.
#[allow(unsafe_code)]
pub fn spawn_isolated<F>(config: &NamespaceConfig, child: F) -> Result<Pid>
where
    F: FnOnce() -> isize,
{
    let mut child = Some(child);
    let callback = Box::new(move || child.take().map_or(1, |f| f()));
    let mut stack = vec![0_u8; CHILD_STACK_SIZE];
    let flags = config.clone_flags();

    // SAFETY: CLONE_VM is not requested, so the child runs on its own
    // copy of the address space (including `stack`) and the callback is
    // invoked exactly once there. The parent only drops its copy.
    let pid = unsafe { nix::sched::clone(callback, &mut stack, flags, Some(libc::SIGCHLD)) }
        .map_err(|e| ContainerError::Namespace {
            message: format!("clone with {flags:?} failed"),
            source: e.into(),
        })?;

    tracing::info!(pid = pid.as_raw(), ?flags, "isolated context spawned");
    Ok(pid)
}

/// Blocks until `pid` terminates and reaps it.
///
/// # Errors
///
/// Returns an error if `waitpid(2)` fails for any reason other than
/// `EINTR`.
pub fn wait_for_exit(pid: Pid) -> Result<ExitReport> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => {
                let report = ExitReport::Exited(code);
                tracing::info!(pid = pid.as_raw(), %report, "isolated context reaped");
                return Ok(report);
            }
            Ok(WaitStatus::Signaled(_, sig, _)) => {
                let report = ExitReport::Signaled(sig);
                tracing::info!(pid = pid.as_raw(), %report, "isolated context reaped");
                return Ok(report);
            }
            Ok(status) => tracing::debug!(?status, "ignoring non-terminal wait status"),
            Err(Errno::EINTR) => {}
            Err(e) => {
                return Err(ContainerError::Namespace {
                    message: format!("waitpid({pid}) failed"),
                    source: e.into(),
                });
            }
        }
    }
}
