//! Mount namespace isolation.
//!
//! A fresh mount namespace starts as a copy of the parent's table, with
//! propagation inherited. On hosts where `/` is shared (systemd's
//! default) mounts would leak back out unless propagation is cut first.

use std::path::PathBuf;

use layerbox_common::error::{ContainerError, Result};

/// Re-marks every mount under `/` as private, recursively.
///
/// Must run before any other mount inside the new namespace.
///
/// # Errors
///
/// Returns an error if the `mount(2)` syscall fails.
pub fn make_root_private() -> Result<()> {
    use nix::mount::{MsFlags, mount};

    mount(
        None::<&str>,
        "/",
        None::<&str>,
        MsFlags::MS_PRIVATE | MsFlags::MS_REC,
        None::<&str>,
    )
    .map_err(|e| ContainerError::Mount {
        operation: "make / private",
        target: PathBuf::from("/"),
        source: e.into(),
    })?;
    tracing::debug!("root mount propagation set to private");
    Ok(())
}
