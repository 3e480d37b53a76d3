//! Secure root filesystem switching via `pivot_root(2)`.
//!
//! More secure than `chroot` because it actually changes the root mount
//! point and lets the old root be detached, rather than just moving the
//! process's view of `/`.

use std::path::Path;

use layerbox_common::error::{ContainerError, Result};

use super::mount::is_mount_point;

/// Makes a prepared filesystem the root of the calling process.
///
/// Implementations must leave the working directory at the new `/` and
/// leave nothing under the previous root reachable from the current
/// mount namespace.
pub trait RootSwitcher {
    /// Switches the process root to `new_root`, which must be a live
    /// mount point.
    ///
    /// # Errors
    ///
    /// Returns an error if the switch cannot be completed. The process
    /// may be left in an intermediate state.
    fn switch_root(&self, new_root: &Path) -> Result<()>;
}

/// [`RootSwitcher`] built on `pivot_root(2)`.
///
/// Stacks the old root directly under the new one (`pivot_root(".", ".")`)
/// and lazily detaches it, so no `put_old` directory has to exist inside
/// the image.
#[derive(Debug, Clone, Copy, Default)]
pub struct PivotRoot;

impl RootSwitcher for PivotRoot {
    fn switch_root(&self, new_root: &Path) -> Result<()> {
        use nix::mount::{MntFlags, umount2};
        use nix::unistd::{chdir, pivot_root};

        let fail = |step: &'static str| {
            move |e: nix::errno::Errno| ContainerError::RootSwitch {
                path: new_root.to_path_buf(),
                step,
                source: e.into(),
            }
        };

        match is_mount_point(new_root) {
            Ok(true) => {}
            Ok(false) => return Err(fail("check mount point")(nix::errno::Errno::EINVAL)),
            Err(ContainerError::Io { source, .. }) => {
                return Err(ContainerError::RootSwitch {
                    path: new_root.to_path_buf(),
                    step: "check mount point",
                    source,
                });
            }
            Err(e) => return Err(e),
        }

        tracing::info!(new_root = %new_root.display(), "performing pivot_root");
        chdir(new_root).map_err(fail("chdir to new root"))?;
        pivot_root(".", ".").map_err(fail("pivot_root"))?;
        // the old root now sits on top of the new one at "."
        umount2(".", MntFlags::MNT_DETACH).map_err(fail("detach old root"))?;
        chdir("/").map_err(fail("chdir to /"))?;
        tracing::debug!("old root detached");
        Ok(())
    }
}
