//! Mount utilities for container filesystem setup.

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use layerbox_common::constants::TMPFS_FSTYPE;
use layerbox_common::error::{ContainerError, Result};

/// Mounts a fresh `tmpfs` at `target`.
///
/// # Errors
///
/// Returns an error if the `mount(2)` syscall fails.
pub fn mount_tmpfs(target: &Path) -> Result<()> {
    use nix::mount::{MsFlags, mount};

    mount(
        Some(TMPFS_FSTYPE),
        target,
        Some(TMPFS_FSTYPE),
        MsFlags::empty(),
        None::<&str>,
    )
    .map_err(|e| ContainerError::Mount {
        operation: "tmpfs mount",
        target: target.to_path_buf(),
        source: e.into(),
    })?;
    tracing::info!(target = %target.display(), "tmpfs mounted");
    Ok(())
}

/// Returns whether `path` is the root of a mount.
///
/// A directory is a mount point when it lives on a different device
/// than its parent, or when it is its own parent (`/`).
///
/// # Errors
///
/// Returns an error if `path` or its parent cannot be inspected.
pub fn is_mount_point(path: &Path) -> Result<bool> {
    let path = path.canonicalize().map_err(|e| ContainerError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let Some(parent) = path.parent() else {
        return Ok(true);
    };
    let meta = fs::metadata(&path).map_err(|e| ContainerError::Io {
        path: path.clone(),
        source: e,
    })?;
    let parent_meta = fs::metadata(parent).map_err(|e| ContainerError::Io {
        path: parent.to_path_buf(),
        source: e,
    })?;
    Ok(meta.dev() != parent_meta.dev() || meta.ino() == parent_meta.ino())
}

/// Lists the mount points visible in the calling process's namespace.
///
/// # Errors
///
/// Returns an error if `/proc/self/mountinfo` cannot be read.
pub fn mount_points() -> Result<Vec<PathBuf>> {
    let fname = Path::new("/proc/self/mountinfo");
    let contents = fs::read_to_string(fname).map_err(|e| ContainerError::Io {
        path: fname.to_path_buf(),
        source: e,
    })?;
    Ok(parse_mount_points(&contents))
}

// mountinfo lines look like:
// 36 35 98:0 /mnt1 /mnt2 rw,noatime master:1 - ext3 /dev/root rw,errors=continue
// the mount point is the fifth field, with spaces escaped as \040
fn parse_mount_points(contents: &str) -> Vec<PathBuf> {
    contents
        .lines()
        .filter_map(|line| line.split_ascii_whitespace().nth(4))
        .map(|field| PathBuf::from(field.replace("\\040", " ")))
        .collect()
}
