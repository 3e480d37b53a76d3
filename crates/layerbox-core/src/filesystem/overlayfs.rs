//! `OverlayFS` composition for a container filesystem.
//!
//! Stacks a writable upper layer over a read-only base image, giving
//! each container copy-on-write access to the image without touching it.

use std::fs::DirBuilder;
use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};

use layerbox_common::config::{ContainerPaths, Layout};
use layerbox_common::constants::{DIR_MODE, OVERLAY_FSTYPE};
use layerbox_common::error::{ContainerError, Result};
use layerbox_common::types::ContainerSpec;

/// Creates a single directory with mode `0700`.
///
/// The parent must already exist.
///
/// # Errors
///
/// Returns [`ContainerError::Io`] on any failure, including when the
/// directory already exists.
pub fn create_dir(path: &Path) -> Result<()> {
    DirBuilder::new()
        .mode(DIR_MODE)
        .create(path)
        .map_err(|e| ContainerError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Creates a single directory, treating "already exists" as success.
///
/// # Errors
///
/// Returns [`ContainerError::Io`] on any other failure.
pub fn ensure_dir(path: &Path) -> Result<()> {
    match create_dir(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "directory created");
            Ok(())
        }
        Err(ContainerError::Io { source, .. }) if source.kind() == io::ErrorKind::AlreadyExists => {
            tracing::debug!(path = %path.display(), "directory already exists");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Creates the container's staging directory and its `upper`, `work`
/// and `merged` children.
///
/// Safe to call repeatedly for the same container. Nothing is cleaned up
/// if a later directory fails.
///
/// # Errors
///
/// Returns an error if any directory cannot be created for a reason
/// other than already existing.
pub fn prepare_directories(paths: &ContainerPaths) -> Result<()> {
    for dir in [&paths.root, &paths.upper, &paths.work, &paths.merged] {
        ensure_dir(dir)?;
    }
    Ok(())
}

/// Mounts the overlay at `merged` with `relatime` semantics.
///
/// # Errors
///
/// Returns an error if the option string is too long or if the
/// `mount(2)` syscall fails.
pub fn mount_overlay(paths: &ContainerPaths) -> Result<()> {
    use nix::mount::{MsFlags, mount};

    let opts = paths.overlay_options()?;
    mount(
        Some(OVERLAY_FSTYPE),
        &paths.merged,
        Some(OVERLAY_FSTYPE),
        MsFlags::MS_RELATIME,
        Some(opts.as_str()),
    )
    .map_err(|e| ContainerError::Mount {
        operation: "overlay mount",
        target: paths.merged.clone(),
        source: e.into(),
    })?;

    tracing::info!(
        merged = %paths.merged.display(),
        lower = %paths.lower.display(),
        "overlayfs mounted"
    );
    Ok(())
}

/// Unmounts an `OverlayFS` at the given path.
///
/// Uses `MNT_DETACH` to lazily detach the filesystem. The runtime never
/// calls this itself; trees are left in place after a container exits.
///
/// # Errors
///
/// Returns an error if the unmount syscall fails.
pub fn unmount_overlay(merged_dir: &Path) -> Result<()> {
    nix::mount::umount2(merged_dir, nix::mount::MntFlags::MNT_DETACH).map_err(|e| {
        ContainerError::Mount {
            operation: "overlay unmount",
            target: merged_dir.to_path_buf(),
            source: e.into(),
        }
    })?;
    tracing::info!(path = %merged_dir.display(), "overlayfs unmounted");
    Ok(())
}

/// Composes the container filesystem and returns the merged mount point.
///
/// Expects the staging root to exist already.
///
/// # Errors
///
/// Returns an error if a derived path is too long, the base image is
/// missing, a directory cannot be created, or the mount fails.
pub fn prepare_filesystem(spec: &ContainerSpec, layout: &Layout) -> Result<PathBuf> {
    let paths = layout.container_paths(spec)?;
    if !paths.lower.is_dir() {
        return Err(ContainerError::ImageNotFound { path: paths.lower });
    }
    prepare_directories(&paths)?;
    mount_overlay(&paths)?;
    Ok(paths.merged)
}
