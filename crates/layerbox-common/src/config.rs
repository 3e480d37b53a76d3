//! Filesystem layout used to compose a container.

use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_STAGING_ROOT, IMAGES_DIR_NAME, MAX_PATH_LEN, MERGED_DIR_NAME, UPPER_DIR_NAME,
    WORK_DIR_NAME,
};
use crate::error::{ContainerError, Result};
use crate::types::ContainerSpec;

/// Where base images are read from and where container trees are staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Directory holding one subdirectory per base image.
    pub images_root: PathBuf,
    /// Memory-backed directory holding one tree per container id.
    pub staging_root: PathBuf,
}

impl Layout {
    /// Creates a layout from explicit roots.
    #[must_use]
    pub const fn new(images_root: PathBuf, staging_root: PathBuf) -> Self {
        Self {
            images_root,
            staging_root,
        }
    }

    /// Default layout: `{cwd}/images` and `/tmp/container`.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn from_cwd() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| ContainerError::Io {
            path: PathBuf::from("."),
            source: e,
        })?;
        Ok(Self::new(
            cwd.join(IMAGES_DIR_NAME),
            PathBuf::from(DEFAULT_STAGING_ROOT),
        ))
    }

    /// Derives every path used to compose `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::PathTooLong`] if any derived path would
    /// not fit in `PATH_MAX`.
    pub fn container_paths(&self, spec: &ContainerSpec) -> Result<ContainerPaths> {
        let root = self.staging_root.join(spec.id().as_str());
        let paths = ContainerPaths {
            lower: self.images_root.join(spec.image().as_str()),
            upper: root.join(UPPER_DIR_NAME),
            work: root.join(WORK_DIR_NAME),
            merged: root.join(MERGED_DIR_NAME),
            root,
        };
        for path in [&paths.lower, &paths.upper, &paths.work, &paths.merged] {
            check_path_len(path)?;
        }
        Ok(paths)
    }
}

/// Paths of one container's overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerPaths {
    /// Read-only base image.
    pub lower: PathBuf,
    /// Per-container staging directory, parent of the three below.
    pub root: PathBuf,
    /// Writable layer.
    pub upper: PathBuf,
    /// Overlay bookkeeping area.
    pub work: PathBuf,
    /// Union mount point.
    pub merged: PathBuf,
}

impl ContainerPaths {
    /// Overlay mount data: `lowerdir=…,upperdir=…,workdir=…`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::PathTooLong`] if the option string would
    /// not fit in a single page, which the kernel rejects.
    pub fn overlay_options(&self) -> Result<String> {
        let opts = format!(
            "lowerdir={},upperdir={},workdir={}",
            self.lower.display(),
            self.upper.display(),
            self.work.display()
        );
        if opts.len() >= MAX_PATH_LEN {
            return Err(ContainerError::PathTooLong {
                path: self.merged.clone(),
                max: MAX_PATH_LEN,
            });
        }
        Ok(opts)
    }
}

fn check_path_len(path: &Path) -> Result<()> {
    // PATH_MAX includes the terminating NUL
    if path.as_os_str().as_bytes().len() >= MAX_PATH_LEN {
        return Err(ContainerError::PathTooLong {
            path: path.to_path_buf(),
            max: MAX_PATH_LEN,
        });
    }
    Ok(())
}
