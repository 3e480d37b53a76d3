//! Staging root for per-container overlay trees.
//!
//! Overlay upper and work directories cannot live on another overlay,
//! so container trees are staged on a `tmpfs`. The staging root is set
//! up once in the host namespace and reused by later invocations.

use std::io;
use std::path::Path;

use layerbox_common::error::{ContainerError, Result};

use super::mount::mount_tmpfs;
use super::overlayfs::create_dir;

/// Outcome of [`ensure_staging_root`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingRoot {
    /// The directory was missing; it was created and a `tmpfs` mounted on it.
    Created,
    /// The directory already existed and was left untouched.
    Existing,
}

/// Makes sure the staging root exists, mounting a `tmpfs` only when the
/// directory had to be created.
///
/// # Errors
///
/// Returns an error if the directory cannot be created (other than
/// because it already exists) or if the `tmpfs` mount fails.
pub fn ensure_staging_root(path: &Path) -> Result<StagingRoot> {
    ensure_staging_root_with(path, mount_tmpfs)
}

fn ensure_staging_root_with<M>(path: &Path, mount: M) -> Result<StagingRoot>
where
    M: FnOnce(&Path) -> Result<()>,
{
    match create_dir(path) {
        Ok(()) => {
            mount(path)?;
            tracing::info!(path = %path.display(), "staging root created");
            Ok(StagingRoot::Created)
        }
        Err(ContainerError::Io { source, .. }) if source.kind() == io::ErrorKind::AlreadyExists => {
            tracing::debug!(path = %path.display(), "staging root already present");
            Ok(StagingRoot::Existing)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn fresh_directory_is_created_and_mounted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("container");
        let mounted = Cell::new(false);
        let status = ensure_staging_root_with(&root, |p| {
            assert_eq!(p, root.as_path());
            mounted.set(true);
            Ok(())
        })
        .unwrap();
        assert_eq!(status, StagingRoot::Created);
        assert!(root.is_dir());
        assert!(mounted.get());
    }

    #[test]
    fn existing_directory_is_not_remounted() {
        let dir = tempfile::tempdir().unwrap();
        let status = ensure_staging_root_with(dir.path(), |_| {
            panic!("existing staging root must not be mounted again")
        })
        .unwrap();
        assert_eq!(status, StagingRoot::Existing);
    }

    #[test]
    fn missing_parent_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("absent").join("container");
        let err = ensure_staging_root_with(&root, |_| Ok(())).unwrap_err();
        assert!(matches!(err, ContainerError::Io { .. }));
    }

    #[test]
    fn mount_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("container");
        let err = ensure_staging_root_with(&root, |p| {
            Err(ContainerError::Mount {
                operation: "tmpfs mount",
                target: p.to_path_buf(),
                source: io::Error::from_raw_os_error(libc::EPERM),
            })
        })
        .unwrap_err();
        assert!(matches!(err, ContainerError::Mount { .. }));
    }
}
