//! System-wide constants and default paths.

/// Staging root holding every per-container `upper`/`work`/`merged` tree.
///
/// Backed by a `tmpfs` so overlay upper layers work even when the host
/// filesystem is itself an overlay (e.g. inside Docker).
pub const DEFAULT_STAGING_ROOT: &str = "/tmp/container";

/// Directory under the working directory that holds base images.
pub const IMAGES_DIR_NAME: &str = "images";

/// Name of the writable overlay layer inside a container's staging tree.
pub const UPPER_DIR_NAME: &str = "upper";

/// Name of the overlay bookkeeping directory.
pub const WORK_DIR_NAME: &str = "work";

/// Name of the merged mount point.
pub const MERGED_DIR_NAME: &str = "merged";

/// Longest container identifier accepted, in bytes.
pub const MAX_CONTAINER_ID_LEN: usize = 15;

/// Longest path accepted for any derived directory, in bytes.
///
/// Mirrors Linux `PATH_MAX`, which counts the trailing NUL.
pub const MAX_PATH_LEN: usize = 4096;

/// Stack handed to the isolated child by `clone(2)`.
pub const CHILD_STACK_SIZE: usize = 1024 * 1024;

/// Permission bits for every directory the runtime creates.
pub const DIR_MODE: u32 = 0o700;

/// Filesystem type passed to `mount(2)` for the union mount.
pub const OVERLAY_FSTYPE: &str = "overlay";

/// Filesystem type passed to `mount(2)` for the staging root.
pub const TMPFS_FSTYPE: &str = "tmpfs";

/// Environment variable overriding the staging root.
pub const STAGING_ROOT_ENV: &str = "LAYERBOX_STAGING_ROOT";

/// Environment variable overriding the images root.
pub const IMAGES_ROOT_ENV: &str = "LAYERBOX_IMAGES_ROOT";

/// Application name used in CLI output.
pub const APP_NAME: &str = "layerbox";
