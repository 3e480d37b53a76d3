//! Domain primitive types used across the layerbox workspace.

use std::fmt;
use std::path::{Component, Path};

use crate::constants::MAX_CONTAINER_ID_LEN;
use crate::error::{ContainerError, Result};

// both names end up unescaped in the overlay mount data
const OVERLAY_SEPARATORS: [char; 3] = [',', ':', '\\'];

/// Identifier of a container, used as its staging directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(String);

impl ContainerId {
    /// Validates and wraps a container identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::IdTooLong`] when the identifier is longer
    /// than [`MAX_CONTAINER_ID_LEN`] bytes, and
    /// [`ContainerError::InvalidSpec`] when it is empty, contains `/`, an
    /// overlay option separator or a NUL byte, or names `.`/`..`.
    pub fn parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(invalid("id", "must not be empty"));
        }
        if id.len() > MAX_CONTAINER_ID_LEN {
            return Err(ContainerError::IdTooLong {
                len: id.len(),
                max: MAX_CONTAINER_ID_LEN,
            });
        }
        if id == "." || id == ".." {
            return Err(invalid("id", "must not be `.` or `..`"));
        }
        if id.contains('/') || id.contains('\0') {
            return Err(invalid("id", "must not contain `/` or NUL"));
        }
        if id.contains(OVERLAY_SEPARATORS) {
            return Err(invalid("id", "must not contain `,`, `:` or `\\`"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relative name of a base image directory under the images root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageName(String);

impl ImageName {
    /// Validates and wraps an image name.
    ///
    /// Nested names such as `debian/bookworm` are accepted; anything that
    /// could escape the images root is not.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::InvalidSpec`] when the name is empty,
    /// absolute, contains a `..` component, an overlay option separator
    /// or a NUL byte.
    pub fn parse(image: impl Into<String>) -> Result<Self> {
        let image = image.into();
        if image.is_empty() {
            return Err(invalid("image", "must not be empty"));
        }
        if image.contains('\0') {
            return Err(invalid("image", "must not contain NUL"));
        }
        if image.contains(OVERLAY_SEPARATORS) {
            return Err(invalid("image", "must not contain `,`, `:` or `\\`"));
        }
        let path = Path::new(&image);
        if path.is_absolute() {
            return Err(invalid("image", "must be relative to the images root"));
        }
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(invalid("image", "must not contain `..`"));
        }
        Ok(Self(image))
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable description of the single container to launch.
///
/// Built once on the host side, then moved into the isolated context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    id: ContainerId,
    image: ImageName,
    command: Vec<String>,
}

impl ContainerSpec {
    /// Validates raw invocation values and builds a spec.
    ///
    /// # Errors
    ///
    /// Returns an error if the id or image is malformed, if `command` is
    /// empty, or if any command element contains a NUL byte.
    pub fn new(
        id: impl Into<String>,
        image: impl Into<String>,
        command: Vec<String>,
    ) -> Result<Self> {
        let id = ContainerId::parse(id)?;
        let image = ImageName::parse(image)?;
        if command.is_empty() {
            return Err(invalid("command", "at least one element is required"));
        }
        if command.iter().any(|arg| arg.contains('\0')) {
            return Err(invalid("command", "arguments must not contain NUL"));
        }
        Ok(Self { id, image, command })
    }

    /// Container identifier.
    #[must_use]
    pub const fn id(&self) -> &ContainerId {
        &self.id
    }

    /// Base image name.
    #[must_use]
    pub const fn image(&self) -> &ImageName {
        &self.image
    }

    /// Executable followed by its arguments; never empty.
    #[must_use]
    pub fn command(&self) -> &[String] {
        &self.command
    }
}

/// Lifecycle state of the isolated context.
///
/// Transitions are strictly forward. `ExecFailed` is not a variant: it
/// is the `ContainerError::Exec` value the pipeline returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IsolatedState {
    /// Context exists, root mount made private, nothing composed yet.
    Created,
    /// Overlay mounted at `merged`.
    FilesystemReady,
    /// `merged` is the process root.
    RootSwitched,
    /// About to replace the process image.
    Running,
}

impl fmt::Display for IsolatedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::FilesystemReady => write!(f, "filesystem-ready"),
            Self::RootSwitched => write!(f, "root-switched"),
            Self::Running => write!(f, "running"),
        }
    }
}

fn invalid(field: &'static str, message: &str) -> ContainerError {
    ContainerError::InvalidSpec {
        field,
        message: message.to_owned(),
    }
}
