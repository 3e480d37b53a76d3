//! Runtime engine that launches a container and waits for it.

use layerbox_common::config::Layout;
use layerbox_common::error::Result;
use layerbox_common::types::ContainerSpec;
use layerbox_core::filesystem::pivot_root::{PivotRoot, RootSwitcher};
use layerbox_core::filesystem::staging::ensure_staging_root;
use layerbox_core::namespace::{ExitReport, NamespaceConfig, spawn_isolated, wait_for_exit};

use crate::container::IsolatedContainer;

/// Exit code of the isolated context when its pipeline fails.
pub const CHILD_FAILURE_CODE: isize = 1;

/// Host-side coordinator for a single container launch.
///
/// Holds only immutable configuration; the spec itself is moved into the
/// isolated context by [`Engine::run`].
pub struct Engine {
    layout: Layout,
    namespaces: NamespaceConfig,
    switcher: Box<dyn RootSwitcher>,
}

impl Engine {
    /// Creates an engine using `pivot_root` and fresh mount and PID
    /// namespaces.
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            namespaces: NamespaceConfig::default(),
            switcher: Box::new(PivotRoot),
        }
    }

    /// Replaces the root switch implementation.
    #[must_use]
    pub fn with_switcher(mut self, switcher: Box<dyn RootSwitcher>) -> Self {
        self.switcher = switcher;
        self
    }

    /// Replaces the namespace configuration.
    #[must_use]
    pub fn with_namespaces(mut self, namespaces: NamespaceConfig) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// Layout used to compose containers.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Launches `spec` and blocks until its isolated context is reaped.
    ///
    /// The child's own exit status is reported, not interpreted: a failed
    /// setup inside the child shows up as `Exited(1)` after the child has
    /// printed its diagnostic.
    ///
    /// # Errors
    ///
    /// Returns an error if the staging root cannot be prepared, if the
    /// isolated context cannot be created, or if waiting on it fails.
    pub fn run(&self, spec: ContainerSpec) -> Result<ExitReport> {
        let staging = ensure_staging_root(&self.layout.staging_root)?;
        tracing::debug!(?staging, root = %self.layout.staging_root.display(), "staging root ready");

        tracing::info!(
            id = %spec.id(),
            image = %spec.image(),
            cmd = ?spec.command(),
            "launching container"
        );
        let layout = &self.layout;
        let switcher = self.switcher.as_ref();
        let pid = spawn_isolated(&self.namespaces, move || {
            isolated_main(spec, layout, switcher)
        })?;

        wait_for_exit(pid)
    }
}

/// Top-level handler of the isolated context.
///
/// The only place on the child side that reports a failure and picks the
/// exit code.
#[allow(clippy::print_stderr)]
fn isolated_main(spec: ContainerSpec, layout: &Layout, switcher: &dyn RootSwitcher) -> isize {
    let mut container = IsolatedContainer::new(spec, layout, switcher);
    let err = container.run();
    tracing::debug!(state = %container.state(), error = %err, "container setup failed");
    eprintln!("Error: {err}");
    CHILD_FAILURE_CODE
}
