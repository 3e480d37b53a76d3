//! The isolated side of a container launch.
//!
//! Runs as PID 1 of the new PID namespace, inside a private mount
//! namespace, and walks `Created → FilesystemReady → RootSwitched →
//! Running` before replacing itself with the container command.

use layerbox_common::config::Layout;
use layerbox_common::error::{ContainerError, Result};
use layerbox_common::types::{ContainerSpec, IsolatedState};
use layerbox_core::filesystem::overlayfs::prepare_filesystem;
use layerbox_core::filesystem::pivot_root::RootSwitcher;
use layerbox_core::namespace::{mount::make_root_private, pid::is_namespace_init};

use crate::process::exec_command;

/// A container being brought up inside its isolated context.
pub struct IsolatedContainer<'a> {
    spec: ContainerSpec,
    layout: &'a Layout,
    switcher: &'a dyn RootSwitcher,
    state: IsolatedState,
}

impl<'a> IsolatedContainer<'a> {
    /// Takes ownership of the spec; starts in `Created`.
    #[must_use]
    pub fn new(spec: ContainerSpec, layout: &'a Layout, switcher: &'a dyn RootSwitcher) -> Self {
        Self {
            spec,
            layout,
            switcher,
            state: IsolatedState::Created,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> IsolatedState {
        self.state
    }

    /// Runs the pipeline to completion.
    ///
    /// Only returns when a step failed; the returned error is the
    /// terminal condition of the context. `ExecFailed` is the
    /// [`ContainerError::Exec`] case.
    pub fn run(&mut self) -> ContainerError {
        match self.try_run() {
            Ok(never) => match never {},
            Err(e) => {
                tracing::debug!(state = %self.state, error = %e, "isolated pipeline aborted");
                e
            }
        }
    }

    fn try_run(&mut self) -> Result<std::convert::Infallible> {
        tracing::debug!(
            id = %self.spec.id(),
            namespace_init = is_namespace_init(),
            "entered isolated context"
        );
        make_root_private()?;

        let merged = prepare_filesystem(&self.spec, self.layout)?;
        self.advance(IsolatedState::FilesystemReady);

        self.switcher.switch_root(&merged)?;
        self.advance(IsolatedState::RootSwitched);

        self.advance(IsolatedState::Running);
        exec_command(self.spec.command())
    }

    fn advance(&mut self, next: IsolatedState) {
        debug_assert!(next > self.state, "{} -> {next}", self.state);
        tracing::info!(id = %self.spec.id(), from = %self.state, to = %next, "state transition");
        self.state = next;
    }
}
