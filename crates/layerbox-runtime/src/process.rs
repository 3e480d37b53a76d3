//! Hand-off from the runtime to the container's command.

use std::convert::Infallible;
use std::ffi::CString;

use layerbox_common::error::{ContainerError, Result};

/// Replaces the current process image with `command`.
///
/// `command[0]` is resolved through `PATH` like a shell would; the rest
/// are passed through unchanged as its arguments. `SIGPIPE` is restored
/// to its default action first, since ignored signals survive `execve`.
/// On success this never returns.
///
/// # Errors
///
/// Returns [`ContainerError::Exec`] if the program cannot be found or
/// executed, and [`ContainerError::InvalidSpec`] if `command` is empty
/// or contains a NUL byte.
pub fn exec_command(command: &[String]) -> Result<Infallible> {
    let Some(program) = command.first() else {
        return Err(ContainerError::InvalidSpec {
            field: "command",
            message: "at least one element is required".into(),
        });
    };
    let args = command
        .iter()
        .map(|arg| CString::new(arg.as_bytes()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| ContainerError::InvalidSpec {
            field: "command",
            message: e.to_string(),
        })?;

    restore_sigpipe(program)?;
    tracing::info!(cmd = ?command, "replacing process image");
    nix::unistd::execvp(&args[0], &args).map_err(|e| ContainerError::Exec {
        command: program.clone(),
        source: e.into(),
    })
}

// The Rust runtime ignores SIGPIPE at startup.
#[allow(unsafe_code)]
fn restore_sigpipe(program: &str) -> Result<()> {
    use nix::sys::signal::{SigHandler, Signal, signal};

    // SAFETY: installs the default disposition, no handler code runs and
    // no other thread exists in the isolated context.
    let _ = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) }.map_err(|e| {
        ContainerError::Exec {
            command: program.to_owned(),
            source: e.into(),
        }
    })?;
    Ok(())
}
