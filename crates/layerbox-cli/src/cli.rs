//! Command-line definition and dispatch.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use layerbox_common::config::Layout;
use layerbox_common::constants::{
    APP_NAME, DEFAULT_STAGING_ROOT, IMAGES_ROOT_ENV, STAGING_ROOT_ENV,
};
use layerbox_common::types::ContainerSpec;
use layerbox_runtime::engine::Engine;

/// Run a command in an isolated container backed by an overlay of a base image.
#[derive(Parser, Debug)]
#[command(name = APP_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding base images [default: ./images].
    #[arg(long, env = IMAGES_ROOT_ENV, value_name = "PATH")]
    pub images_root: Option<PathBuf>,

    /// Memory-backed directory holding per-container trees.
    #[arg(long, env = STAGING_ROOT_ENV, value_name = "PATH", default_value = DEFAULT_STAGING_ROOT)]
    pub staging_root: PathBuf,

    /// Container identifier, at most 15 bytes.
    pub id: String,

    /// Image directory name under the images root.
    pub image: String,

    /// Command to run inside the container, followed by its arguments.
    #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl Cli {
    /// Resolves the layout, defaulting the images root to `./images`.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be read.
    pub fn layout(&self) -> anyhow::Result<Layout> {
        let default = Layout::from_cwd().context("failed to resolve working directory")?;
        Ok(Layout::new(
            self.images_root.clone().unwrap_or(default.images_root),
            self.staging_root.clone(),
        ))
    }
}

/// Builds the container spec, launches it and waits for it to finish.
///
/// The container's own exit status is logged, not propagated.
///
/// # Errors
///
/// Returns an error if the invocation is invalid or the host-side
/// launch fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let layout = cli.layout()?;
    let spec =
        ContainerSpec::new(cli.id, cli.image, cli.command).context("invalid container spec")?;
    let report = Engine::new(layout)
        .run(spec)
        .context("failed to launch container")?;
    tracing::info!(%report, "container finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
        assert_eq!(Cli::command().get_name(), APP_NAME);
    }

    #[test]
    fn fewer_than_three_arguments_is_a_usage_error() {
        for args in [
            vec!["layerbox"],
            vec!["layerbox", "c1"],
            vec!["layerbox", "c1", "alpine"],
        ] {
            let err = Cli::try_parse_from(args.iter().copied()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument, "{args:?}");
        }
    }

    #[test]
    fn command_arguments_pass_through_verbatim() {
        let cli =
            Cli::try_parse_from(["layerbox", "c1", "alpine", "ls", "-la", "--color=never", "/"])
                .unwrap();
        assert_eq!(cli.id, "c1");
        assert_eq!(cli.image, "alpine");
        assert_eq!(cli.command, ["ls", "-la", "--color=never", "/"]);
    }

    #[test]
    fn options_precede_positionals() {
        let cli = Cli::try_parse_from([
            "layerbox",
            "--staging-root",
            "/run/layerbox",
            "--images-root",
            "/srv/images",
            "c1",
            "alpine",
            "sh",
        ])
        .unwrap();
        let layout = cli.layout().unwrap();
        assert_eq!(layout.staging_root, PathBuf::from("/run/layerbox"));
        assert_eq!(layout.images_root, PathBuf::from("/srv/images"));
    }

    #[test]
    fn layout_defaults_match_fixed_paths() {
        let cli = Cli::try_parse_from(["layerbox", "c1", "alpine", "sh"]).unwrap();
        if std::env::var_os(STAGING_ROOT_ENV).is_some() || std::env::var_os(IMAGES_ROOT_ENV).is_some()
        {
            return;
        }
        let layout = cli.layout().unwrap();
        assert_eq!(layout.staging_root, PathBuf::from(DEFAULT_STAGING_ROOT));
        assert_eq!(layout.images_root, std::env::current_dir().unwrap().join("images"));
    }
}
