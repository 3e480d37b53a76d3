//! End-to-end tests for the `layerbox` binary.
//!
//! Tests that mount or create namespaces need root and a kernel with
//! overlay support; they return early otherwise.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

struct Sandbox {
    dir: tempfile::TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn images(&self) -> PathBuf {
        self.dir.path().join("images")
    }

    fn staging(&self) -> PathBuf {
        self.dir.path().join("container")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("layerbox").expect("binary built");
        let _ = cmd
            .current_dir(self.dir.path())
            .env("LAYERBOX_STAGING_ROOT", self.staging())
            .env_remove("LAYERBOX_IMAGES_ROOT")
            .env_remove("RUST_LOG");
        cmd
    }
}

fn privileged() -> bool {
    nix::unistd::Uid::effective().is_root()
        && fs::read_to_string("/proc/filesystems").is_ok_and(|f| f.contains("overlay"))
}

fn host_mount_points() -> Vec<PathBuf> {
    fs::read_to_string("/proc/self/mountinfo")
        .unwrap()
        .lines()
        .filter_map(|l| l.split_ascii_whitespace().nth(4))
        .map(PathBuf::from)
        .collect()
}

fn unmount(path: &Path) {
    let _ = nix::mount::umount2(path, nix::mount::MntFlags::MNT_DETACH);
}

// ── Usage gate ───────────────────────────────────────────────────────

#[test]
fn no_arguments_prints_usage() {
    let sb = Sandbox::new();
    sb.cmd()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
    assert!(!sb.staging().exists());
}

#[test]
fn missing_command_prints_usage_without_side_effects() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["c1", "alpine"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
    assert!(!sb.staging().exists());
}

// ── Spec validation ──────────────────────────────────────────────────

#[test]
fn overlong_id_is_rejected_before_any_setup() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["a-very-long-container-id", "alpine", "/bin/true"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("identifier exceeds maximum length"));
    assert!(!sb.staging().exists());
}

#[test]
fn image_escaping_images_root_is_rejected() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["c1", "../etc", "/bin/true"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid image"));
    assert!(!sb.staging().exists());
}

#[test]
fn overlay_separators_in_id_or_image_are_rejected() {
    let sb = Sandbox::new();
    fs::create_dir_all(sb.images().join("a:b")).unwrap();
    for (id, image, field) in [("a,b", "host", "invalid id"), ("c1", "a:b", "invalid image")] {
        sb.cmd()
            .args([id, image, "/bin/echo", "hi"])
            .assert()
            .failure()
            .code(1)
            .stdout("")
            .stderr(predicate::str::contains(field));
    }
    assert!(!sb.staging().exists());
}

#[test]
fn staging_root_failure_names_the_path() {
    let sb = Sandbox::new();
    let staging = sb.dir.path().join("missing").join("container");
    sb.cmd()
        .env("LAYERBOX_STAGING_ROOT", &staging)
        .args(["c1", "alpine", "/bin/true"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(staging.display().to_string()));
}

// ── Full launch (root only) ──────────────────────────────────────────

/// Uses the host root as the base image so the usual binaries exist.
fn host_image(sb: &Sandbox) {
    fs::create_dir(sb.images()).unwrap();
    std::os::unix::fs::symlink("/", sb.images().join("host")).unwrap();
}

#[test]
fn echo_runs_in_composed_root() {
    if !privileged() {
        return;
    }
    let sb = Sandbox::new();
    host_image(&sb);

    sb.cmd()
        .args(["c1", "host", "/bin/echo", "hi"])
        .assert()
        .success()
        .stdout("hi\n");

    let root = sb.staging().join("c1");
    for dir in ["upper", "work", "merged"] {
        assert!(root.join(dir).is_dir(), "{dir} missing");
    }
    let mounts = host_mount_points();
    assert!(mounts.contains(&sb.staging()), "staging tmpfs lives on the host");
    assert!(
        !mounts.contains(&root.join("merged")),
        "overlay must stay inside the container namespace"
    );
    unmount(&sb.staging());
}

#[test]
fn command_is_pid_one() {
    if !privileged() {
        return;
    }
    let sb = Sandbox::new();
    host_image(&sb);

    sb.cmd()
        .args(["c1", "host", "sh", "-c", "echo $$"])
        .assert()
        .success()
        .stdout("1\n");
    unmount(&sb.staging());
}

#[test]
fn writes_land_in_upper_layer_only() {
    if !privileged() {
        return;
    }
    let sb = Sandbox::new();
    host_image(&sb);

    sb.cmd()
        .args(["c1", "host", "sh", "-c", "echo data > /layerbox-probe"])
        .assert()
        .success();

    let upper = sb.staging().join("c1/upper");
    assert_eq!(fs::read_to_string(upper.join("layerbox-probe")).unwrap(), "data\n");
    assert!(!Path::new("/layerbox-probe").exists());
    unmount(&sb.staging());
}

#[test]
fn second_launch_reuses_directories() {
    if !privileged() {
        return;
    }
    let sb = Sandbox::new();
    host_image(&sb);

    for _ in 0..2 {
        sb.cmd().args(["c1", "host", "/bin/true"]).assert().success();
    }
    unmount(&sb.staging());
}

#[test]
fn container_exit_status_is_not_propagated() {
    if !privileged() {
        return;
    }
    let sb = Sandbox::new();
    host_image(&sb);

    sb.cmd()
        .args(["c1", "host", "sh", "-c", "exit 7"])
        .assert()
        .success();
    unmount(&sb.staging());
}

#[test]
fn missing_program_is_reported_by_the_child() {
    if !privileged() {
        return;
    }
    let sb = Sandbox::new();
    host_image(&sb);

    sb.cmd()
        .args(["c1", "host", "layerbox-no-such-program"])
        .assert()
        .success()
        .stderr(predicate::function(|err: &str| {
            err.matches("exec of \"layerbox-no-such-program\" failed").count() == 1
        }));
    unmount(&sb.staging());
}

#[test]
fn missing_image_is_reported_by_the_child() {
    if !privileged() {
        return;
    }
    let sb = Sandbox::new();
    fs::create_dir(sb.images()).unwrap();

    sb.cmd()
        .args(["c1", "alpine", "/bin/true"])
        .assert()
        .success()
        .stderr(predicate::str::contains("image not found"));
    assert!(!sb.staging().join("c1").exists());
    unmount(&sb.staging());
}
