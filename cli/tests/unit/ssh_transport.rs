//! `SshExecutor` and `RsyncTransfer` against a recording runner.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dockhand_cli::application::ports::{ArtifactTransfer, RemoteExecutor};
use dockhand_cli::domain::{AppName, DeploymentIdentity, RemoteError, ScriptBlock, exit_code_for};
use dockhand_cli::infra::command_runner::ProcessError;
use dockhand_cli::infra::rsync::RsyncTransfer;
use dockhand_cli::infra::ssh::{SshExecutor, SshTarget};

use crate::mocks::{MockCommandRunner, SharedRunner, exit_output, ok_output};

const T: Duration = Duration::from_secs(5);

fn identity() -> DeploymentIdentity {
    DeploymentIdentity {
        name: AppName::new("demo-app").unwrap(),
        host: Ipv4Addr::new(203, 0, 113, 9),
        ssh_user: "ubuntu".into(),
        ssh_key: PathBuf::from("/home/op/.ssh/id_rsa"),
        internal_port: 3000,
    }
}

fn target() -> SshTarget {
    SshTarget::new(&identity(), Duration::from_secs(10))
}

#[tokio::test]
async fn exec_passes_options_destination_and_command() {
    let runner = MockCommandRunner::new(|_| Ok(ok_output(b"hello\n")));
    let executor = SshExecutor::new(runner, target());
    let out = executor.exec("echo hello", T).await.unwrap();
    assert_eq!(out.exit_code, 0);
    assert_eq!(out.stdout, "hello\n");
}

#[tokio::test]
async fn exec_argument_vector_is_batch_mode_with_tofu_host_keys() {
    let runner = MockCommandRunner::succeeding();
    let executor = SshExecutor::new(SharedRunner(&runner), target());
    executor.exec("true", T).await.unwrap();
    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].program, "ssh");
    assert_eq!(
        calls[0].args,
        vec![
            "-i",
            "/home/op/.ssh/id_rsa",
            "-o",
            "BatchMode=yes",
            "-o",
            "StrictHostKeyChecking=accept-new",
            "-o",
            "ConnectTimeout=10",
            "ubuntu@203.0.113.9",
            "true",
        ]
    );
}

#[tokio::test]
async fn run_script_pipes_the_rendered_block_to_bash() {
    let runner = MockCommandRunner::succeeding();
    let executor = SshExecutor::new(SharedRunner(&runner), target());
    let block = ScriptBlock::new("probe", "echo one\necho two");
    executor.run_script(&block, T).await.unwrap();
    let call = &runner.calls()[0];
    assert_eq!(&call.args[call.args.len() - 2..], ["bash", "-s"]);
    let stdin = call.stdin.as_deref().unwrap();
    assert!(stdin.starts_with("set -uo pipefail\n"), "got: {stdin}");
    assert!(stdin.ends_with("echo two\n"), "got: {stdin}");
}

#[tokio::test]
async fn remote_non_zero_exit_is_not_a_transport_error() {
    let runner = MockCommandRunner::new(|_| Ok(exit_output(45, b"", b"E: no nginx")));
    let executor = SshExecutor::new(runner, target());
    let out = executor.exec("false", T).await.unwrap();
    assert_eq!(out.exit_code, 45);
    assert_eq!(out.diagnostic(), "E: no nginx");
}

#[tokio::test]
async fn ssh_exit_255_is_a_connection_failure() {
    let runner = MockCommandRunner::new(|_| {
        Ok(exit_output(255, b"", b"ssh: connect to host 203.0.113.9 port 22: No route to host"))
    });
    let executor = SshExecutor::new(runner, target());
    let err = executor.exec("true", T).await.unwrap_err();
    assert!(
        matches!(&err, RemoteError::Connection { host, detail }
            if host == "203.0.113.9" && detail.contains("No route to host")),
        "got: {err:?}"
    );
    assert_eq!(exit_code_for(&anyhow::Error::from(err)), 40);
}

#[tokio::test]
async fn runner_timeout_becomes_typed_remote_timeout() {
    let runner = MockCommandRunner::new(|_| {
        Err(ProcessError::Timeout {
            program: "ssh".into(),
            secs: 5,
        }
        .into())
    });
    let executor = SshExecutor::new(runner, target());
    let block = ScriptBlock::new("provision", "sleep 600");
    let err = executor.run_script(&block, T).await.unwrap_err();
    assert!(
        matches!(&err, RemoteError::Timeout { what, secs: 5 } if what == "provision"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn missing_ssh_binary_is_a_spawn_failure() {
    let runner = MockCommandRunner::new(|_| {
        Err(ProcessError::Spawn {
            program: "ssh".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        }
        .into())
    });
    let executor = SshExecutor::new(runner, target());
    let err = executor.exec("true", T).await.unwrap_err();
    assert!(matches!(err, RemoteError::Spawn { .. }), "got: {err:?}");
}

#[tokio::test]
async fn rsync_mirrors_contents_with_delete_over_the_same_ssh_options() {
    let runner = MockCommandRunner::succeeding();
    let transfer = RsyncTransfer::new(SharedRunner(&runner), target());
    transfer
        .mirror(Path::new("/work/demo-app"), "demo-app/", T)
        .await
        .unwrap();
    let call = &runner.calls()[0];
    assert_eq!(call.program, "rsync");
    assert_eq!(&call.args[..4], ["-az", "--delete", "--exclude", ".git"]);
    assert_eq!(call.args[4], "-e");
    let shell = &call.args[5];
    assert!(shell.starts_with("ssh "), "got: {shell}");
    assert!(shell.contains("StrictHostKeyChecking=accept-new"), "got: {shell}");
    assert_eq!(call.args[6], "/work/demo-app/");
    assert_eq!(call.args[7], "ubuntu@203.0.113.9:demo-app/");
}

#[tokio::test]
async fn rsync_failure_keeps_its_exit_status() {
    let runner = MockCommandRunner::new(|_| Ok(exit_output(23, b"", b"rsync error: some files")));
    let transfer = RsyncTransfer::new(runner, target());
    let out = transfer
        .mirror(Path::new("/work/demo-app"), "demo-app/", T)
        .await
        .unwrap();
    assert_eq!(out.exit_code, 23);
}
