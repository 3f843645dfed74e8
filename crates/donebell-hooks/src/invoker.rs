//! Running the notification command.
//!
//! [`ShellInvoker`] is the seam between the plugin and the process world. The
//! production implementation is [`ProcessInvoker`]; tests substitute their own.

use std::process::Stdio;

use async_trait::async_trait;

use crate::error::DeliveryError;

/// One invocation of an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// Discard the program's stdout/stderr instead of capturing them.
    pub quiet: bool,
}

impl CommandInvocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            quiet: false,
        }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

/// Captured result of a successful invocation. Empty when `quiet`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Executes commands on behalf of the plugin.
#[async_trait]
pub trait ShellInvoker: Send + Sync {
    /// Run the command to completion. A non-zero exit is an error.
    async fn run(&self, invocation: &CommandInvocation) -> Result<InvocationOutput, DeliveryError>;
}

/// Spawns the program directly (no shell), so arguments are never re-split
/// or interpolated.
///
/// Output is never inherited: the plugin's own stdout carries the host
/// protocol.
#[derive(Debug, Clone, Default)]
pub struct ProcessInvoker;

#[async_trait]
impl ShellInvoker for ProcessInvoker {
    async fn run(&self, invocation: &CommandInvocation) -> Result<InvocationOutput, DeliveryError> {
        let mut cmd = tokio::process::Command::new(&invocation.program);
        cmd.args(&invocation.args);
        cmd.stdin(Stdio::null());

        let spawn_error = |e: std::io::Error| DeliveryError::Spawn {
            program: invocation.program.clone(),
            source: e,
        };

        if invocation.quiet {
            // `output()` would re-pipe both streams; `status()` keeps them null.
            cmd.stdout(Stdio::null());
            cmd.stderr(Stdio::null());
            let status = cmd.status().await.map_err(spawn_error)?;
            if !status.success() {
                return Err(DeliveryError::ExitStatus {
                    program: invocation.program.clone(),
                    code: status.code(),
                    stderr: String::new(),
                });
            }
            return Ok(InvocationOutput::default());
        }

        let output = cmd.output().await.map_err(spawn_error)?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(DeliveryError::ExitStatus {
                program: invocation.program.clone(),
                code: output.status.code(),
                stderr,
            });
        }

        Ok(InvocationOutput { stdout, stderr })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let inv = CommandInvocation::new("echo", vec!["hello".into(), "world".into()]);
        let out = ProcessInvoker.run(&inv).await.unwrap();
        assert_eq!(out.stdout.trim(), "hello world");
    }

    #[tokio::test]
    async fn test_run_quiet_discards_output() {
        let inv = CommandInvocation::new("echo", vec!["hello".into()]).quiet(true);
        let out = ProcessInvoker.run(&inv).await.unwrap();
        assert_eq!(out, InvocationOutput::default());
    }

    #[tokio::test]
    async fn test_run_quiet_discards_both_streams() {
        let inv = CommandInvocation::new(
            "sh",
            vec!["-c".into(), "echo out; echo err >&2".into()],
        )
        .quiet(true);
        let out = ProcessInvoker.run(&inv).await.unwrap();
        assert_eq!(out, InvocationOutput::default());
    }

    #[tokio::test]
    async fn test_run_quiet_nonzero_exit() {
        let inv = CommandInvocation::new("sh", vec!["-c".into(), "echo err >&2; exit 3".into()])
            .quiet(true);
        let err = ProcessInvoker.run(&inv).await.unwrap_err();
        match err {
            DeliveryError::ExitStatus { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert!(stderr.is_empty());
            }
            other => panic!("Expected ExitStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_nonzero_exit() {
        let inv = CommandInvocation::new("false", vec![]);
        let err = ProcessInvoker.run(&inv).await.unwrap_err();
        assert!(matches!(err, DeliveryError::ExitStatus { code: Some(1), .. }));
    }

    #[tokio::test]
    async fn test_run_missing_program() {
        let inv = CommandInvocation::new("donebell-no-such-program", vec![]);
        let err = ProcessInvoker.run(&inv).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_arguments_are_not_shell_split() {
        let inv = CommandInvocation::new(
            "sh",
            vec!["-c".into(), "printf '%s|' \"$@\"".into(), "sh".into(), "a b".into(), "".into()],
        );
        let out = ProcessInvoker.run(&inv).await.unwrap();
        assert_eq!(out.stdout, "a b||");
    }
}
