use crate::error::{Result, YagdError};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Captured result of one external process run.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn status_label(&self) -> String {
        match self.exit_code {
            Some(code) => format!("status {code}"),
            None => "a signal".to_string(),
        }
    }
}

/// Runs external commands to completion. Calls block until both output streams
/// are drained and the process has exited.
pub trait Executor {
    fn execute(&self, program: &str, args: &[String], cwd: Option<&Path>) -> Result<ProcessOutput>;
}

pub struct ProcessExecutor;

impl Executor for ProcessExecutor {
    fn execute(&self, program: &str, args: &[String], cwd: Option<&Path>) -> Result<ProcessOutput> {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        tracing::debug!(program, ?args, cwd = ?cwd, "running external command");

        let output = command.output().map_err(|source| YagdError::ExternalTool {
            program: program.to_string(),
            source,
        })?;

        let result = ProcessOutput {
            stdout: decode_stdout(program, output.stdout)?,
            stderr: decode_stderr(program, &output.stderr),
            exit_code: output.status.code(),
        };

        tracing::debug!(
            program,
            exit_code = ?result.exit_code,
            stdout_bytes = result.stdout.len(),
            stderr_bytes = result.stderr.len(),
            "external command finished"
        );

        Ok(result)
    }
}

/// Structured output must be valid UTF-8.
fn decode_stdout(program: &str, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|source| YagdError::NonUtf8Output {
        program: program.to_string(),
        source,
    })
}

/// Diagnostics are only shown to the user, so invalid bytes are replaced.
fn decode_stderr(program: &str, bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    if let std::borrow::Cow::Owned(_) = text {
        tracing::warn!(program, "replaced invalid UTF-8 in error output");
    }
    text.into_owned()
}

/// Locates `program` on `PATH`, the way a shell would.
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

pub fn require_program(program: &str) -> Result<PathBuf> {
    find_in_path(program).ok_or_else(|| YagdError::MissingDependency(program.to_string()))
}

#[cfg(test)]
pub mod testing {
    use super::{Executor, ProcessOutput};
    use crate::error::Result;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Call {
        pub program: String,
        pub args: Vec<String>,
        pub cwd: Option<PathBuf>,
    }

    type Responder = Box<dyn Fn(&Call) -> Result<ProcessOutput>>;

    /// Executor that answers from a closure and records every call.
    pub struct FakeExecutor {
        responder: Responder,
        pub calls: RefCell<Vec<Call>>,
    }

    impl FakeExecutor {
        pub fn new(responder: impl Fn(&Call) -> Result<ProcessOutput> + 'static) -> Self {
            Self {
                responder: Box::new(responder),
                calls: RefCell::new(Vec::new()),
            }
        }

        pub fn stdout(stdout: &str) -> Self {
            let stdout = stdout.to_string();
            Self::new(move |_| Ok(ok(&stdout)))
        }

        pub fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    pub fn ok(stdout: &str) -> ProcessOutput {
        ProcessOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    impl Executor for FakeExecutor {
        fn execute(
            &self,
            program: &str,
            args: &[String],
            cwd: Option<&Path>,
        ) -> Result<ProcessOutput> {
            let call = Call {
                program: program.to_string(),
                args: args.to_vec(),
                cwd: cwd.map(Path::to_path_buf),
            };
            let response = (self.responder)(&call);
            self.calls.borrow_mut().push(call);
            response
        }
    }
}
