//! Testable execution of external programs.
//!
//! Every subprocess the pipeline starts goes through [`CommandExecutor`], so
//! the fallback paths can be exercised without ffmpeg installed.

use crate::error::{Result, StudioError};
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync. Enables testability by allowing mock
/// implementations.
pub trait CommandExecutor: Send + Sync {
    /// Run `command` with `args`, optionally feeding `input` on stdin.
    ///
    /// Returns stdout on success. A missing binary maps to `ToolNotFound`, a
    /// non-zero exit to `ToolFailed`, an exceeded deadline to `ToolTimedOut`.
    fn execute(&self, command: &str, args: &[String], input: Option<&[u8]>) -> Result<String>;
}

impl<E: CommandExecutor + ?Sized> CommandExecutor for Box<E> {
    fn execute(&self, command: &str, args: &[String], input: Option<&[u8]>) -> Result<String> {
        (**self).execute(command, args, input)
    }
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor {
    timeout: Option<Duration>,
}

/// How often a running child is polled while waiting on a deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

impl SystemCommandExecutor {
    /// Executor without a deadline.
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Executor that kills children running longer than `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Convenience constructor from seconds, where zero means no deadline.
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self::with_timeout((secs > 0).then(|| Duration::from_secs(secs)))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn wait(&self, child: &mut Child, command: &str) -> Result<ExitStatus> {
        let Some(timeout) = self.timeout else {
            return Ok(child.wait()?);
        };

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                if let Err(e) = child.kill() {
                    tracing::debug!("failed to kill {command}: {e}");
                }
                child.wait()?;
                return Err(StudioError::ToolTimedOut {
                    tool: command.to_string(),
                    timeout_secs: timeout.as_secs(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn drain<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe
        && let Err(e) = pipe.read_to_end(&mut buf)
    {
        tracing::debug!("failed to read child output: {e}");
    }
    buf
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, command: &str, args: &[String], input: Option<&[u8]>) -> Result<String> {
        tracing::debug!("exec: {} {}", command, args.join(" "));

        let mut child = Command::new(command)
            .args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StudioError::ToolNotFound {
                        tool: command.to_string(),
                    }
                } else {
                    StudioError::ToolFailed {
                        tool: command.to_string(),
                        status: "not started".to_string(),
                        stderr: e.to_string(),
                    }
                }
            })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Pipes are serviced on their own threads so a chatty child never
        // blocks on a full pipe while we wait for it.
        let (status, stdout, stderr) = thread::scope(|scope| {
            if let (Some(mut pipe), Some(data)) = (stdin, input) {
                scope.spawn(move || {
                    if let Err(e) = pipe.write_all(data) {
                        tracing::debug!("stdin closed early for {command}: {e}");
                    }
                });
            }
            let out = scope.spawn(move || drain(stdout));
            let err = scope.spawn(move || drain(stderr));

            let status = self.wait(&mut child, command);
            (
                status,
                out.join().unwrap_or_default(),
                err.join().unwrap_or_default(),
            )
        });
        let status = status?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(StudioError::ToolFailed {
                tool: command.to_string(),
                status: status.to_string(),
                stderr: last_lines(&stderr, 5),
            });
        }

        Ok(String::from_utf8_lossy(&stdout).to_string())
    }
}

/// Keep the tail of a tool's diagnostic output; ffmpeg prints the real error last.
fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.trim().lines().collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub command: String,
    pub args: Vec<String>,
    /// Number of bytes fed on stdin, if any.
    pub input_len: Option<usize>,
}

/// Mock command executor for testing.
///
/// Records all command executions and returns configured responses. With
/// [`MockCommandExecutor::touching_outputs`] it also creates the file named by
/// the last argument on success, the way a real transcoder would.
#[derive(Debug, Default)]
pub struct MockCommandExecutor {
    calls: Mutex<Vec<RecordedCall>>,
    responses: Mutex<VecDeque<Result<String>>>,
    touch_outputs: bool,
}

impl MockCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the output file (last argument) on every successful call.
    pub fn touching_outputs(mut self) -> Self {
        self.touch_outputs = true;
        self
    }

    /// Add a successful response to the queue.
    pub fn with_response(self, response: &str) -> Self {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(Ok(response.to_string()));
        }
        self
    }

    /// Add an error response to the queue.
    pub fn with_error(self, error: StudioError) -> Self {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(Err(error));
        }
        self
    }

    /// Every call fails as if the binary were not installed.
    pub fn missing_tool(tool: &str, calls: usize) -> Self {
        (0..calls).fold(Self::new(), |mock, _| {
            mock.with_error(StudioError::ToolNotFound {
                tool: tool.to_string(),
            })
        })
    }

    /// Get all recorded calls.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Get the number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Get a specific call by index.
    pub fn call(&self, index: usize) -> Option<RecordedCall> {
        self.calls.lock().ok().and_then(|c| c.get(index).cloned())
    }
}

impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, command: &str, args: &[String], input: Option<&[u8]>) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                command: command.to_string(),
                args: args.to_vec(),
                input_len: input.map(<[u8]>::len),
            });
        }

        let response = self
            .responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_else(|| Ok(String::new()));

        if response.is_ok()
            && self.touch_outputs
            && let Some(output) = args.last()
            && !output.starts_with('-')
        {
            let path = Path::new(output);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, b"mock output")?;
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_executor_is_object_safe() {
        let executor: Box<dyn CommandExecutor> = Box::new(MockCommandExecutor::new());
        assert!(executor.execute("echo", &args(&["test"]), None).is_ok());
    }

    #[test]
    fn test_mock_executor_records_calls() {
        let mock = MockCommandExecutor::new();

        mock.execute("ffmpeg", &args(&["-version"]), None).unwrap();
        mock.execute("ffmpeg", &args(&["-i", "pipe:0"]), Some(&[1, 2, 3]))
            .unwrap();

        assert_eq!(mock.call_count(), 2);
        let call = mock.call(1).unwrap();
        assert_eq!(call.command, "ffmpeg");
        assert_eq!(call.args, vec!["-i", "pipe:0"]);
        assert_eq!(call.input_len, Some(3));
        assert_eq!(mock.call(0).unwrap().input_len, None);
    }

    #[test]
    fn test_mock_executor_returns_configured_responses_then_default() {
        let mock = MockCommandExecutor::new()
            .with_response("output1")
            .with_error(StudioError::ToolNotFound {
                tool: "ffmpeg".to_string(),
            });

        assert_eq!(mock.execute("a", &[], None).unwrap(), "output1");
        assert!(matches!(
            mock.execute("b", &[], None),
            Err(StudioError::ToolNotFound { .. })
        ));
        assert_eq!(mock.execute("c", &[], None).unwrap(), "");
    }

    #[test]
    fn test_mock_executor_touches_output_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out.mp4");
        let mock = MockCommandExecutor::new().touching_outputs();

        mock.execute("ffmpeg", &[out.to_string_lossy().to_string()], None)
            .unwrap();
        assert!(out.exists());
    }

    #[test]
    fn test_mock_executor_does_not_touch_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.mp4");
        let mock = MockCommandExecutor::missing_tool("ffmpeg", 1).touching_outputs();

        assert!(
            mock.execute("ffmpeg", &[out.to_string_lossy().to_string()], None)
                .is_err()
        );
        assert!(!out.exists());
    }

    #[test]
    fn test_system_executor_missing_binary_is_tool_not_found() {
        let executor = SystemCommandExecutor::new();
        let result = executor.execute("chainstudio-definitely-missing-tool", &[], None);
        match result {
            Err(StudioError::ToolNotFound { tool }) => {
                assert_eq!(tool, "chainstudio-definitely-missing-tool");
            }
            other => panic!("Expected ToolNotFound, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_system_executor_captures_stdout() {
        let executor = SystemCommandExecutor::new();
        let out = executor.execute("echo", &args(&["hello"]), None).unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_executor_feeds_stdin() {
        let executor = SystemCommandExecutor::new();
        let out = executor.execute("cat", &[], Some(b"piped bytes")).unwrap();
        assert_eq!(out, "piped bytes");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_executor_non_zero_exit_is_tool_failed() {
        let executor = SystemCommandExecutor::new();
        let result = executor.execute("sh", &args(&["-c", "echo boom >&2; exit 3"]), None);
        match result {
            Err(StudioError::ToolFailed { tool, stderr, .. }) => {
                assert_eq!(tool, "sh");
                assert_eq!(stderr, "boom");
            }
            other => panic!("Expected ToolFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_system_executor_times_out() {
        let executor = SystemCommandExecutor::with_timeout(Some(Duration::from_millis(100)));
        let started = Instant::now();
        let result = executor.execute("sleep", &args(&["5"]), None);
        assert!(matches!(result, Err(StudioError::ToolTimedOut { .. })));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_timeout_secs_zero_disables_deadline() {
        assert_eq!(SystemCommandExecutor::with_timeout_secs(0).timeout(), None);
        assert_eq!(
            SystemCommandExecutor::with_timeout_secs(30).timeout(),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn last_lines_keeps_tail() {
        assert_eq!(last_lines("a\nb\nc\n", 2), "b\nc");
        assert_eq!(last_lines("only", 5), "only");
        assert_eq!(last_lines("", 5), "");
    }
}
