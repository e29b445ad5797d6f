use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use futures::FutureExt;
use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::debug;

/// One output channel of a spawned source, delivered line by line
pub type LineStream = BoxStream<'static, io::Result<String>>;

/// Control over a running log-producing process
pub trait ProcessHandle: Send {
    /// Request termination. Fails when there is no running process to kill.
    fn terminate(&mut self) -> io::Result<()>;

    /// Resolves once the process has exited
    fn wait(&mut self) -> BoxFuture<'_, io::Result<()>>;

    /// OS process id, if known
    fn id(&self) -> Option<u32> {
        None
    }
}

/// A started source: two line streams plus the handle to stop it
pub struct SpawnedSource {
    pub stdout: LineStream,
    pub stderr: LineStream,
    pub handle: Box<dyn ProcessHandle>,
}

/// Something that can start log-producing processes
pub trait LogSource: Send + Sync {
    /// Start a long-running process whose output is streamed
    fn spawn(&self, args: &[String]) -> io::Result<SpawnedSource>;

    /// Run a one-shot invocation to completion, discarding its output
    fn run(&self, args: &[String]) -> BoxFuture<'static, io::Result<()>>;
}

/// Turn an async reader into a stream of lines (without line terminators)
pub fn line_stream<R>(reader: R) -> LineStream
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let lines = BufReader::new(reader).lines();
    stream::unfold(Some(lines), |state| async move {
        let mut lines = state?;
        match lines.next_line().await {
            Ok(Some(line)) => Some((Ok(line), Some(lines))),
            Ok(None) => None,
            // Yield the error once, then end the stream
            Err(e) => Some((Err(e), None)),
        }
    })
    .boxed()
}

/// `adb` executable used as a log source
#[derive(Clone, Debug)]
pub struct AdbSource {
    executable: PathBuf,
}

impl AdbSource {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl LogSource for AdbSource {
    fn spawn(&self, args: &[String]) -> io::Result<SpawnedSource> {
        let mut child = Command::new(&self.executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("stderr was not captured"))?;

        debug!(
            pid = ?child.id(),
            executable = %self.executable.display(),
            ?args,
            "Spawned log source"
        );

        Ok(SpawnedSource {
            stdout: line_stream(stdout),
            stderr: line_stream(stderr),
            handle: Box::new(ChildHandle { child }),
        })
    }

    fn run(&self, args: &[String]) -> BoxFuture<'static, io::Result<()>> {
        let mut command = Command::new(&self.executable);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        async move {
            let status = command.status().await?;
            if status.success() {
                Ok(())
            } else {
                Err(io::Error::other(format!("exited with {}", status)))
            }
        }
        .boxed()
    }
}

/// Handle over a tokio child process
struct ChildHandle {
    child: Child,
}

impl ProcessHandle for ChildHandle {
    fn terminate(&mut self) -> io::Result<()> {
        self.child.start_kill()
    }

    fn wait(&mut self) -> BoxFuture<'_, io::Result<()>> {
        async move { self.child.wait().await.map(|_| ()) }.boxed()
    }

    fn id(&self) -> Option<u32> {
        self.child.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_line_stream_splits_lines() {
        let input: &[u8] = b"I first\r\nW second\nE third";
        let lines: Vec<String> = line_stream(input).try_collect().await.unwrap();
        assert_eq!(lines, vec!["I first", "W second", "E third"]);
    }

    #[tokio::test]
    async fn test_line_stream_empty_input() {
        let input: &[u8] = b"";
        let lines: Vec<String> = line_stream(input).try_collect().await.unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_spawn_missing_executable_fails() {
        let source = AdbSource::new("/nonexistent/adbscope-test/adb");
        assert!(source.spawn(&["logcat".to_string()]).is_err());
    }

    #[tokio::test]
    async fn test_run_missing_executable_fails() {
        let source = AdbSource::new("/nonexistent/adbscope-test/adb");
        assert!(source.run(&["logcat".to_string(), "-c".to_string()]).await.is_err());
    }
}
