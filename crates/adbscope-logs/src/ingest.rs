use futures::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use adbscope_adb::{LineStream, LogSource, LogcatArgs, ProcessHandle, SpawnedSource};
use adbscope_types::{Channel, LogEntry};

use crate::buffer::LogBuffer;
use crate::error::IngestError;
use crate::parser::LineParser;

/// Default bound on waiting for the source process to exit
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(3);

/// Default bound on the one-shot device log clear. Without a device attached
/// `adb logcat -c` waits forever.
pub const DEFAULT_CLEAR_TIMEOUT: Duration = Duration::from_secs(3);

/// Max lines moved into the buffer per lock acquisition
const BATCH_APPEND_SIZE: usize = 64;

/// Lifecycle of the ingestion controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestState {
    Idle,
    Starting,
    Running,
    Stopping,
}

/// Result of a stop request. Stopping never fails from the caller's side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopOutcome {
    /// Nothing was running
    NotRunning,
    /// The source exited
    Stopped,
    /// The source did not exit within the stop timeout; it was abandoned
    TimedOut,
}

/// How to start ingestion
#[derive(Clone, Debug, Default)]
pub struct StartOptions {
    /// Arguments for the streaming invocation
    pub args: LogcatArgs,

    /// Run a one-shot device log clear before streaming
    pub clear_device_log: bool,
}

/// Owns the source process and feeds its lines into a log buffer
pub struct IngestionController {
    /// Where processes come from
    source: Arc<dyn LogSource>,

    /// Destination of parsed entries
    buffer: LogBuffer,

    state: IngestState,

    /// Cancellation token for stopping channel readers
    cancel: CancellationToken,

    /// Running source process
    handle: Option<Box<dyn ProcessHandle>>,

    /// One reader task per output channel
    readers: Vec<JoinHandle<()>>,

    /// Single task appending queued lines to the buffer
    worker: Option<JoinHandle<()>>,

    stop_timeout: Duration,

    clear_timeout: Duration,

    /// Raw lines read from either channel
    lines_received: Arc<AtomicU64>,

    /// Lines too short to become entries
    lines_dropped: Arc<AtomicU64>,
}

impl IngestionController {
    /// Create an idle controller feeding `buffer`
    pub fn new(source: Arc<dyn LogSource>, buffer: LogBuffer) -> Self {
        Self {
            source,
            buffer,
            state: IngestState::Idle,
            cancel: CancellationToken::new(),
            handle: None,
            readers: Vec::new(),
            worker: None,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            clear_timeout: DEFAULT_CLEAR_TIMEOUT,
            lines_received: Arc::new(AtomicU64::new(0)),
            lines_dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Bound on waiting for the source to exit in `stop`
    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    /// Bound on the device log clear in `start`
    pub fn with_clear_timeout(mut self, timeout: Duration) -> Self {
        self.clear_timeout = timeout;
        self
    }

    /// Start the source process and begin ingesting its output
    pub async fn start(&mut self, options: &StartOptions) -> Result<(), IngestError> {
        if self.state != IngestState::Idle {
            return Err(IngestError::AlreadyRunning);
        }

        // The only await of a start. The state is still Idle here, so a start
        // dropped during the clear leaves the controller startable.
        if options.clear_device_log {
            self.clear_device_log().await;
        }

        self.state = IngestState::Starting;

        let args = options.args.stream();
        let SpawnedSource {
            stdout,
            stderr,
            handle,
        } = match self.source.spawn(&args) {
            Ok(spawned) => spawned,
            Err(cause) => {
                self.state = IngestState::Idle;
                warn!(error = %cause, ?args, "Failed to start log source");
                return Err(IngestError::StartFailed { cause });
            }
        };

        // Fresh token: the previous one may already be cancelled
        self.cancel = CancellationToken::new();

        let (line_tx, line_rx) = mpsc::unbounded_channel();
        self.readers = vec![
            self.spawn_reader(stdout, Channel::Stdout, line_tx.clone()),
            self.spawn_reader(stderr, Channel::Stderr, line_tx),
        ];
        self.worker = Some(self.spawn_worker(line_rx));

        info!(pid = ?handle.id(), ?args, "Log ingestion started");
        self.handle = Some(handle);
        self.state = IngestState::Running;

        Ok(())
    }

    /// Run `adb logcat -c`. Failures only warn; streaming starts regardless.
    async fn clear_device_log(&self) {
        let clear = self.source.run(&LogcatArgs::clear());
        match tokio::time::timeout(self.clear_timeout, clear).await {
            Ok(Ok(())) => debug!("Device log cleared"),
            Ok(Err(e)) => warn!(error = %e, "Failed to clear device log"),
            Err(_) => warn!(
                timeout_ms = self.clear_timeout.as_millis() as u64,
                "Clearing device log timed out"
            ),
        }
    }

    fn spawn_reader(
        &self,
        mut lines: LineStream,
        channel: Channel,
        line_tx: mpsc::UnboundedSender<(Channel, String)>,
    ) -> JoinHandle<()> {
        let cancel = self.cancel.clone();
        let received = Arc::clone(&self.lines_received);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,

                    next = lines.next() => {
                        match next {
                            Some(Ok(line)) => {
                                received.fetch_add(1, Ordering::Relaxed);
                                if line_tx.send((channel, line)).is_err() {
                                    // Worker gone, stop reading
                                    break;
                                }
                            }
                            Some(Err(e)) => {
                                warn!(%channel, error = %e, "Error reading log source");
                                break;
                            }
                            None => {
                                debug!(%channel, "Log source channel closed");
                                break;
                            }
                        }
                    }
                }
            }
        })
    }

    /// The worker ends once every reader has dropped its sender, so lines
    /// already queued are still appended after a stop.
    fn spawn_worker(
        &self,
        mut line_rx: mpsc::UnboundedReceiver<(Channel, String)>,
    ) -> JoinHandle<()> {
        let buffer = self.buffer.clone();
        let dropped = Arc::clone(&self.lines_dropped);

        tokio::spawn(async move {
            let mut batch: Vec<LogEntry> = Vec::with_capacity(BATCH_APPEND_SIZE);

            while let Some(first) = line_rx.recv().await {
                let mut next = Some(first);
                while let Some((channel, line)) = next.take() {
                    match LineParser::parse(&line, channel) {
                        Some(entry) => batch.push(entry),
                        None => {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    if batch.len() < BATCH_APPEND_SIZE {
                        next = line_rx.try_recv().ok();
                    }
                }
                buffer.append_batch(batch.drain(..));
            }

            debug!("Ingestion worker finished");
        })
    }

    /// Stop the source process. Safe to call at any time; never fails.
    pub async fn stop(&mut self) -> StopOutcome {
        let Some(mut handle) = self.handle.take() else {
            self.abort_tasks();
            self.state = IngestState::Idle;
            debug!("Stop requested with no running source");
            return StopOutcome::NotRunning;
        };

        self.state = IngestState::Stopping;
        self.cancel.cancel();

        if let Err(e) = handle.terminate() {
            // Usually the process already exited on its own
            debug!(error = %e, "Terminating log source failed");
        }

        let outcome = match tokio::time::timeout(self.stop_timeout, handle.wait()).await {
            Ok(Ok(())) => StopOutcome::Stopped,
            Ok(Err(e)) => {
                debug!(error = %e, "Waiting for log source failed");
                StopOutcome::Stopped
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.stop_timeout.as_millis() as u64,
                    "Log source did not exit in time"
                );
                StopOutcome::TimedOut
            }
        };

        for task in self.readers.drain(..) {
            task.abort();
        }
        if let Some(worker) = self.worker.take() {
            if !join_or_abort(worker, self.stop_timeout).await {
                warn!("Ingestion worker did not finish in time and was aborted");
            }
        }

        self.state = IngestState::Idle;
        info!(?outcome, "Log ingestion stopped");
        outcome
    }

    fn abort_tasks(&mut self) {
        self.cancel.cancel();
        for task in self.readers.drain(..) {
            task.abort();
        }
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }

    pub fn state(&self) -> IngestState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == IngestState::Running
    }

    /// Running, but every channel has closed: the source went away on its own
    pub fn source_exited(&self) -> bool {
        self.state == IngestState::Running && self.readers.iter().all(|t| t.is_finished())
    }

    pub fn lines_received(&self) -> u64 {
        self.lines_received.load(Ordering::Relaxed)
    }

    pub fn lines_dropped(&self) -> u64 {
        self.lines_dropped.load(Ordering::Relaxed)
    }

    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }
}

/// Wait up to `timeout` for `task` to finish, aborting it otherwise.
/// Returns whether it finished on its own.
async fn join_or_abort(mut task: JoinHandle<()>, timeout: Duration) -> bool {
    if tokio::time::timeout(timeout, &mut task).await.is_ok() {
        return true;
    }
    task.abort();
    false
}

impl Drop for IngestionController {
    fn drop(&mut self) {
        self.abort_tasks();
        // Dropping the handle kills the process (kill_on_drop)
        self.handle = None;
    }
}
