/// Dual-sink output: live terminal plus an append-only capture file
///
/// Every byte a section produces goes through one `OutputCoordinator`:
/// - It is appended to the capture file first (the persisted sink)
/// - The same bytes are queued to a single background thread that forwards
///   them to the terminal (the live sink)
///
/// Both sinks see one byte stream in one order. The terminal may lag the
/// capture, never reorder it. The queue is bounded, so a stalled terminal
/// holds writers back instead of growing memory. `finish` closes the
/// queue, lets the reader drain within a grace period, and hands back the
/// capture for the finalizer. Dropping an unfinished coordinator does the
/// same, so the reader thread never outlives the run.
use crate::console_format::StyledWriter;
use log::{debug, warn};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tempfile::TempPath;

/// How long `finish` waits for the terminal reader to drain queued output
const FLUSH_GRACE: Duration = Duration::from_secs(2);

/// Chunks queued for the terminal before writers wait for it to catch up
const TERMINAL_QUEUE_CHUNKS: usize = 1024;

/// Terminal sink handed to the reader thread
pub type TerminalSink = Box<dyn Write + Send>;

pub struct OutputCoordinator {
    capture: File,
    capture_path: PathBuf,
    temp_guard: Option<TempPath>,
    sender: Option<SyncSender<Vec<u8>>>,
    done: Option<Receiver<()>>,
    reader: Option<JoinHandle<u64>>,
    use_colors: bool,
    bytes_written: u64,
    lines_written: usize,
}

/// Persisted side of a finished run
#[derive(Debug)]
pub struct Capture {
    path: PathBuf,
    temp_guard: Option<TempPath>,
    pub bytes_written: u64,
    pub lines_written: usize,
    pub bytes_shown: Option<u64>,
}

impl Capture {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the capture file on disk after this value is dropped
    pub fn keep(mut self) -> PathBuf {
        if let Some(guard) = self.temp_guard.take() {
            match guard.keep() {
                Ok(path) => return path,
                Err(e) => warn!("Could not keep capture file: {}", e),
            }
        }
        self.path.clone()
    }
}

impl OutputCoordinator {
    /// Start a run capturing into a fresh temporary file
    pub fn start(terminal: TerminalSink, use_colors: bool) -> io::Result<Self> {
        let temp = tempfile::Builder::new().prefix("probe-report-").suffix(".log").tempfile()?;
        let (capture, guard) = temp.into_parts();
        let path = guard.to_path_buf();
        Ok(Self::spawn(capture, path, Some(guard), terminal, use_colors))
    }

    fn spawn(
        capture: File,
        capture_path: PathBuf,
        temp_guard: Option<TempPath>,
        mut terminal: TerminalSink,
        use_colors: bool,
    ) -> Self {
        let (sender, receiver) = mpsc::sync_channel::<Vec<u8>>(TERMINAL_QUEUE_CHUNKS);
        let (done_tx, done_rx) = mpsc::channel::<()>();

        let reader = thread::spawn(move || {
            let mut shown = 0u64;
            let mut terminal_ok = true;
            // Keep receiving after a terminal error so the queue is always drained
            for chunk in receiver {
                if !terminal_ok {
                    continue;
                }
                match terminal.write_all(&chunk).and_then(|_| terminal.flush()) {
                    Ok(()) => shown += chunk.len() as u64,
                    Err(e) => {
                        debug!("Terminal sink closed: {}", e);
                        terminal_ok = false;
                    }
                }
            }
            let _ = done_tx.send(());
            shown
        });

        debug!("Capturing output to {}", capture_path.display());

        Self {
            capture,
            capture_path,
            temp_guard,
            sender: Some(sender),
            done: Some(done_rx),
            reader: Some(reader),
            use_colors,
            bytes_written: 0,
            lines_written: 0,
        }
    }

    /// Styled writer over this coordinator, for one section's output
    pub fn writer(&mut self) -> StyledWriter<&mut Self> {
        let use_colors = self.use_colors;
        StyledWriter::new(self, use_colors)
    }

    /// Stop the reader, wait for it to drain, and return the capture
    pub fn finish(mut self) -> io::Result<Capture> {
        self.capture.flush()?;
        let bytes_shown = self.stop_reader();

        Ok(Capture {
            path: self.capture_path.clone(),
            temp_guard: self.temp_guard.take(),
            bytes_written: self.bytes_written,
            lines_written: self.lines_written,
            bytes_shown,
        })
    }

    /// Returns bytes forwarded to the terminal, or `None` if the reader did
    /// not finish within the grace period.
    fn stop_reader(&mut self) -> Option<u64> {
        drop(self.sender.take());

        let drained = match self.done.take() {
            Some(done) => done.recv_timeout(FLUSH_GRACE).is_ok(),
            None => false,
        };

        let reader = self.reader.take()?;
        if drained || reader.is_finished() {
            reader.join().ok()
        } else {
            warn!("Terminal output did not drain within {:?}; the report file is complete", FLUSH_GRACE);
            None
        }
    }
}

impl Write for OutputCoordinator {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.capture.write_all(buf)?;
        self.bytes_written += buf.len() as u64;
        self.lines_written += buf.iter().filter(|&&b| b == b'\n').count();

        if let Some(sender) = &self.sender
            && sender.send(buf.to_vec()).is_err()
        {
            debug!("Terminal reader has stopped; output is still captured");
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.capture.flush()
    }
}

impl Drop for OutputCoordinator {
    fn drop(&mut self) {
        if self.reader.is_some() {
            let _ = self.capture.flush();
            let _ = self.stop_reader();
        }
    }
}
