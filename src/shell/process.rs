//! Child-process bridge: one live child at a time, non-blocking output.
//!
//! Each output pipe gets a reader thread that forwards raw chunks over an
//! mpsc channel. The owner drains the channel from its own thread with
//! [`ProcessBridge::poll`], so output never touches the transcript from a
//! background thread.

use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Upper bound on waiting for a killed child to be reaped.
pub const KILL_WAIT: Duration = Duration::from_secs(1);

/// How long to keep waiting for pipes to close after the child has exited
/// (a background grandchild may hold them open).
const DRAIN_GRACE: Duration = Duration::from_millis(200);

const READ_CHUNK: usize = 4096;

/// How stdout and stderr reach the transcript.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreamMode {
    /// Both pipes are reported as one stream and decoded through ANSI.
    #[default]
    Merged,
    /// Stderr is reported separately and rendered in the error style.
    Separate,
}

/// Which pipe a chunk came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessEvent {
    /// Raw bytes, in arrival order per stream.
    Output { stream: OutputStream, data: Vec<u8> },
    /// The child exited and both pipes are drained. `code` is `None` when the
    /// child was ended by a signal.
    Exited { code: Option<i32> },
}

/// How commands are handed to the system shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShellConfig {
    pub program: String,
    /// Arguments placed before the command line.
    pub args: Vec<String>,
    pub mode: StreamMode,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl ShellConfig {
    /// `/bin/sh -c` on POSIX systems, `cmd.exe /C` on Windows.
    #[must_use]
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            Self::windows()
        } else {
            Self::posix("/bin/sh")
        }
    }

    /// A POSIX shell invoked as `<program> -c <command>`.
    #[must_use]
    pub fn posix(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec!["-c".to_string()],
            mode: StreamMode::default(),
        }
    }

    #[must_use]
    pub fn windows() -> Self {
        Self {
            program: "cmd.exe".to_string(),
            args: vec!["/C".to_string()],
            mode: StreamMode::default(),
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: StreamMode) -> Self {
        self.mode = mode;
        self
    }

    fn command(&self, line: &str, cwd: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(line)
            .current_dir(cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

struct Running {
    child: Child,
    stdin: Option<ChildStdin>,
    rx: Receiver<(OutputStream, Option<Vec<u8>>)>,
    open_pipes: usize,
    exit: Option<(Option<i32>, Instant)>,
}

/// Owns at most one child process.
pub struct ProcessBridge {
    config: ShellConfig,
    running: Option<Running>,
}

impl std::fmt::Debug for ProcessBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessBridge")
            .field("config", &self.config)
            .field("pid", &self.pid())
            .finish()
    }
}

impl Default for ProcessBridge {
    fn default() -> Self {
        Self::new(ShellConfig::default())
    }
}

impl ProcessBridge {
    #[must_use]
    pub const fn new(config: ShellConfig) -> Self {
        Self {
            config,
            running: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// True while a child is attached (until its exit has been reported).
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running.is_some()
    }

    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.running.as_ref().map(|r| r.child.id())
    }

    /// Run `line` through the shell in `cwd`. A child that is still attached
    /// is killed first.
    pub fn spawn(&mut self, line: &str, cwd: &Path) -> Result<()> {
        if self.running.is_some() {
            self.kill();
        }

        let mut child = self
            .config
            .command(line, cwd)
            .spawn()
            .map_err(|source| Error::Spawn {
                program: self.config.program.clone(),
                source,
            })?;
        info!(pid = child.id(), command = line, cwd = %cwd.display(), "spawned process");

        let (tx, rx) = mpsc::channel();
        let mut open_pipes = 0;
        if let Some(stdout) = child.stdout.take() {
            open_pipes += spawn_reader(stdout, OutputStream::Stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            let stream = match self.config.mode {
                StreamMode::Merged => OutputStream::Stdout,
                StreamMode::Separate => OutputStream::Stderr,
            };
            open_pipes += spawn_reader(stderr, stream, tx);
        }

        self.running = Some(Running {
            stdin: child.stdin.take(),
            child,
            rx,
            open_pipes,
            exit: None,
        });
        Ok(())
    }

    /// Send input to the child's stdin.
    pub fn write_stdin(&mut self, data: &[u8]) -> io::Result<()> {
        let stdin = self
            .running
            .as_mut()
            .and_then(|r| r.stdin.as_mut())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no running process"))?;
        stdin.write_all(data)?;
        stdin.flush()
    }

    /// Drain pending events without blocking.
    pub fn poll(&mut self) -> Vec<ProcessEvent> {
        self.poll_timeout(Duration::ZERO)
    }

    /// Drain pending events, waiting up to `timeout` for the first one.
    pub fn poll_timeout(&mut self, timeout: Duration) -> Vec<ProcessEvent> {
        let Some(running) = self.running.as_mut() else {
            return Vec::new();
        };

        let mut events = Vec::new();
        let deadline = Instant::now() + timeout;
        loop {
            let message = if events.is_empty() && !timeout.is_zero() {
                match running.rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(message) => Some(message),
                    Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
                }
            } else {
                running.rx.try_recv().ok()
            };
            let Some((stream, chunk)) = message else {
                break;
            };
            match chunk {
                Some(data) => events.push(ProcessEvent::Output { stream, data }),
                None => running.open_pipes = running.open_pipes.saturating_sub(1),
            }
        }

        if running.exit.is_none() {
            match running.child.try_wait() {
                Ok(Some(status)) => running.exit = Some((status.code(), Instant::now())),
                Ok(None) => {}
                Err(err) => {
                    warn!(error = %err, "failed to query child status");
                    running.exit = Some((None, Instant::now()));
                }
            }
        }

        if let Some((code, exited_at)) = running.exit {
            if running.open_pipes == 0 || exited_at.elapsed() >= DRAIN_GRACE {
                info!(pid = running.child.id(), ?code, "process exited");
                self.running = None;
                events.push(ProcessEvent::Exited { code });
            }
        }
        events
    }

    /// Kill the child and wait (bounded by [`KILL_WAIT`]) for it to be
    /// reaped. Pending output is discarded. Returns false if nothing was
    /// running.
    pub fn kill(&mut self) -> bool {
        let Some(mut running) = self.running.take() else {
            return false;
        };
        let pid = running.child.id();
        if let Err(err) = running.child.kill() {
            // Already exited; reaping below still applies.
            debug!(pid, error = %err, "kill failed");
        }

        let deadline = Instant::now() + KILL_WAIT;
        loop {
            match running.child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
                Ok(None) => {
                    warn!(pid, "process did not exit within the kill wait");
                    break;
                }
                Err(err) => {
                    warn!(pid, error = %err, "failed to reap killed process");
                    break;
                }
            }
        }
        info!(pid, "killed process");
        true
    }
}

impl Drop for ProcessBridge {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Forward chunks from `pipe` until EOF; `None` marks the end. Returns the
/// number of readers started (0 if the thread could not be spawned).
fn spawn_reader<R>(
    mut pipe: R,
    stream: OutputStream,
    tx: Sender<(OutputStream, Option<Vec<u8>>)>,
) -> usize
where
    R: Read + Send + 'static,
{
    let name = match stream {
        OutputStream::Stdout => "ember-stdout",
        OutputStream::Stderr => "ember-stderr",
    };
    let spawned = thread::Builder::new().name(name.to_string()).spawn(move || {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            match pipe.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send((stream, Some(buf[..n].to_vec()))).is_err() {
                        return;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(_) => break,
            }
        }
        let _ = tx.send((stream, None));
    });
    match spawned {
        Ok(_) => 1,
        Err(err) => {
            warn!(error = %err, "failed to start pipe reader");
            0
        }
    }
}

/// Decode bytes as UTF-8, replacing invalid sequences. A multi-byte
/// character cut off at the end of `data` is kept in `carry` for the next
/// chunk.
pub fn decode_chunk(carry: &mut Vec<u8>, data: &[u8]) -> String {
    carry.extend_from_slice(data);
    let keep = match std::str::from_utf8(carry) {
        Ok(_) => 0,
        Err(err) if err.error_len().is_none() => carry.len() - err.valid_up_to(),
        Err(_) => incomplete_tail(carry),
    };
    let tail = carry.split_off(carry.len() - keep);
    let text = String::from_utf8_lossy(carry).into_owned();
    *carry = tail;
    text
}

/// Length of an incomplete UTF-8 sequence at the end of `bytes`.
fn incomplete_tail(bytes: &[u8]) -> usize {
    let start = bytes.len().saturating_sub(3);
    (start..bytes.len())
        .find(|&idx| {
            let lead = bytes[idx];
            let need = match lead {
                0xc0..=0xdf => 2,
                0xe0..=0xef => 3,
                0xf0..=0xf7 => 4,
                _ => return false,
            };
            bytes.len() - idx < need && std::str::from_utf8(&bytes[idx..]).is_err()
        })
        .map_or(0, |idx| bytes.len() - idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_keeps_split_character() {
        let mut carry = Vec::new();
        let bytes = "héllo".as_bytes();
        assert_eq!(decode_chunk(&mut carry, &bytes[..2]), "h");
        assert_eq!(carry.len(), 1);
        assert_eq!(decode_chunk(&mut carry, &bytes[2..]), "éllo");
        assert!(carry.is_empty());
    }

    #[test]
    fn decode_replaces_invalid_bytes() {
        let mut carry = Vec::new();
        assert_eq!(decode_chunk(&mut carry, b"a\xffb"), "a\u{fffd}b");
        // Invalid byte earlier, truncated character at the end.
        let text = decode_chunk(&mut carry, b"\xff\xc3");
        assert_eq!(text, "\u{fffd}");
        assert_eq!(carry, [0xc3]);
    }

    #[test]
    fn shell_config_defaults() {
        let posix = ShellConfig::posix("/bin/bash").with_mode(StreamMode::Separate);
        assert_eq!(posix.args, ["-c"]);
        assert_eq!(posix.mode, StreamMode::Separate);
        assert_eq!(ShellConfig::windows().args, ["/C"]);
    }

    #[test]
    fn idle_bridge_is_inert() {
        let mut bridge = ProcessBridge::default();
        assert!(!bridge.is_running());
        assert!(bridge.poll().is_empty());
        assert!(!bridge.kill());
        assert!(bridge.write_stdin(b"x").is_err());
    }

    #[test]
    fn spawn_failure_is_reported() {
        let mut bridge = ProcessBridge::new(ShellConfig::posix("/no/such/shell"));
        let err = bridge.spawn("true", Path::new(".")).unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
        assert!(!bridge.is_running());
    }

    #[cfg(unix)]
    fn collect_until_exit(bridge: &mut ProcessBridge) -> (Vec<ProcessEvent>, Option<i32>) {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut events = Vec::new();
        while Instant::now() < deadline {
            for event in bridge.poll_timeout(Duration::from_millis(50)) {
                if let ProcessEvent::Exited { code } = event {
                    return (events, code);
                }
                events.push(event);
            }
        }
        panic!("process did not exit");
    }

    #[cfg(unix)]
    #[test]
    fn separate_streams_are_tagged() {
        let config = ShellConfig::posix("/bin/sh").with_mode(StreamMode::Separate);
        let mut bridge = ProcessBridge::new(config);
        bridge
            .spawn("echo out; echo err 1>&2; exit 3", Path::new("."))
            .unwrap();
        let (events, code) = collect_until_exit(&mut bridge);
        assert_eq!(code, Some(3));
        let stderr: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                ProcessEvent::Output {
                    stream: OutputStream::Stderr,
                    data,
                } => Some(data.clone()),
                _ => None,
            })
            .flatten()
            .collect();
        assert_eq!(stderr, b"err\n");
        assert!(!bridge.is_running());
    }

    #[cfg(unix)]
    #[test]
    fn stdin_reaches_child() {
        let mut bridge = ProcessBridge::new(ShellConfig::posix("/bin/sh"));
        bridge.spawn("read line; echo got $line", Path::new(".")).unwrap();
        bridge.write_stdin(b"ping\n").unwrap();
        let (events, code) = collect_until_exit(&mut bridge);
        assert_eq!(code, Some(0));
        let out: Vec<u8> = events
            .into_iter()
            .filter_map(|e| match e {
                ProcessEvent::Output { data, .. } => Some(data),
                ProcessEvent::Exited { .. } => None,
            })
            .flatten()
            .collect();
        assert_eq!(out, b"got ping\n");
    }

    #[cfg(unix)]
    #[test]
    fn kill_is_bounded() {
        let mut bridge = ProcessBridge::new(ShellConfig::posix("/bin/sh"));
        bridge.spawn("sleep 30", Path::new(".")).unwrap();
        let started = Instant::now();
        assert!(bridge.kill());
        assert!(started.elapsed() < KILL_WAIT + Duration::from_millis(500));
        assert!(!bridge.is_running());
    }

    #[cfg(unix)]
    #[test]
    fn spawning_supersedes_running_child() {
        let mut bridge = ProcessBridge::new(ShellConfig::posix("/bin/sh"));
        bridge.spawn("sleep 30", Path::new(".")).unwrap();
        let first = bridge.pid();
        bridge.spawn("echo second", Path::new(".")).unwrap();
        assert_ne!(bridge.pid(), first);
        let (_, code) = collect_until_exit(&mut bridge);
        assert_eq!(code, Some(0));
    }
}
