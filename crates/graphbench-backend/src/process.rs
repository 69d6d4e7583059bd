//! Server process lifecycle.
//!
//! A [`ProcessHandle`] owns at most one child process for one `host:port`
//! endpoint and moves through `NotStarted → Running → Stopped`. Stopped is
//! terminal: a new handle is needed to launch again.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::error::BackendError;

/// Default delay between readiness checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default upper bound on the wait for readiness.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound on a single connection attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Lifecycle state of a [`ProcessHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// No process launched yet
    NotStarted,
    /// Process launched and accepting connections
    Running,
    /// Process killed and reaped, or launch failed
    Stopped,
}

/// Whether something accepts TCP connections on `host:port`.
pub async fn is_port_open(host: &str, port: u16) -> bool {
    matches!(
        tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}

/// Handle to a server process listening on a known port.
#[derive(Debug)]
pub struct ProcessHandle {
    host: String,
    port: u16,
    poll_interval: Duration,
    ready_timeout: Option<Duration>,
    state: ProcessState,
    child: Option<Child>,
}

impl ProcessHandle {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            poll_interval: DEFAULT_POLL_INTERVAL,
            ready_timeout: Some(DEFAULT_READY_TIMEOUT),
            state: ProcessState::NotStarted,
            child: None,
        }
    }

    /// Set the delay between readiness checks.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the readiness timeout. `None` waits forever.
    pub fn with_ready_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ProcessState::Running
    }

    /// OS process id while running.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    /// Launch `program args...` and wait until the port accepts connections.
    ///
    /// Returns the child's pid. Fails without spawning anything when the
    /// handle is not fresh or the port is already taken.
    pub async fn start<S: AsRef<std::ffi::OsStr>>(
        &mut self,
        program: &Path,
        args: &[S],
    ) -> Result<Option<u32>, BackendError> {
        match self.state {
            ProcessState::Running => {
                return Err(BackendError::lifecycle("server process already running"))
            }
            ProcessState::Stopped => {
                return Err(BackendError::lifecycle("process handle already stopped"))
            }
            ProcessState::NotStarted => {}
        }

        if is_port_open(&self.host, self.port).await {
            return Err(BackendError::PortInUse { port: self.port });
        }

        debug!("Spawning {:?} for port {}", program, self.port);
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BackendError::spawn(program, e))?;

        let started = Instant::now();
        loop {
            if is_port_open(&self.host, self.port).await {
                break;
            }

            match child.try_wait() {
                Ok(Some(status)) => {
                    self.state = ProcessState::Stopped;
                    return Err(BackendError::ServerExited {
                        port: self.port,
                        status: status.to_string(),
                    });
                }
                Ok(None) => {}
                Err(e) => warn!("Failed to poll server process: {}", e),
            }

            if let Some(timeout) = self.ready_timeout {
                let waited = started.elapsed();
                if waited >= timeout {
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill unready server: {}", e);
                    }
                    self.state = ProcessState::Stopped;
                    return Err(BackendError::NotReady {
                        port: self.port,
                        waited,
                    });
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }

        let pid = child.id();
        info!(
            "Server ready on {}:{} (pid {:?}) after {:?}",
            self.host,
            self.port,
            pid,
            started.elapsed()
        );
        self.child = Some(child);
        self.state = ProcessState::Running;
        Ok(pid)
    }

    /// Kill the server and wait for it to exit.
    pub async fn stop(&mut self) -> Result<(), BackendError> {
        if self.state != ProcessState::Running {
            return Err(BackendError::lifecycle("server process not running"));
        }
        self.state = ProcessState::Stopped;

        let Some(mut child) = self.child.take() else {
            return Err(BackendError::lifecycle("server process not running"));
        };

        // Fails only when the child already exited; wait() still reaps it
        if let Err(e) = child.start_kill() {
            debug!("Kill signal not delivered: {}", e);
        }
        let status = child
            .wait()
            .await
            .map_err(|e| BackendError::lifecycle(format!("failed to reap server: {e}")))?;

        info!("Server on port {} stopped ({})", self.port, status);
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tokio::net::TcpListener;

    async fn free_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    fn sh() -> PathBuf {
        PathBuf::from("/bin/sh")
    }

    #[tokio::test]
    async fn test_port_in_use_spawns_nothing() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut handle = ProcessHandle::new("127.0.0.1", port);
        let err = handle.start(&sh(), &["-c", "sleep 5"]).await.unwrap_err();

        assert!(matches!(
            err,
            BackendError::PortInUse { port: p } if p == port
        ));
        assert_eq!(handle.state(), ProcessState::NotStarted);
        assert!(handle.pid().is_none());
    }

    #[tokio::test]
    async fn test_early_exit_is_reported() {
        let port = free_port().await;
        let mut handle =
            ProcessHandle::new("127.0.0.1", port).with_poll_interval(Duration::from_millis(20));

        let err = handle.start(&sh(), &["-c", "exit 7"]).await.unwrap_err();

        assert!(matches!(err, BackendError::ServerExited { .. }));
        assert_eq!(handle.state(), ProcessState::Stopped);
    }

    #[tokio::test]
    async fn test_ready_timeout_kills_child() {
        let port = free_port().await;
        let mut handle = ProcessHandle::new("127.0.0.1", port)
            .with_poll_interval(Duration::from_millis(20))
            .with_ready_timeout(Some(Duration::from_millis(200)));

        let err = handle.start(&sh(), &["-c", "sleep 30"]).await.unwrap_err();

        match err {
            BackendError::NotReady { port: p, waited } => {
                assert_eq!(p, port);
                assert!(waited >= Duration::from_millis(200));
            }
            other => panic!("expected NotReady, got {other:?}"),
        }
        assert_eq!(handle.state(), ProcessState::Stopped);
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let port = free_port().await;
        let mut handle = ProcessHandle::new("127.0.0.1", port);

        let err = handle
            .start(Path::new("/nonexistent/graphbench-server"), &["x"])
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::Spawn { .. }));
        assert!(err.is_launch_error());
    }

    #[tokio::test]
    async fn test_stop_before_start_is_lifecycle_error() {
        let mut handle = ProcessHandle::new("127.0.0.1", 1);
        let err = handle.stop().await.unwrap_err();
        assert_eq!(err.to_string(), "server process not running");
    }

    #[tokio::test]
    async fn test_stopped_handle_cannot_restart() {
        let port = free_port().await;
        let mut handle =
            ProcessHandle::new("127.0.0.1", port).with_poll_interval(Duration::from_millis(20));
        let _ = handle.start(&sh(), &["-c", "exit 1"]).await;

        let err = handle.start(&sh(), &["-c", "exit 1"]).await.unwrap_err();
        assert_eq!(err.to_string(), "process handle already stopped");
    }
}
