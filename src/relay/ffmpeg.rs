//! ffmpeg-backed relay worker
//!
//! Starting a relay:
//! 1. bind the relay's TCP port (so a taken port fails before any process exists)
//! 2. spawn `ffmpeg -i <url> -f mpegts -codec:v mpeg1video <options> -`
//! 3. watch for an early exit during `startup_grace` (bad URL, unknown codec, ...)
//! 4. pump stdout into a broadcast channel served over WebSocket
//!
//! The child is spawned with `kill_on_drop`, and [`RelayHandle`] aborts its
//! tasks on drop, so a handle that is dropped instead of stopped still tears
//! the relay down.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpListener;
use tokio::process::{Child, Command};
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;

use super::websocket::{self, RelayFeed, VideoDimensions};
use super::{RelaySpec, RelayWorker, WorkerError};
use crate::allocator::Endpoint;

const STDERR_CHUNK_SIZE: usize = 4096;

/// Longest unterminated stderr line kept before it is discarded
const MAX_STDERR_LINE: usize = 16 * 1024;

/// Configuration for [`FfmpegRelay`]
#[derive(Debug, Clone)]
pub struct FfmpegConfig {
    /// ffmpeg executable
    pub ffmpeg_path: PathBuf,

    /// Address relay sockets bind to
    pub bind_host: IpAddr,

    /// How long to watch for ffmpeg exiting right after spawn
    pub startup_grace: Duration,

    /// Force TCP transport for `rtsp://` sources
    pub rtsp_over_tcp: bool,

    /// Chunks buffered per relay before slow clients start skipping
    pub channel_capacity: usize,

    /// Read buffer size for ffmpeg stdout
    pub read_chunk_size: usize,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            bind_host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            startup_grace: Duration::from_millis(500),
            rtsp_over_tcp: true,
            channel_capacity: 256,
            read_chunk_size: 32 * 1024,
        }
    }
}

impl FfmpegConfig {
    /// Set the ffmpeg executable
    pub fn ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = path.into();
        self
    }

    /// Set the bind address for relay sockets
    pub fn bind_host(mut self, host: IpAddr) -> Self {
        self.bind_host = host;
        self
    }

    /// Set the startup grace period (zero disables the early-exit check)
    pub fn startup_grace(mut self, grace: Duration) -> Self {
        self.startup_grace = grace;
        self
    }
}

/// Relay worker spawning one ffmpeg process per stream
#[derive(Debug, Clone, Default)]
pub struct FfmpegRelay {
    config: FfmpegConfig,
}

/// Running ffmpeg relay
pub struct RelayHandle {
    endpoint: Endpoint,
    child: Child,
    shutdown: Option<oneshot::Sender<()>>,
    tasks: Vec<JoinHandle<()>>,
    feed: RelayFeed,
}

impl RelayHandle {
    /// Port this relay serves on
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// ffmpeg process id, if it is still running
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Number of connected WebSocket clients
    pub fn client_count(&self) -> usize {
        self.feed.client_count()
    }

    fn abort_tasks(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for RelayHandle {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

impl FfmpegRelay {
    /// Create a worker with the given configuration
    pub fn new(config: FfmpegConfig) -> Self {
        Self { config }
    }

    /// Worker configuration
    pub fn config(&self) -> &FfmpegConfig {
        &self.config
    }

    /// Full ffmpeg argument list for a relay
    pub fn command_args(&self, spec: &RelaySpec) -> Vec<String> {
        let mut args = Vec::new();

        if self.config.rtsp_over_tcp && spec.source_url.starts_with("rtsp://") {
            args.push("-rtsp_transport".to_string());
            args.push("tcp".to_string());
        }

        args.extend(
            ["-i", spec.source_url.as_str(), "-f", "mpegts", "-codec:v", "mpeg1video"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.extend(spec.options.to_args());
        args.push("-".to_string());

        args
    }

    async fn spawn(&self, spec: &RelaySpec) -> Result<RelayHandle, WorkerError> {
        let addr = SocketAddr::new(self.config.bind_host, spec.endpoint.port());
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| WorkerError::new(format!("failed to bind {}: {}", addr, e)))?;

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(self.command_args(spec))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                WorkerError::new(format!(
                    "failed to spawn {}: {}",
                    self.config.ffmpeg_path.display(),
                    e
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| WorkerError::new("ffmpeg stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| WorkerError::new("ffmpeg stderr not captured"))?;

        let (tx, _) = broadcast::channel(self.config.channel_capacity);
        let (dim_tx, dim_rx) = watch::channel(None);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let feed = RelayFeed::new(spec.endpoint, tx.clone(), dim_rx);

        let pump = tokio::spawn(pump_output(
            stdout,
            tx,
            self.config.read_chunk_size,
            spec.name.clone(),
        ));
        let log = tokio::spawn(watch_stderr(stderr, dim_tx, spec.name.clone()));
        let server = tokio::spawn(serve(listener, feed.clone(), shutdown_rx, spec.name.clone()));

        Ok(RelayHandle {
            endpoint: spec.endpoint,
            child,
            shutdown: Some(shutdown_tx),
            tasks: vec![pump, log, server],
            feed,
        })
    }
}

impl RelayWorker for FfmpegRelay {
    type Handle = RelayHandle;

    async fn start(&self, spec: RelaySpec) -> Result<RelayHandle, WorkerError> {
        let mut handle = self.spawn(&spec).await?;

        if !self.config.startup_grace.is_zero() {
            match tokio::time::timeout(self.config.startup_grace, handle.child.wait()).await {
                // Still running after the grace period
                Err(_) => {}
                Ok(Ok(status)) => {
                    return Err(WorkerError::new(format!(
                        "ffmpeg exited during startup ({})",
                        status
                    )));
                }
                Ok(Err(e)) => {
                    return Err(WorkerError::new(format!("failed to poll ffmpeg: {}", e)));
                }
            }
        }

        tracing::info!(
            stream = %spec.name,
            endpoint = %spec.endpoint,
            pid = ?handle.pid(),
            "ffmpeg relay started"
        );

        Ok(handle)
    }

    async fn stop(&self, mut handle: RelayHandle) -> Result<(), WorkerError> {
        handle.abort_tasks();

        let result = match handle.child.try_wait() {
            Ok(Some(status)) => {
                tracing::debug!(endpoint = %handle.endpoint, %status, "ffmpeg already exited");
                Ok(())
            }
            Ok(None) => match handle.child.kill().await {
                Ok(()) => Ok(()),
                Err(e) => Err(WorkerError::new(format!("failed to kill ffmpeg: {}", e))),
            },
            Err(e) => Err(WorkerError::new(format!("failed to poll ffmpeg: {}", e))),
        };

        tracing::info!(
            endpoint = %handle.endpoint,
            ok = result.is_ok(),
            "ffmpeg relay stopped"
        );

        result
    }
}

async fn pump_output<R>(mut stdout: R, tx: broadcast::Sender<Bytes>, chunk_size: usize, name: String)
where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(chunk_size);

    loop {
        buf.reserve(chunk_size);
        match stdout.read_buf(&mut buf).await {
            Ok(0) => {
                tracing::warn!(stream = %name, "ffmpeg output ended");
                break;
            }
            Ok(_) => {
                // No receivers is fine: nobody is watching yet
                let _ = tx.send(buf.split().freeze());
            }
            Err(e) => {
                tracing::warn!(stream = %name, error = %e, "Failed to read ffmpeg output");
                break;
            }
        }
    }
}

async fn watch_stderr<R>(
    mut stderr: R,
    dimensions: watch::Sender<Option<VideoDimensions>>,
    name: String,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(STDERR_CHUNK_SIZE);

    // Drain until EOF no matter what ffmpeg prints; a closed pipe kills it
    loop {
        buf.reserve(STDERR_CHUNK_SIZE);
        match stderr.read_buf(&mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(stream = %name, error = %e, "Failed to read ffmpeg stderr");
                break;
            }
        }

        // `-stats` progress lines end in '\r' only
        while let Some(pos) = buf.iter().position(|&b| b == b'\n' || b == b'\r') {
            let line = buf.split_to(pos + 1);
            stderr_line(&line[..pos], &dimensions, &name);
        }

        if buf.len() > MAX_STDERR_LINE {
            buf.clear();
        }
    }

    if !buf.is_empty() {
        stderr_line(&buf, &dimensions, &name);
    }
}

fn stderr_line(raw: &[u8], dimensions: &watch::Sender<Option<VideoDimensions>>, name: &str) {
    if raw.is_empty() {
        return;
    }

    let line = String::from_utf8_lossy(raw);
    tracing::trace!(stream = %name, "ffmpeg: {}", line);

    if dimensions.borrow().is_none() {
        if let Some(found) = parse_dimensions(&line) {
            tracing::debug!(
                stream = %name,
                width = found.width,
                height = found.height,
                "Detected video size"
            );
            dimensions.send_replace(Some(found));
        }
    }
}

async fn serve(
    listener: TcpListener,
    feed: RelayFeed,
    shutdown: oneshot::Receiver<()>,
    name: String,
) {
    let app = websocket::router(feed);
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown.await;
        })
        .await;

    if let Err(e) = result {
        tracing::warn!(stream = %name, error = %e, "Relay socket server failed");
    }
}

/// Extract the video frame size from an ffmpeg stream description line
///
/// Matches lines like
/// `Stream #0:0: Video: h264 (High), yuv420p(progressive), 1280x720, 25 fps`.
pub fn parse_dimensions(line: &str) -> Option<VideoDimensions> {
    let (_, description) = line.split_once("Video:")?;

    description
        .split(|c: char| c == ',' || c.is_whitespace())
        .find_map(|token| {
            let (w, h) = token.split_once('x')?;
            let width: u16 = w.parse().ok()?;
            let height: u16 = h.parse().ok()?;
            (width > 0 && height > 0).then_some(VideoDimensions { width, height })
        })
}
