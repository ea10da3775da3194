//! TCP ingest for live encoders.
//!
//! An encoder (e.g. `ffmpeg -f webm tcp://host:9001`) connects and streams
//! WebM. Connections are served one at a time: each one is written to its
//! own `stream-N.webm` as the initialization segment followed by every media
//! segment, and the segment stream is reset when the encoder disconnects so
//! the next connection starts from a clean state.

use anyhow::{Context, Result};
use ebmlcast_media::{SegmentStream, StreamConfig};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// What one encoder connection produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSummary {
    pub path: PathBuf,
    pub bytes_received: u64,
    pub init_segments: usize,
    pub media_segments: usize,
    /// Set when segmenting failed and the connection was cut short.
    pub error: Option<String>,
    /// The server shut down while the encoder was still connected.
    pub interrupted: bool,
}

/// Segments encoder connections into numbered output files.
#[derive(Debug)]
pub struct IngestServer {
    stream: SegmentStream,
    out_dir: PathBuf,
    chunk_size: usize,
    next_index: usize,
}

impl IngestServer {
    pub fn new(stream_config: StreamConfig, out_dir: &Path, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            anyhow::bail!("Chunk size cannot be 0");
        }
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

        let stream = SegmentStream::new(stream_config)?;
        let chunk_size = chunk_size.min(stream.capacity());

        Ok(Self {
            stream,
            out_dir: out_dir.to_path_buf(),
            chunk_size,
            next_index: 0,
        })
    }

    /// Accept encoders until `shutdown` resolves, including while an
    /// encoder is connected.
    pub async fn run<F>(mut self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!(
            "Listening for encoder data on {}",
            listener.local_addr()?
        );

        loop {
            let (socket, peer) = tokio::select! {
                accepted = listener.accept() => accepted.context("Failed to accept connection")?,
                _ = &mut shutdown => {
                    tracing::info!("Shutting down listener");
                    return Ok(());
                }
            };

            tracing::info!(%peer, "Encoder connected");
            let summary = self.serve_connection(socket, &mut shutdown).await?;
            if summary.interrupted {
                tracing::info!(%peer, file = ?summary.path, "Shutting down listener");
                return Ok(());
            }
            tracing::info!(
                %peer,
                file = ?summary.path,
                bytes = summary.bytes_received,
                media = summary.media_segments,
                "Encoder disconnected, stream reset"
            );
        }
    }

    /// Segment one connection into the next `stream-N.webm`.
    ///
    /// Segmenting errors end the connection but not the server; file errors
    /// are returned.
    pub async fn handle_connection<R>(&mut self, reader: R) -> Result<ConnectionSummary>
    where
        R: AsyncRead + Unpin,
    {
        self.serve_connection(reader, std::future::pending::<()>())
            .await
    }

    /// Like [`IngestServer::handle_connection`], but stops reading when
    /// `shutdown` resolves. The stream is reset and the file flushed either
    /// way.
    async fn serve_connection<R, S>(&mut self, mut reader: R, mut shutdown: S) -> Result<ConnectionSummary>
    where
        R: AsyncRead + Unpin,
        S: Future<Output = ()> + Unpin,
    {
        let path = self.out_dir.join(format!("stream-{}.webm", self.next_index));
        self.next_index += 1;

        let mut out = File::create(&path)
            .await
            .with_context(|| format!("Failed to create {:?}", path))?;
        let mut summary = ConnectionSummary {
            path,
            bytes_received: 0,
            init_segments: 0,
            media_segments: 0,
            error: None,
            interrupted: false,
        };

        let result = self
            .pump(&mut reader, &mut out, &mut summary, &mut shutdown)
            .await;
        self.stream.reset();
        out.flush().await?;

        match result {
            Ok(()) => Ok(summary),
            Err(PumpError::Segment(e)) => {
                tracing::warn!("Dropping encoder connection: {}", e);
                summary.error = Some(e.to_string());
                Ok(summary)
            }
            Err(PumpError::Io(e)) => Err(e),
        }
    }

    async fn pump<R, S>(
        &mut self,
        reader: &mut R,
        out: &mut File,
        summary: &mut ConnectionSummary,
        shutdown: &mut S,
    ) -> std::result::Result<(), PumpError>
    where
        R: AsyncRead + Unpin,
        S: Future<Output = ()> + Unpin,
    {
        let mut buf = vec![0u8; self.chunk_size];
        let mut segments = Vec::new();
        loop {
            let read = tokio::select! {
                read = reader.read(&mut buf) => read,
                _ = &mut *shutdown => {
                    summary.interrupted = true;
                    return Ok(());
                }
            };
            let n = match read {
                Ok(0) => return Ok(()),
                Ok(n) => n,
                Err(e) => {
                    // A reset by the encoder ends the stream like a clean close.
                    tracing::debug!("Encoder read failed: {}", e);
                    return Ok(());
                }
            };
            summary.bytes_received += n as u64;

            let result = self.stream.write_into(&buf[..n], &mut segments);
            for segment in segments.drain(..) {
                if segment.as_init().is_some() {
                    summary.init_segments += 1;
                } else {
                    summary.media_segments += 1;
                }
                out.write_all(segment.data())
                    .await
                    .with_context(|| format!("Failed to write {:?}", summary.path))
                    .map_err(PumpError::Io)?;
            }
            result.map_err(PumpError::Segment)?;
        }
    }
}

enum PumpError {
    Segment(ebmlcast_media::Error),
    Io(anyhow::Error),
}

/// Wait for Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Bind and serve until Ctrl-C or SIGTERM.
pub async fn serve(
    host: &str,
    port: u16,
    stream_config: StreamConfig,
    out_dir: &Path,
    chunk_size: usize,
) -> Result<()> {
    let server = IngestServer::new(stream_config, out_dir, chunk_size)?;
    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    server.run(listener, shutdown_signal()).await
}
