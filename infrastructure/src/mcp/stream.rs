//! Stream transport — newline-delimited JSON-RPC over a byte stream.
//!
//! In production the stream is the stdio of a spawned MCP server process; in
//! tests it is one end of a `tokio::io::duplex` pipe.
//!
//! [`StreamChannel`] runs a single background reader task that owns the read
//! half exclusively and correlates responses with waiting callers through
//! `oneshot` channels:
//!
//! ```text
//! caller ──insert(id, tx)──▶ pending ◀──remove(id)── reader task ◀── server stdout
//!    │                                                   │
//!    └──write frame (writer mutex)──▶ server stdin        └──tx.send(response)
//! ```
//!
//! When the stream ends, the reader marks the channel closed and drops every
//! pending sender, so each waiting caller wakes with
//! [`McpError::TransportClosed`].

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::channel::RpcChannel;
use super::error::{McpError, Result};
use super::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
use super::transport::{MessageKind, classify_message, encode_frame};

type PendingTable = Arc<Mutex<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// How to launch an MCP server process.
#[derive(Debug, Clone, Default)]
pub struct ServerCommand {
    pub command: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

impl ServerCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// Removes a pending entry when the waiting caller goes away, whether it
/// finished, failed to send, timed out, or was cancelled.
struct PendingGuard {
    id: u64,
    pending: PendingTable,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

pub struct StreamChannel {
    /// Serialized writes; never held while awaiting a response.
    writer: tokio::sync::Mutex<BoxedWriter>,
    /// Request-response correlation (request_id -> oneshot sender).
    pending: PendingTable,
    next_id: AtomicU64,
    closed: Arc<AtomicBool>,
    reader_handle: JoinHandle<()>,
    /// Server child process, killed on Drop.
    child: Mutex<Option<Child>>,
}

impl StreamChannel {
    /// Build a channel over an arbitrary read/write pair and start the
    /// reader task.
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let pending: PendingTable = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let pending_bg = Arc::clone(&pending);
        let closed_bg = Arc::clone(&closed);
        let reader_handle = tokio::spawn(async move {
            Self::reader_loop(reader, pending_bg, closed_bg).await;
        });

        Self {
            writer: tokio::sync::Mutex::new(Box::new(writer)),
            pending,
            next_id: AtomicU64::new(1),
            closed,
            reader_handle,
            child: Mutex::new(None),
        }
    }

    /// Spawn an MCP server and talk to it over its stdin/stdout.
    ///
    /// The server's stderr is forwarded line by line to `debug!`.
    pub async fn spawn_process(server: &ServerCommand) -> Result<Self> {
        info!("Spawning MCP server: {} {}", server.command, server.args.join(" "));

        let mut cmd = Command::new(&server.command);
        cmd.args(&server.args)
            .envs(&server.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Linux: request kernel to send SIGTERM to child when parent dies.
        // This catches cases where Drop doesn't run (SIGKILL, OOM kill).
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd.spawn().map_err(McpError::Spawn)?;

        let stdin = child.stdin.take().ok_or_else(|| {
            McpError::Spawn(std::io::Error::other("Failed to capture server stdin"))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            McpError::Spawn(std::io::Error::other("Failed to capture server stdout"))
        })?;

        if let Some(stderr) = child.stderr.take() {
            let name = server.command.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("[{} stderr] {}", name, line);
                }
            });
        }

        let channel = Self::new(stdout, stdin);
        *channel.child.lock().unwrap_or_else(PoisonError::into_inner) = Some(child);
        Ok(channel)
    }

    /// Background reader loop — single owner of the read half.
    ///
    /// Runs until EOF or an I/O error. Malformed lines are logged and
    /// skipped. On exit the channel is marked closed and all pending senders
    /// are dropped.
    async fn reader_loop<R>(reader: R, pending: PendingTable, closed: Arc<AtomicBool>)
    where
        R: AsyncRead + Send + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    debug!("MCP reader: stream closed");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("MCP reader: read error: {}", e);
                    break;
                }
            }

            let frame = line.trim();
            if frame.is_empty() {
                continue;
            }
            trace!("MCP received: {}", frame);

            let json_value: Value = match serde_json::from_str(frame) {
                Ok(v) => v,
                Err(e) => {
                    warn!("MCP reader: skipping malformed frame: {} — {}", e, frame);
                    continue;
                }
            };

            match classify_message(&json_value) {
                MessageKind::Response { id } => {
                    let response: JsonRpcResponse = match serde_json::from_value(json_value) {
                        Ok(r) => r,
                        Err(e) => {
                            warn!("MCP reader: failed to parse response id={}: {}", id, e);
                            continue;
                        }
                    };
                    let sender = pending
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .remove(&id);
                    match sender {
                        Some(tx) => {
                            let _ = tx.send(response);
                        }
                        None => debug!("MCP reader: no pending caller for response id={}", id),
                    }
                }
                MessageKind::IncomingRequest { id } => {
                    let method = json_value.get("method").and_then(|m| m.as_str());
                    debug!("MCP reader: ignoring server request id={} method={:?}", id, method);
                }
                MessageKind::Notification => {
                    let method = json_value.get("method").and_then(|m| m.as_str());
                    trace!("MCP reader: ignoring notification method={:?}", method);
                }
            }
        }

        // Reader ended: mark closed first, then drop all senders so waiting
        // callers observe RecvError.
        closed.store(true, Ordering::SeqCst);
        let dropped = {
            let mut table = pending.lock().unwrap_or_else(PoisonError::into_inner);
            let n = table.len();
            table.clear();
            n
        };
        info!("MCP reader ended, {} pending call(s) released", dropped);
    }

    async fn write_frame(&self, frame: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(frame).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Number of requests awaiting a response.
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl RpcChannel for StreamChannel {
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest::new(id, method, params);
        let frame = encode_frame(&request)?;

        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tx);
        let _guard = PendingGuard {
            id,
            pending: Arc::clone(&self.pending),
        };

        // The reader may have exited before the insert; its final clear would
        // then have missed this entry.
        if self.is_closed() {
            return Err(McpError::TransportClosed);
        }

        trace!("MCP sending: {}", String::from_utf8_lossy(&frame).trim_end());
        self.write_frame(&frame).await?;

        let response = rx.await.map_err(|_| McpError::TransportClosed)?;
        response.into_result()
    }

    async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        if self.is_closed() {
            return Err(McpError::TransportClosed);
        }
        let frame = encode_frame(&JsonRpcNotification::new(method, params))?;
        self.write_frame(&frame).await
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for StreamChannel {
    fn drop(&mut self) {
        self.reader_handle.abort();
        if let Some(child) = self
            .child
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            debug!("StreamChannel dropping, killing MCP server process");
            let _ = child.start_kill();
        }
    }
}
