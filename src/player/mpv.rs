use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;

use crate::app_config::PlayerConfig;
use crate::errors::PlayerError;
use crate::player::{Player, PlayerEvent};

// @module: mpv control over its JSON IPC socket

// @const: observe_property ids
const PLAYBACK_TIME_OBSERVER: u64 = 1;
const DURATION_OBSERVER: u64 = 2;

// @const: Delay between connection attempts while mpv starts up
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(100);

type PendingReplies = Arc<Mutex<HashMap<u64, oneshot::Sender<MpvMessage>>>>;

/// Command sent to mpv
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MpvRequest {
    /// Command name followed by its arguments
    pub command: Vec<Value>,
    /// Echoed back in the matching reply
    pub request_id: u64,
}

impl MpvRequest {
    // @returns: One newline-terminated JSON line
    pub fn encode(&self) -> Result<String, PlayerError> {
        let mut line = serde_json::to_string(self)
            .map_err(|e| PlayerError::ProtocolError(e.to_string()))?;
        line.push('\n');
        Ok(line)
    }
}

/// Any line mpv writes: a reply (has `error`) or an event (has `event`)
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MpvMessage {
    /// Event name, only on events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// "success" or an error string, only on replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Reply payload or property value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Id of the request being answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
    /// Property name on property-change events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Observer id on property-change events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

impl MpvMessage {
    pub fn decode(line: &str) -> Result<Self, PlayerError> {
        serde_json::from_str(line)
            .map_err(|e| PlayerError::ProtocolError(format!("{}: {}", e, line)))
    }

    pub fn is_event(&self) -> bool {
        self.event.is_some()
    }

    /// Translate an event into what the editor cares about.
    ///
    /// Property changes with no value (nothing loaded yet) are skipped.
    pub fn to_player_event(&self) -> Option<PlayerEvent> {
        match self.event.as_deref()? {
            "property-change" => {
                let value = self.data.as_ref().and_then(Value::as_f64)?;
                match self.name.as_deref()? {
                    "playback-time" => Some(PlayerEvent::Position(value)),
                    "duration" => Some(PlayerEvent::Duration(value)),
                    _ => None,
                }
            }
            "shutdown" => Some(PlayerEvent::Exited),
            _ => None,
        }
    }
}

/// Client for one mpv IPC connection.
///
/// A background task reads the socket, hands replies to the waiting request
/// and forwards playhead events to the channel returned on connect.
#[derive(Debug)]
pub struct MpvClient {
    // @field: Write side of the socket
    writer: Mutex<OwnedWriteHalf>,
    // @field: Requests waiting for a reply, by request_id
    pending: PendingReplies,
    // @field: Next request_id
    next_request_id: AtomicU64,
    // @field: Reply deadline per command
    command_timeout: Duration,
    // @field: Socket reader
    reader_task: JoinHandle<()>,
}

impl MpvClient {
    /// Connect to a socket that is already listening
    pub async fn connect<P: AsRef<Path>>(
        socket_path: P,
        command_timeout: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<PlayerEvent>), PlayerError> {
        let socket_path = socket_path.as_ref();
        let stream = UnixStream::connect(socket_path).await.map_err(|e| {
            PlayerError::ConnectionError(format!("{}: {}", socket_path.display(), e))
        })?;
        Self::from_stream(stream, command_timeout).await
    }

    /// Keep trying to connect until the socket shows up or `connect_timeout` passes
    pub async fn connect_with_retry<P: AsRef<Path>>(
        socket_path: P,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<PlayerEvent>), PlayerError> {
        let socket_path = socket_path.as_ref();
        let deadline = tokio::time::Instant::now() + connect_timeout;

        loop {
            match UnixStream::connect(socket_path).await {
                Ok(stream) => return Self::from_stream(stream, command_timeout).await,
                Err(e) if tokio::time::Instant::now() < deadline => {
                    debug!("mpv socket not ready yet ({}), retrying", e);
                    tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                }
                Err(e) => {
                    return Err(PlayerError::Timeout(format!(
                        "no IPC socket at {} after {}s: {}",
                        socket_path.display(),
                        connect_timeout.as_secs(),
                        e
                    )));
                }
            }
        }
    }

    /// Wrap a connected stream and subscribe to playhead properties
    pub async fn from_stream(
        stream: UnixStream,
        command_timeout: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<PlayerEvent>), PlayerError> {
        let (read_half, write_half) = stream.into_split();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let pending: PendingReplies = Arc::new(Mutex::new(HashMap::new()));

        let reader_task = tokio::spawn(Self::read_loop(read_half, pending.clone(), event_tx));

        let client = Self {
            writer: Mutex::new(write_half),
            pending,
            next_request_id: AtomicU64::new(1),
            command_timeout,
            reader_task,
        };

        client.observe_property(PLAYBACK_TIME_OBSERVER, "playback-time").await?;
        client.observe_property(DURATION_OBSERVER, "duration").await?;

        Ok((client, event_rx))
    }

    async fn read_loop(
        read_half: OwnedReadHalf,
        pending: PendingReplies,
        events: mpsc::UnboundedSender<PlayerEvent>,
    ) {
        let mut lines = BufReader::new(read_half).lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    let message = match MpvMessage::decode(&line) {
                        Ok(message) => message,
                        Err(e) => {
                            warn!("Skipping unreadable mpv message: {}", e);
                            continue;
                        }
                    };

                    if message.is_event() {
                        if let Some(event) = message.to_player_event() {
                            let _ = events.send(event);
                        }
                    } else if let Some(request_id) = message.request_id {
                        if let Some(waiter) = pending.lock().await.remove(&request_id) {
                            let _ = waiter.send(message);
                        }
                    }
                }
                Ok(None) => {
                    debug!("mpv IPC socket closed");
                    break;
                }
                Err(e) => {
                    warn!("mpv IPC read failed: {}", e);
                    break;
                }
            }
        }

        let _ = events.send(PlayerEvent::Exited);
        // Dropping the senders wakes every waiter with an error
        pending.lock().await.clear();
    }

    /// Send a raw command and wait for its reply payload
    pub async fn command(&self, args: Vec<Value>) -> Result<Option<Value>, PlayerError> {
        let command_name = args
            .first()
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        let line = MpvRequest { command: args, request_id }.encode()?;

        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending.lock().await.insert(request_id, reply_tx);

        if let Err(e) = self.write_line(&line).await {
            self.pending.lock().await.remove(&request_id);
            return Err(e);
        }
        debug!("mpv <- {}", line.trim_end());

        let reply = match tokio::time::timeout(self.command_timeout, reply_rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => {
                return Err(PlayerError::ConnectionError(
                    "player closed the connection".to_string(),
                ));
            }
            Err(_) => {
                self.pending.lock().await.remove(&request_id);
                return Err(PlayerError::Timeout(command_name));
            }
        };

        match reply.error.as_deref() {
            None | Some("success") => Ok(reply.data),
            Some(message) => Err(PlayerError::CommandFailed {
                command: command_name,
                message: message.to_string(),
            }),
        }
    }

    async fn write_line(&self, line: &str) -> Result<(), PlayerError> {
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }

    // @subscribes: property-change events for one property
    pub async fn observe_property(&self, observer_id: u64, name: &str) -> Result<(), PlayerError> {
        self.command(vec![json!("observe_property"), json!(observer_id), json!(name)])
            .await
            .map(|_| ())
    }

    // @returns: Numeric property value, None while unavailable
    pub async fn get_property_f64(&self, name: &str) -> Result<Option<f64>, PlayerError> {
        let data = self.command(vec![json!("get_property"), json!(name)]).await?;
        Ok(data.as_ref().and_then(Value::as_f64))
    }
}

impl Drop for MpvClient {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

#[async_trait]
impl Player for MpvClient {
    async fn seek(&self, seconds: f64) -> Result<(), PlayerError> {
        self.command(vec![json!("seek"), json!(seconds), json!("absolute")])
            .await
            .map(|_| ())
    }

    async fn load_file(&self, path: &Path) -> Result<(), PlayerError> {
        self.command(vec![json!("loadfile"), json!(path.to_string_lossy())])
            .await
            .map(|_| ())
    }
}

/// mpv child process together with its IPC client
#[derive(Debug)]
pub struct MpvProcess {
    // @field: Killed on drop
    child: Child,
    // @field: Connection to the child's socket
    client: MpvClient,
}

impl MpvProcess {
    /// Start mpv on `video_path` and connect to its IPC socket
    pub async fn launch(
        video_path: &Path,
        config: &PlayerConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<PlayerEvent>), PlayerError> {
        let socket_path = Path::new(&config.socket_path);

        // A socket file left by an earlier run would accept no connections
        if socket_path.exists() {
            let _ = std::fs::remove_file(socket_path);
        }

        let mut child = Command::new(&config.binary_path)
            .arg(video_path)
            .arg(format!("--input-ipc-server={}", config.socket_path))
            .args(&config.extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PlayerError::SpawnFailed(format!("{}: {}", config.binary_path, e)))?;

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_output(stdout, false));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_output(stderr, true));
        }

        let (client, events) = MpvClient::connect_with_retry(
            socket_path,
            Duration::from_secs(config.connect_timeout_secs),
            Duration::from_secs(config.command_timeout_secs),
        )
        .await?;

        info!("Player started for {}", video_path.display());
        Ok((Self { child, client }, events))
    }

    pub fn client(&self) -> &MpvClient {
        &self.client
    }

    /// Ask mpv to quit, then make sure the process is gone
    pub async fn shutdown(mut self) -> Result<(), PlayerError> {
        if let Err(e) = self.client.command(vec![json!("quit")]).await {
            debug!("mpv quit command failed: {}", e);
        }

        match tokio::time::timeout(Duration::from_secs(2), self.child.wait()).await {
            Ok(status) => {
                debug!("mpv exited with {:?}", status?);
            }
            Err(_) => {
                warn!("mpv did not quit in time, killing it");
                self.child.kill().await?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Player for MpvProcess {
    async fn seek(&self, seconds: f64) -> Result<(), PlayerError> {
        self.client.seek(seconds).await
    }

    async fn load_file(&self, path: &Path) -> Result<(), PlayerError> {
        self.client.load_file(path).await
    }
}

// @forwards: Child output lines to the logger
async fn forward_output<R: AsyncRead + Unpin>(reader: R, is_stderr: bool) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if is_stderr {
            warn!("mpv: {}", line);
        } else {
            debug!("mpv: {}", line);
        }
    }
}
