// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Change feed over the hosted service's realtime WebSocket.
//!
//! Each subscription owns one socket and one background task. The task
//! keeps the channel joined with periodic heartbeats, forwards change
//! frames to the subscriber, and rejoins with exponential backoff when the
//! socket drops. It leaves the channel when the handle is stopped or the
//! receiver is dropped.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use smark_core::{ChannelSpec, Frame, Inbound};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::{ChangeStream, FeedEvent, RemoteError, RemoteResult, SubscriptionHandle, FEED_CAPACITY};
use crate::credentials::Credentials;

/// Session tokens shared with the HTTP store. Read on every join, so a
/// rejoin after the store renewed the session sends the new token.
pub type SharedSession = Arc<RwLock<Option<Credentials>>>;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Reconnection policy for a dropped feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Maximum reconnection attempts before the feed gives up.
    pub max_retries: u32,
    /// Initial delay for exponential backoff (milliseconds).
    pub initial_delay_ms: u64,
    /// Maximum delay between attempts (seconds).
    pub max_delay_secs: u64,
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff {
            max_retries: 10,
            initial_delay_ms: 100,
            max_delay_secs: 30,
        }
    }
}

impl Backoff {
    /// Delay before attempt `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(20);
        let ms = self.initial_delay_ms.saturating_mul(factor);
        Duration::from_millis(ms.min(self.max_delay_secs.saturating_mul(1000)))
    }
}

/// Everything needed to open a feed socket.
#[derive(Debug, Clone)]
pub struct RealtimeSettings {
    /// Full socket URL including `apikey`, see [`websocket_url`].
    pub url: String,
    pub heartbeat: Duration,
    pub join_timeout: Duration,
    pub backoff: Backoff,
}

/// Derives the realtime socket URL from the project's base URL.
pub fn websocket_url(base_url: &str, anon_key: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    format!(
        "{base}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
        urlencoding::encode(anon_key)
    )
}

/// A joined channel on an open socket.
struct Channel {
    sink: SplitSink<Socket, Message>,
    stream: SplitStream<Socket>,
    next_ref: u64,
}

impl Channel {
    /// Connects and joins, waiting for the server to acknowledge the join.
    async fn join(
        settings: &RealtimeSettings,
        session: &SharedSession,
        spec: &ChannelSpec,
    ) -> RemoteResult<Self> {
        let access_token = session
            .read()
            .await
            .as_ref()
            .map(|c| c.access_token.clone());
        let (socket, _) = tokio_tungstenite::connect_async(settings.url.as_str())
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        let (sink, stream) = socket.split();
        let mut channel = Channel {
            sink,
            stream,
            next_ref: 0,
        };

        let join_ref = channel.next_ref();
        let join = Frame::join(spec, access_token.as_deref(), join_ref);
        channel.send(&join).await?;

        match tokio::time::timeout(settings.join_timeout, channel.await_reply(join_ref)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(RemoteError::Network(format!(
                    "join of {} timed out",
                    spec.name
                )))
            }
        }
        Ok(channel)
    }

    fn next_ref(&mut self) -> u64 {
        self.next_ref += 1;
        self.next_ref
    }

    async fn send(&mut self, frame: &Frame) -> RemoteResult<()> {
        let json = frame
            .to_json()
            .map_err(|e| RemoteError::Malformed(e.to_string()))?;
        self.sink
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))
    }

    async fn await_reply(&mut self, reference: u64) -> RemoteResult<()> {
        let expected = reference.to_string();
        while let Some(msg) = self.stream.next().await {
            let text = match msg {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => return Err(RemoteError::Closed),
                Ok(_) => continue,
                Err(e) => return Err(RemoteError::Network(e.to_string())),
            };
            let inbound = Frame::from_json(&text).and_then(Inbound::from_frame);
            match inbound {
                Ok(Inbound::Reply {
                    reference: Some(r),
                    ok,
                    message,
                }) if r == expected => {
                    return if ok {
                        Ok(())
                    } else {
                        Err(RemoteError::Rejected {
                            status: 0,
                            message: message.unwrap_or_else(|| "join refused".to_string()),
                        })
                    };
                }
                Ok(Inbound::Closed { reason }) => {
                    return Err(RemoteError::Rejected {
                        status: 0,
                        message: reason.unwrap_or_else(|| "channel closed".to_string()),
                    })
                }
                Ok(_) => continue,
                Err(e) => tracing::debug!(error = %e, "ignoring undecodable frame during join"),
            }
        }
        Err(RemoteError::Closed)
    }

    /// Leaves the channel and closes the socket. Errors are logged only.
    async fn leave(mut self, channel: &str) {
        let reference = self.next_ref();
        if let Err(e) = self.send(&Frame::leave(channel, reference)).await {
            tracing::debug!(channel, error = %e, "leave frame not delivered");
        }
        let _ = self.sink.close().await;
    }
}

/// Why a feed session stopped.
enum Exit {
    /// Handle stopped or receiver dropped.
    Released,
    /// Socket failed or the server closed the channel.
    Lost(String),
}

/// Opens a subscription and spawns its feed task.
pub(super) async fn open(
    settings: RealtimeSettings,
    session: SharedSession,
    spec: ChannelSpec,
    id: u64,
) -> RemoteResult<(SubscriptionHandle, ChangeStream)> {
    let channel = Channel::join(&settings, &session, &spec).await?;
    tracing::debug!(channel = %spec.name, "feed joined");

    let (tx, rx) = mpsc::channel(FEED_CAPACITY);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let name = spec.name.clone();
    tokio::spawn(pump(settings, session, spec, channel, tx, shutdown_rx));

    Ok((SubscriptionHandle::with_shutdown(id, name, shutdown_tx), rx))
}

async fn pump(
    settings: RealtimeSettings,
    session: SharedSession,
    spec: ChannelSpec,
    mut channel: Channel,
    tx: mpsc::Sender<FeedEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        match run(&mut channel, &tx, &mut shutdown, settings.heartbeat).await {
            Exit::Released => {
                channel.leave(&spec.name).await;
                tracing::debug!(channel = %spec.name, "feed left");
                return;
            }
            Exit::Lost(reason) => {
                tracing::warn!(channel = %spec.name, reason = %reason, "feed lost, reconnecting");
                match rejoin(&settings, &session, &spec, &tx, &mut shutdown).await {
                    Some(rejoined) => {
                        channel = rejoined;
                        if tx.send(FeedEvent::Resumed).await.is_err() {
                            channel.leave(&spec.name).await;
                            return;
                        }
                    }
                    None => return,
                }
            }
        }
    }
}

/// Forwards events until released or the socket is lost.
async fn run(
    channel: &mut Channel,
    tx: &mpsc::Sender<FeedEvent>,
    shutdown: &mut oneshot::Receiver<()>,
    heartbeat: Duration,
) -> Exit {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + heartbeat, heartbeat);
    loop {
        tokio::select! {
            _ = &mut *shutdown => return Exit::Released,
            _ = tx.closed() => return Exit::Released,
            _ = ticker.tick() => {
                let reference = channel.next_ref();
                if let Err(e) = channel.send(&Frame::heartbeat(reference)).await {
                    return Exit::Lost(e.to_string());
                }
            }
            msg = channel.stream.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => return Exit::Lost("socket closed".to_string()),
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Exit::Lost(e.to_string()),
                };
                match Frame::from_json(&text).and_then(Inbound::from_frame) {
                    Ok(Inbound::Change(event)) => {
                        tracing::trace!(kind = %event.kind, table = %event.table, "change received");
                        if tx.send(FeedEvent::Change(event)).await.is_err() {
                            return Exit::Released;
                        }
                    }
                    Ok(Inbound::Closed { reason }) => {
                        return Exit::Lost(reason.unwrap_or_else(|| "channel closed".to_string()));
                    }
                    Ok(Inbound::System { ok: false, message }) => {
                        tracing::warn!(message = message.as_deref().unwrap_or(""), "feed reported an error");
                    }
                    Ok(Inbound::Reply { ok: false, message, .. }) => {
                        tracing::debug!(message = message.as_deref().unwrap_or(""), "request refused");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::debug!(error = %e, "ignoring undecodable frame"),
                }
            }
        }
    }
}

/// Reconnects with exponential backoff. `None` when released or out of retries.
async fn rejoin(
    settings: &RealtimeSettings,
    session: &SharedSession,
    spec: &ChannelSpec,
    tx: &mpsc::Sender<FeedEvent>,
    shutdown: &mut oneshot::Receiver<()>,
) -> Option<Channel> {
    for attempt in 1..=settings.backoff.max_retries {
        tokio::select! {
            _ = &mut *shutdown => return None,
            _ = tx.closed() => return None,
            _ = tokio::time::sleep(settings.backoff.delay(attempt)) => {}
        }
        match Channel::join(settings, session, spec).await {
            Ok(channel) => {
                tracing::info!(channel = %spec.name, attempt, "feed rejoined");
                return Some(channel);
            }
            Err(e) => tracing::debug!(channel = %spec.name, attempt, error = %e, "rejoin failed"),
        }
    }
    tracing::warn!(
        channel = %spec.name,
        retries = settings.backoff.max_retries,
        "giving up on feed; live updates stopped"
    );
    None
}

#[cfg(test)]
#[path = "realtime_tests.rs"]
mod tests;
