//! Streaming session against one data provider.
//!
//! A [`ProviderConnection`] owns a single WebSocket session: it connects
//! with the session token in the URL, sends one subscription per instrument
//! and then applies incoming last-trade updates to the shared store until
//! the server closes, the transport fails or shutdown is requested. There
//! is no reconnect at this level; the manager restarts the whole batch with
//! a fresh token and instrument list.

use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tickrelay_core::PriceQuote;
use tickrelay_store::AssetStore;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async_tls_with_config, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::StreamResult;
use crate::message::{SubscribeRequest, TickFrame, L1_UPDATE};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Lifecycle phase of a provider connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// TCP/TLS and WebSocket handshake in progress.
    Connecting,
    /// Connected, subscription frames going out.
    Subscribing,
    /// Subscriptions sent, applying incoming updates.
    Streaming,
    /// Session winding down, close frame going out.
    Closing,
    /// Session over. Terminal.
    Terminated,
}

/// One WebSocket session streaming last-trade updates for a single provider.
pub struct ProviderConnection {
    ws_url: String,
    token: String,
    provider: String,
    instrument_ids: Vec<String>,
    store: Arc<dyn AssetStore>,
    phase: Arc<RwLock<ConnectionPhase>>,
    shutdown: CancellationToken,
}

impl ProviderConnection {
    /// Create a connection for one provider partition.
    ///
    /// `ws_url` is the bare endpoint; the session token is appended as a
    /// query parameter at connect time.
    pub fn new(
        ws_url: impl Into<String>,
        token: impl Into<String>,
        provider: impl Into<String>,
        instrument_ids: Vec<String>,
        store: Arc<dyn AssetStore>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            ws_url: ws_url.into(),
            token: token.into(),
            provider: provider.into(),
            instrument_ids,
            store,
            phase: Arc::new(RwLock::new(ConnectionPhase::Connecting)),
            shutdown,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> ConnectionPhase {
        *self.phase.read()
    }

    fn set_phase(&self, phase: ConnectionPhase) {
        *self.phase.write() = phase;
        debug!(provider = %self.provider, ?phase, "Connection phase changed");
    }

    /// Run the session to completion.
    ///
    /// Returns `Ok(())` when the stream ended in an orderly way (server
    /// close, stream end or shutdown) and an error when the handshake or
    /// the transport failed. A close frame goes out on every exit path
    /// that reached the socket.
    pub async fn run(&self) -> StreamResult<()> {
        self.set_phase(ConnectionPhase::Connecting);
        let url = format!("{}?token={}", self.ws_url, self.token);
        info!(
            provider = %self.provider,
            instruments = self.instrument_ids.len(),
            "Connecting provider stream"
        );

        let (ws_stream, _response) =
            match connect_async_tls_with_config(&url, None, true, None).await {
                Ok(connected) => connected,
                Err(e) => {
                    error!(provider = %self.provider, error = %e, "WebSocket connection failed");
                    self.set_phase(ConnectionPhase::Terminated);
                    return Err(e.into());
                }
            };

        let (mut sink, mut source) = ws_stream.split();
        let outcome = self.subscribe_and_stream(&mut sink, &mut source).await;

        self.set_phase(ConnectionPhase::Closing);
        if let Err(e) = sink.send(Message::Close(None)).await {
            debug!(provider = %self.provider, error = %e, "Close frame not delivered");
        }
        self.set_phase(ConnectionPhase::Terminated);

        match &outcome {
            Ok(()) => info!(provider = %self.provider, "Provider stream ended"),
            Err(e) => warn!(provider = %self.provider, error = %e, "Provider stream failed"),
        }
        outcome
    }

    async fn subscribe_and_stream(
        &self,
        sink: &mut WsSink,
        source: &mut WsSource,
    ) -> StreamResult<()> {
        self.set_phase(ConnectionPhase::Subscribing);
        let mut subscribed = 0usize;
        for instrument_id in &self.instrument_ids {
            let request = SubscribeRequest::last_trade(instrument_id.clone(), self.provider.clone());
            let frame = serde_json::to_string(&request)?;
            match sink.send(Message::Text(frame)).await {
                Ok(()) => subscribed += 1,
                Err(e) => warn!(
                    provider = %self.provider,
                    instrument_id = %instrument_id,
                    error = %e,
                    "Subscription send failed, instrument skipped"
                ),
            }
        }
        info!(
            provider = %self.provider,
            subscribed,
            requested = self.instrument_ids.len(),
            "Subscriptions sent"
        );

        self.set_phase(ConnectionPhase::Streaming);
        loop {
            tokio::select! {
                () = self.shutdown.cancelled() => {
                    info!(provider = %self.provider, "Shutdown requested, leaving stream");
                    return Ok(());
                }
                message = source.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => self.handle_frame(&text),
                        Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                            Ok(text) => self.handle_frame(&text),
                            Err(_) => warn!(provider = %self.provider, "Discarding non-UTF-8 binary frame"),
                        },
                        Some(Ok(Message::Ping(payload))) => sink.send(Message::Pong(payload)).await?,
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (u16::from(f.code), f.reason.to_string()))
                                .unwrap_or((1000, String::new()));
                            info!(provider = %self.provider, code, reason = %reason, "Server closed the stream");
                            return Ok(());
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            error!(provider = %self.provider, error = %e, "WebSocket read error");
                            return Err(e.into());
                        }
                        None => {
                            warn!(provider = %self.provider, "WebSocket stream ended without close");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Apply one text frame to the store.
    ///
    /// Malformed or unexpected frames are logged and dropped; nothing that
    /// arrives here ends the session.
    fn handle_frame(&self, text: &str) {
        let frame: TickFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(provider = %self.provider, error = %e, "Discarding malformed frame");
                return;
            }
        };

        if frame.frame_type != L1_UPDATE {
            debug!(provider = %self.provider, frame_type = %frame.frame_type, "Ignoring non-price frame");
            return;
        }
        let Some(last) = frame.last else {
            debug!(
                provider = %self.provider,
                instrument_id = %frame.instrument_id,
                "l1 update without last payload"
            );
            return;
        };

        let quote = PriceQuote::from(last);
        if self.store.apply_quote(&frame.instrument_id, &quote) {
            debug!(
                provider = %self.provider,
                instrument_id = %frame.instrument_id,
                price = %quote.price,
                "Applied last-trade update"
            );
        } else {
            warn!(
                provider = %self.provider,
                instrument_id = %frame.instrument_id,
                "Update for unknown instrument discarded"
            );
        }
    }
}
