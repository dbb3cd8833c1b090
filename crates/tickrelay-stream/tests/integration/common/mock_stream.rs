//! In-process WebSocket stub for streaming tests.
//!
//! Accepts real WebSocket connections on an ephemeral port, records the
//! handshake URI and every text frame a client sends, and plays a scripted
//! set of frames back once enough client frames have arrived.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

type ServerSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// What the stub sends once a client has delivered `send_after` frames.
#[derive(Debug, Clone, Default)]
pub struct ServerScript {
    /// Number of client frames to wait for before replying.
    pub send_after: usize,
    /// Frames pushed to the client, in order.
    pub frames: Vec<String>,
    /// Close the connection from the server side after the frames went out.
    pub close_after_send: bool,
}

/// Minimal WebSocket server for exercising provider connections.
pub struct MockStreamServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::UnboundedSender<()>,
    received: Arc<Mutex<Vec<String>>>,
    request_uris: Arc<Mutex<Vec<String>>>,
    connections: Arc<AtomicUsize>,
}

impl MockStreamServer {
    /// Bind on an ephemeral port and start accepting connections.
    ///
    /// Every accepted connection is served with the same script.
    pub async fn start(script: ServerScript) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock stream server");
        let addr = listener.local_addr().expect("mock server address");

        let (shutdown_tx, mut shutdown_rx) = mpsc::unbounded_channel();
        let received = Arc::new(Mutex::new(Vec::new()));
        let request_uris = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));

        let server_received = received.clone();
        let server_uris = request_uris.clone();
        let server_connections = connections.clone();
        let server_script = Arc::new(script);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    accepted = listener.accept() => {
                        let Ok((stream, _)) = accepted else { break };
                        server_connections.fetch_add(1, Ordering::SeqCst);
                        let received = server_received.clone();
                        let uris = server_uris.clone();
                        let script = server_script.clone();
                        tokio::spawn(async move {
                            handle_connection(stream, received, uris, script).await;
                        });
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            received,
            request_uris,
            connections,
        }
    }

    /// ws:// URL of the stub.
    pub fn url(&self) -> String {
        format!("ws://{}/", self.addr)
    }

    /// Text frames received from clients so far.
    pub fn received_messages(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    /// Handshake request URIs seen so far.
    pub fn request_uris(&self) -> Vec<String> {
        self.request_uris.lock().clone()
    }

    /// Number of connections accepted so far.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Stop accepting new connections.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

async fn handle_connection(
    stream: TcpStream,
    received: Arc<Mutex<Vec<String>>>,
    uris: Arc<Mutex<Vec<String>>>,
    script: Arc<ServerScript>,
) {
    let callback = {
        let uris = uris.clone();
        move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            uris.lock().push(request.uri().to_string());
            Ok(response)
        }
    };

    let ws_stream = match accept_hdr_async(stream, callback).await {
        Ok(ws_stream) => ws_stream,
        Err(_) => return,
    };
    let (mut sink, mut source) = ws_stream.split();

    let mut seen = 0usize;
    let mut played = false;

    if script.send_after == 0 {
        play_script(&mut sink, &script).await;
        played = true;
    }

    while let Some(Ok(message)) = source.next().await {
        match message {
            Message::Text(text) => {
                received.lock().push(text);
                seen += 1;
            }
            Message::Ping(payload) => {
                let _ = sink.send(Message::Pong(payload)).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
        if !played && seen >= script.send_after {
            play_script(&mut sink, &script).await;
            played = true;
        }
    }
}

async fn play_script(sink: &mut ServerSink, script: &ServerScript) {
    for frame in &script.frames {
        let _ = sink.send(Message::Text(frame.clone())).await;
    }
    if script.close_after_send {
        let _ = sink.send(Message::Close(None)).await;
    }
}
