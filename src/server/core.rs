use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_async_with_config;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;

use crate::client::{ConnectionSession, handle_client};
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::protocol::Dispatcher;
use crate::storage::PathMapper;

pub struct Server {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    ws_config: WebSocketConfig,
}

impl Server {
    /// Provisions the storage root and binds the listener.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let storage_root = config.storage_root_path();
        std::fs::create_dir_all(&storage_root)?;
        let storage_root = storage_root.canonicalize()?;
        info!("Storage root directory: {}", storage_root.display());

        let listener = TcpListener::bind(config.listen_addr()).await?;
        info!("Server bound to {}", listener.local_addr()?);

        let mut ws_config = WebSocketConfig::default();
        ws_config.max_message_size = Some(config.max_message_size);
        ws_config.max_frame_size = Some(config.max_message_size);

        Ok(Self {
            listener,
            dispatcher: Arc::new(Dispatcher::new(PathMapper::new(storage_root))),
            ws_config,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, one task per connection.
    pub async fn start(self) {
        info!(
            "Starting RAX filesystem server on {}",
            self.local_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "unknown address".into())
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let ws_config = self.ws_config.clone();

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        handle_new_client(stream, addr, dispatcher, ws_config).await;
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Completes the WebSocket handshake and hands off to the session loop.
async fn handle_new_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    dispatcher: Arc<Dispatcher>,
    ws_config: WebSocketConfig,
) {
    let ws = match accept_async_with_config(stream, Some(ws_config)).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake with {} failed: {}", client_addr, e);
            return;
        }
    };

    info!("Client connected: {}", client_addr);
    handle_client(ws, client_addr, ConnectionSession::new(), dispatcher).await;
}
