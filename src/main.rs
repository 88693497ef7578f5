//! RAX Filesystem Server - Entry Point
//!
//! Serves a sandboxed storage directory to WebSocket clients.

use log::{error, info};

use rax_fs_server::error::ServerError;
use rax_fs_server::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching filesystem server...");

    let server = match bind_from_config().await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            std::process::exit(1);
        }
    };

    tokio::select! {
        _ = server.start() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
        }
    }
}

async fn bind_from_config() -> Result<Server, ServerError> {
    let config = ServerConfig::load()?;
    Server::bind(config).await
}
