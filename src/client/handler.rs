use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::client::ConnectionSession;
use crate::error::handlers::{error_to_message, handle_error};
use crate::error::{RequestError, ServerError};
use crate::protocol::{Dispatcher, Response};

/// Handles one client session over an established WebSocket.
///
/// - Reads frames one at a time; the next frame is not read until the
///   response to the current one has been sent.
/// - Runs each request on the blocking pool so slow filesystem calls only
///   stall this connection.
/// - Ends on close, end of stream, or a transport error.
pub async fn handle_client<S>(
    mut ws: WebSocketStream<S>,
    peer: SocketAddr,
    session: ConnectionSession,
    dispatcher: Arc<Dispatcher>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let session_id = session.id().to_string();
    info!("Session {} opened for {}", session_id, peer);

    while let Some(frame) = ws.next().await {
        let raw = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    let err = ServerError::from(RequestError::Malformed(
                        "binary frame is not valid UTF-8".into(),
                    ));
                    handle_error(&session_id, &err);
                    let response = Response::error(error_to_message(&err));
                    if !send_response(&mut ws, &session_id, &response).await {
                        break;
                    }
                    continue;
                }
            },
            Ok(Message::Close(frame)) => {
                info!("Session {} received close: {:?}", session_id, frame);
                continue;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => continue,
            Err(e) => {
                let err = ServerError::WebSocket { peer, source: e };
                error!("Session {}: {}", session_id, err);
                break;
            }
        };

        debug!("Received from {}: {}", session_id, raw);

        let response = run_request(&dispatcher, &session_id, raw).await;
        if !send_response(&mut ws, &session_id, &response).await {
            break;
        }
    }

    info!("Session {} closed for {}", session_id, peer);
}

async fn run_request(dispatcher: &Arc<Dispatcher>, session_id: &str, raw: String) -> Response {
    let dispatcher = Arc::clone(dispatcher);
    let id = session_id.to_string();

    match tokio::task::spawn_blocking(move || dispatcher.handle(&id, &raw)).await {
        Ok(response) => response,
        Err(e) => {
            error!("Session {}: request handler failed: {}", session_id, e);
            Response::error("Internal server error")
        }
    }
}

/// Sends a response; returns false when the connection is no longer usable.
async fn send_response<S>(ws: &mut WebSocketStream<S>, session_id: &str, response: &Response) -> bool
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match ws.send(Message::Text(response.to_json())).await {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to send response to {}: {}", session_id, e);
            false
        }
    }
}
