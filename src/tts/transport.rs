use super::error::SynthesisError;
use crate::config::TtsCredentials;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

/// Bidirectional frame channel used by a synthesis session
///
/// Implementations:
/// - `WebSocketTransport`: binary WebSocket frames over TLS
/// - Scripted in-memory transports in tests
#[async_trait::async_trait]
pub trait FrameTransport: Send {
    /// Send one encoded frame
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), SynthesisError>;

    /// Wait for the next encoded frame
    ///
    /// Returns `None` once the peer has closed the connection.
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, SynthesisError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), SynthesisError>;
}

pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketTransport {
    /// Open a WebSocket to the TTS endpoint, presenting the bearer token in the handshake
    pub async fn connect(
        credentials: &TtsCredentials,
        handshake_timeout: Duration,
    ) -> Result<Self, SynthesisError> {
        info!("Connecting to TTS endpoint at {}", credentials.endpoint);

        let mut request = credentials
            .endpoint
            .as_str()
            .into_client_request()
            .map_err(|e| SynthesisError::Connection(format!("invalid endpoint: {}", e)))?;

        let bearer = HeaderValue::from_str(&format!("Bearer; {}", credentials.access_token))
            .map_err(|e| SynthesisError::Connection(format!("invalid access token: {}", e)))?;
        request.headers_mut().insert("Authorization", bearer);

        let (stream, response) = tokio::time::timeout(handshake_timeout, connect_async(request))
            .await
            .map_err(|_| SynthesisError::Timeout(handshake_timeout))?
            .map_err(|e| match e {
                tungstenite::Error::Http(resp) => SynthesisError::Connection(format!(
                    "handshake rejected with HTTP {}",
                    resp.status()
                )),
                other => SynthesisError::Connection(other.to_string()),
            })?;

        info!("Connected to TTS endpoint (HTTP {})", response.status());

        Ok(Self { stream })
    }
}

#[async_trait::async_trait]
impl FrameTransport for WebSocketTransport {
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), SynthesisError> {
        self.stream
            .send(Message::Binary(frame.into()))
            .await
            .map_err(|e| SynthesisError::Connection(format!("send failed: {}", e)))
    }

    async fn recv(&mut self) -> Result<Option<Vec<u8>>, SynthesisError> {
        while let Some(msg) = self.stream.next().await {
            let msg = match msg {
                Ok(m) => m,
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return Ok(None)
                }
                Err(e) => return Err(SynthesisError::Connection(format!("receive failed: {}", e))),
            };

            match msg {
                Message::Binary(data) => return Ok(Some(data.to_vec())),
                Message::Close(frame) => {
                    debug!("WebSocket closed by server: {:?}", frame);
                    return Ok(None);
                }
                // Text, ping and pong carry nothing for the binary protocol
                other => debug!("Ignoring non-binary frame ({} bytes)", other.len()),
            }
        }

        Ok(None)
    }

    async fn close(&mut self) -> Result<(), SynthesisError> {
        match self.stream.close(None).await {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                info!("Closed TTS connection");
                Ok(())
            }
            Err(e) => Err(SynthesisError::Connection(format!("close failed: {}", e))),
        }
    }
}
