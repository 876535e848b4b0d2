use super::error::SynthesisError;
use super::events::SynthesisEvent;
use super::request::SynthesisRequest;
use super::transport::{FrameTransport, WebSocketTransport};
use crate::config::{TtsConfig, TtsCredentials, VoiceConfig};
use crate::protocol::{decode, encode, Message, MessageType};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// One synthesis request over one connection
///
/// `synthesize` consumes the session, so a connection never carries more than
/// one request. The transport is closed on return, success or failure.
pub struct SynthesisSession<T: FrameTransport = WebSocketTransport> {
    transport: T,
    credentials: TtsCredentials,
    voice: VoiceConfig,
    read_timeout: Duration,
    cancel: CancellationToken,
    events: Option<mpsc::UnboundedSender<SynthesisEvent>>,
}

fn check_credentials(credentials: &TtsCredentials) -> Result<(), SynthesisError> {
    if credentials.app_id.trim().is_empty() {
        return Err(SynthesisError::MissingCredentials("app_id"));
    }
    if credentials.access_token.trim().is_empty() {
        return Err(SynthesisError::MissingCredentials("access_token"));
    }
    Ok(())
}

impl SynthesisSession<WebSocketTransport> {
    /// Open a WebSocket connection to the configured endpoint
    ///
    /// Cancelling `cancel` aborts the handshake and any later receive.
    pub async fn connect(config: &TtsConfig, cancel: CancellationToken) -> Result<Self, SynthesisError> {
        let credentials = config.credentials();
        check_credentials(&credentials)?;

        let transport = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SynthesisError::Cancelled),
            connected = WebSocketTransport::connect(&credentials, config.read_timeout()) => connected?,
        };

        let session = Self::from_parts(transport, credentials, config.voice(), config.read_timeout())
            .with_cancellation(cancel);
        Ok(session)
    }
}

impl<T: FrameTransport> SynthesisSession<T> {
    /// Wrap an already-open transport
    pub fn with_transport(transport: T, config: &TtsConfig) -> Result<Self, SynthesisError> {
        let credentials = config.credentials();
        check_credentials(&credentials)?;
        Ok(Self::from_parts(transport, credentials, config.voice(), config.read_timeout()))
    }

    fn from_parts(
        transport: T,
        credentials: TtsCredentials,
        voice: VoiceConfig,
        read_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            credentials,
            voice,
            read_timeout,
            cancel: CancellationToken::new(),
            events: None,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Subscribe to progress events; a dropped receiver is ignored
    pub fn with_events(mut self, events: mpsc::UnboundedSender<SynthesisEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Synthesize `text` and return the assembled audio bytes
    pub async fn synthesize(mut self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let result = self.run(text).await;

        if let Err(e) = self.transport.close().await {
            warn!("Failed to close TTS connection: {}", e);
        }

        match &result {
            Ok(audio) => info!("Synthesis complete: {} bytes of audio", audio.len()),
            Err(e) => error!("Synthesis failed: {}", e),
        }

        result
    }

    async fn run(&mut self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        // The transport is open by construction
        self.emit(SynthesisEvent::Connected);

        let request = SynthesisRequest::submit(text, &self.credentials, &self.voice);
        let frame = encode(&Message::new(
            MessageType::FullClientRequest,
            request.to_payload()?,
        ))?;
        let write_timeout = self.read_timeout;

        info!(
            "Submitting synthesis request {} (voice={}, cluster={}, chars={})",
            request.request_id(),
            self.voice.voice_type,
            request.app.cluster,
            text.chars().count()
        );

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(SynthesisError::Cancelled),
            sent = tokio::time::timeout(write_timeout, self.transport.send(frame)) => {
                sent.map_err(|_| SynthesisError::Timeout(write_timeout))??
            }
        }

        self.emit(SynthesisEvent::RequestSent {
            request_id: request.request_id().to_string(),
        });

        let mut audio = Vec::new();
        let mut chunks = 0usize;

        loop {
            let message = decode(&self.next_frame().await?)?;

            match message.message_type {
                MessageType::FrontEndResultServer => {
                    debug!("Discarding front-end result ({} bytes)", message.payload.len());
                    self.emit(SynthesisEvent::Metadata {
                        bytes: message.payload.len(),
                    });
                }
                MessageType::AudioOnlyServer => {
                    audio.extend_from_slice(&message.payload);
                    debug!(
                        "Audio chunk {} (seq={}, bytes={}, total={})",
                        chunks,
                        message.sequence,
                        message.payload.len(),
                        audio.len()
                    );
                    self.emit(SynthesisEvent::AudioChunk {
                        index: chunks,
                        bytes: message.payload.len(),
                        total_bytes: audio.len(),
                    });
                    chunks += 1;
                }
                other => {
                    return Err(SynthesisError::Protocol {
                        message_type: other,
                        payload: message.payload,
                    });
                }
            }

            if message.is_final() {
                break;
            }
        }

        if audio.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }

        self.emit(SynthesisEvent::Completed {
            chunks,
            total_bytes: audio.len(),
        });

        Ok(audio)
    }

    /// Wait for the next frame, honouring cancellation and the read timeout
    ///
    /// Only the cancellation token yields `Cancelled`; a peer close is a connection failure.
    async fn next_frame(&mut self) -> Result<Vec<u8>, SynthesisError> {
        let read_timeout = self.read_timeout;

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(SynthesisError::Cancelled),
            received = tokio::time::timeout(read_timeout, self.transport.recv()) => match received {
                Err(_) => Err(SynthesisError::Timeout(read_timeout)),
                Ok(Ok(Some(frame))) => Ok(frame),
                Ok(Ok(None)) => Err(SynthesisError::Connection(
                    "connection closed before final frame".to_string(),
                )),
                Ok(Err(e)) => Err(e),
            },
        }
    }

    fn emit(&self, event: SynthesisEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}
