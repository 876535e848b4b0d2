// Integration tests for the synthesis session
//
// A scripted in-memory transport stands in for the WebSocket so the receive
// loop can be driven frame by frame.

use narration_sync::config::TtsConfig;
use narration_sync::protocol::{decode, encode, Message, MessageType};
use narration_sync::tts::{FrameTransport, SynthesisError, SynthesisEvent, SynthesisSession};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

type Inbound = Result<Option<Vec<u8>>, SynthesisError>;

#[derive(Default, Clone)]
struct Wire {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    closed: Arc<AtomicBool>,
}

/// Replays scripted frames; once the script runs out, `recv` never resolves
struct ScriptedTransport {
    inbound: VecDeque<Inbound>,
    wire: Wire,
    stall_send: bool,
}

impl ScriptedTransport {
    fn new(frames: Vec<Inbound>) -> (Self, Wire) {
        let wire = Wire::default();
        let transport = Self {
            inbound: frames.into(),
            wire: wire.clone(),
            stall_send: false,
        };
        (transport, wire)
    }
}

#[async_trait::async_trait]
impl FrameTransport for ScriptedTransport {
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), SynthesisError> {
        if self.stall_send {
            std::future::pending::<()>().await;
        }
        self.wire.sent.lock().unwrap().push(frame);
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Vec<u8>>, SynthesisError> {
        match self.inbound.pop_front() {
            Some(next) => next,
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<(), SynthesisError> {
        self.wire.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn test_config() -> TtsConfig {
    TtsConfig {
        endpoint: "wss://tts.example.invalid/ws".to_string(),
        app_id: "app-123".to_string(),
        access_token: "token-abc".to_string(),
        voice_type: "BV700_streaming".to_string(),
        encoding: "mp3".to_string(),
        speed_ratio: 1.0,
        volume_ratio: 1.0,
        pitch_ratio: 1.0,
        read_timeout_secs: 5,
    }
}

fn audio(seq: i32, bytes: &[u8]) -> Inbound {
    Ok(Some(encode(&Message::sequenced(
        MessageType::AudioOnlyServer,
        seq,
        bytes.to_vec(),
    ))
    .unwrap()))
}

fn front_end(payload: &str) -> Inbound {
    Ok(Some(encode(&Message::new(
        MessageType::FrontEndResultServer,
        payload.as_bytes().to_vec(),
    ))
    .unwrap()))
}

fn server_error(payload: &str) -> Inbound {
    Ok(Some(encode(&Message::new(
        MessageType::Error,
        payload.as_bytes().to_vec(),
    ))
    .unwrap()))
}

fn session(frames: Vec<Inbound>) -> (SynthesisSession<ScriptedTransport>, Wire) {
    let (transport, wire) = ScriptedTransport::new(frames);
    let session = SynthesisSession::with_transport(transport, &test_config()).unwrap();
    (session, wire)
}

#[tokio::test]
async fn test_assembles_audio_until_negative_sequence() {
    let (session, wire) = session(vec![
        front_end(r#"{"phonemes":[]}"#),
        audio(1, b"ab"),
        audio(2, b"cd"),
        audio(-3, b"ef"),
        // Never read: the stream ended at the negative sequence
        server_error("late"),
    ]);

    let bytes = session.synthesize("你好世界。").await.unwrap();

    assert_eq!(bytes, b"abcdef");
    assert!(wire.closed.load(Ordering::SeqCst), "Connection should be closed on return");
}

#[tokio::test]
async fn test_sends_single_full_client_request() {
    let (session, wire) = session(vec![audio(-1, b"x")]);

    session.synthesize("Hello there friend.").await.unwrap();

    let sent = wire.sent.lock().unwrap();
    assert_eq!(sent.len(), 1, "Exactly one request per connection");

    let request = decode(&sent[0]).unwrap();
    assert_eq!(request.message_type, MessageType::FullClientRequest);
    assert!(!request.flag.is_sequenced());

    let json: serde_json::Value = serde_json::from_slice(&request.payload).unwrap();
    assert_eq!(json["app"]["appid"], "app-123");
    assert_eq!(json["app"]["token"], "token-abc");
    assert_eq!(json["app"]["cluster"], "volcano_tts");
    assert_eq!(json["audio"]["voice_type"], "BV700_streaming");
    assert_eq!(json["audio"]["encoding"], "mp3");
    assert_eq!(json["request"]["text"], "Hello there friend.");
    assert_eq!(json["request"]["operation"], "submit");
    assert!(!json["request"]["reqid"].as_str().unwrap().is_empty());
    assert!(!json["user"]["uid"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_terminates_after_many_chunks() {
    let mut frames: Vec<Inbound> = (1..=50).map(|seq| audio(seq, &[seq as u8])).collect();
    frames.push(audio(-1, &[0xFF]));

    let bytes = session(frames).0.synthesize("long text").await.unwrap();

    assert_eq!(bytes.len(), 51);
    assert_eq!(bytes[50], 0xFF);
}

#[tokio::test]
async fn test_error_after_two_chunks_returns_no_audio() {
    let (session, wire) = session(vec![
        audio(1, b"chunk-1"),
        audio(2, b"chunk-2"),
        server_error(r#"{"code":3001,"message":"invalid voice"}"#),
    ]);

    let err = session.synthesize("text").await.unwrap_err();

    match err {
        SynthesisError::Protocol {
            message_type,
            payload,
        } => {
            assert_eq!(message_type, MessageType::Error);
            assert!(String::from_utf8_lossy(&payload).contains("invalid voice"));
        }
        other => panic!("Expected protocol error, got {:?}", other),
    }
    assert!(wire.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_unexpected_message_type_is_protocol_error() {
    let frame = Ok(Some(encode(&Message::new(
        MessageType::FullServerResponse,
        b"{}".to_vec(),
    ))
    .unwrap()));

    let err = session(vec![frame]).0.synthesize("text").await.unwrap_err();

    assert!(matches!(
        err,
        SynthesisError::Protocol {
            message_type: MessageType::FullServerResponse,
            ..
        }
    ));
}

#[tokio::test]
async fn test_final_frame_without_audio_is_empty_audio() {
    let err = session(vec![front_end("{}"), audio(-1, b"")])
        .0
        .synthesize("text")
        .await
        .unwrap_err();

    assert!(matches!(err, SynthesisError::EmptyAudio));
}

#[tokio::test]
async fn test_malformed_frame() {
    let err = session(vec![Ok(Some(vec![0x11, 0xB1]))])
        .0
        .synthesize("text")
        .await
        .unwrap_err();

    assert!(matches!(err, SynthesisError::MalformedFrame(_)));
}

#[tokio::test]
async fn test_transport_failure_is_connection_error() {
    let err = session(vec![
        audio(1, b"ab"),
        Err(SynthesisError::Connection("reset by peer".to_string())),
    ])
    .0
    .synthesize("text")
    .await
    .unwrap_err();

    assert!(matches!(err, SynthesisError::Connection(_)));
}

#[tokio::test]
async fn test_peer_close_before_final_frame_is_connection_error() {
    let cancel = CancellationToken::new();
    let (session, _wire) = session(vec![audio(1, b"ab"), Ok(None)]);

    let err = session
        .with_cancellation(cancel.clone())
        .synthesize("text")
        .await
        .unwrap_err();

    assert!(!cancel.is_cancelled());
    match err {
        SynthesisError::Connection(reason) => assert!(reason.contains("closed before final frame")),
        other => panic!("Expected connection error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_caller_cancellation_during_receive() {
    let cancel = CancellationToken::new();
    let (session, wire) = session(vec![audio(1, b"ab")]);
    let session = session.with_cancellation(cancel.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });

    let err = session.synthesize("text").await.unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, SynthesisError::Cancelled));
    assert!(wire.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_read_timeout() {
    let mut config = test_config();
    config.read_timeout_secs = 0;

    let (transport, _wire) = ScriptedTransport::new(vec![]);
    let session = SynthesisSession::with_transport(transport, &config).unwrap();

    let err = session.synthesize("text").await.unwrap_err();

    assert!(matches!(err, SynthesisError::Timeout(_)));
}

#[tokio::test]
async fn test_stalled_request_write_times_out() {
    let mut config = test_config();
    config.read_timeout_secs = 0;

    let (mut transport, wire) = ScriptedTransport::new(vec![audio(-1, b"never read")]);
    transport.stall_send = true;
    let session = SynthesisSession::with_transport(transport, &config).unwrap();

    let err = session.synthesize("text").await.unwrap_err();

    assert!(matches!(err, SynthesisError::Timeout(_)));
    assert!(wire.sent.lock().unwrap().is_empty());
    assert!(wire.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_missing_credentials() {
    let mut config = test_config();
    config.access_token = "  ".to_string();

    let (transport, _wire) = ScriptedTransport::new(vec![]);
    let result = SynthesisSession::with_transport(transport, &config);

    assert!(matches!(
        result,
        Err(SynthesisError::MissingCredentials("access_token"))
    ));

    config.access_token = "token".to_string();
    config.app_id = String::new();
    let (transport, _wire) = ScriptedTransport::new(vec![]);
    assert!(matches!(
        SynthesisSession::with_transport(transport, &config),
        Err(SynthesisError::MissingCredentials("app_id"))
    ));
}

#[tokio::test]
async fn test_progress_events() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (session, _wire) = session(vec![front_end("{}"), audio(1, b"abc"), audio(-2, b"de")]);

    session.with_events(tx).synthesize("text").await.unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert_eq!(events[0], SynthesisEvent::Connected);
    assert!(matches!(events[1], SynthesisEvent::RequestSent { .. }));
    assert_eq!(
        events[2..].to_vec(),
        vec![
            SynthesisEvent::Metadata { bytes: 2 },
            SynthesisEvent::AudioChunk {
                index: 0,
                bytes: 3,
                total_bytes: 3
            },
            SynthesisEvent::AudioChunk {
                index: 1,
                bytes: 2,
                total_bytes: 5
            },
            SynthesisEvent::Completed {
                chunks: 2,
                total_bytes: 5
            },
        ]
    );
}

#[tokio::test]
async fn test_connected_is_emitted_once_when_synthesis_starts() {
    let (first_tx, mut first_rx) = mpsc::unbounded_channel();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (session, _wire) = session(vec![audio(-1, b"ok")]);

    // Replacing the subscriber must not emit anything by itself
    let session = session.with_events(first_tx).with_events(tx);
    assert!(first_rx.try_recv().is_err());
    assert!(rx.try_recv().is_err());

    session.synthesize("text").await.unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert_eq!(events[0], SynthesisEvent::Connected);
    assert_eq!(
        events
            .iter()
            .filter(|e| **e == SynthesisEvent::Connected)
            .count(),
        1
    );
    assert!(first_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_dropped_event_receiver_does_not_fail() {
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);

    let bytes = session(vec![audio(-1, b"ok")])
        .0
        .with_events(tx)
        .synthesize("text")
        .await
        .unwrap();

    assert_eq!(bytes, b"ok");
}
