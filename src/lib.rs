pub mod audio;
pub mod config;
pub mod job;
pub mod protocol;
pub mod timing;
pub mod tts;

pub use audio::AudioFile;
pub use config::{Config, TtsConfig, TtsCredentials, VoiceConfig};
pub use job::{generate_audio, generate_audio_blocking, subtitle_timestamps, AlignmentJob};
pub use protocol::{decode, encode, MalformedFrame, Message, MessageFlag, MessageType};
pub use timing::{estimate, split_sentences, MappingPolicy, ReconcileError, Reconciler, SubtitleTimestamp};
pub use tts::{FrameTransport, SynthesisError, SynthesisEvent, SynthesisSession};
