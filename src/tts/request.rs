use crate::config::{TtsCredentials, VoiceConfig};
use serde::{Deserialize, Serialize};

/// Cluster used for voices cloned from a user sample
pub const INSTANT_CLONING_CLUSTER: &str = "volcano_icl";

/// Cluster for every stock voice
pub const DEFAULT_CLUSTER: &str = "volcano_tts";

const CLONED_VOICE_PREFIX: &str = "S_";

/// Pick the server cluster for a voice id
pub fn cluster_for_voice(voice_type: &str) -> &'static str {
    if voice_type.starts_with(CLONED_VOICE_PREFIX) {
        INSTANT_CLONING_CLUSTER
    } else {
        DEFAULT_CLUSTER
    }
}

/// JSON control payload of a full-client-request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub app: AppSection,
    pub user: UserSection,
    pub audio: AudioSection,
    pub request: RequestSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSection {
    pub appid: String,
    pub token: String,
    pub cluster: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSection {
    pub uid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSection {
    pub voice_type: String,
    pub encoding: String,
    pub speed_ratio: f32,
    pub volume_ratio: f32,
    pub pitch_ratio: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSection {
    pub reqid: String,
    pub text: String,
    pub text_type: String,
    pub operation: String,
}

impl SynthesisRequest {
    /// Build a submit request with fresh request and user ids
    pub fn submit(text: &str, credentials: &TtsCredentials, voice: &VoiceConfig) -> Self {
        Self {
            app: AppSection {
                appid: credentials.app_id.clone(),
                token: credentials.access_token.clone(),
                cluster: cluster_for_voice(&voice.voice_type).to_string(),
            },
            user: UserSection {
                uid: uuid::Uuid::new_v4().to_string(),
            },
            audio: AudioSection {
                voice_type: voice.voice_type.clone(),
                encoding: voice.encoding.clone(),
                speed_ratio: voice.speed_ratio,
                volume_ratio: voice.volume_ratio,
                pitch_ratio: voice.pitch_ratio,
            },
            request: RequestSection {
                reqid: uuid::Uuid::new_v4().to_string(),
                text: text.to_string(),
                text_type: "plain".to_string(),
                operation: "submit".to_string(),
            },
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request.reqid
    }

    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
