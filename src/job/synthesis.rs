use crate::audio::AudioFile;
use crate::config::TtsConfig;
use crate::tts::{SynthesisEvent, SynthesisSession};
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Synthesize the voice sentences as one request and write the audio to `output_path`
///
/// Nothing is written unless the whole stream completes.
pub async fn generate_audio<S: AsRef<str>>(
    sentences: &[S],
    config: &TtsConfig,
    output_path: impl AsRef<Path>,
    cancel: CancellationToken,
    events: Option<mpsc::UnboundedSender<SynthesisEvent>>,
) -> Result<PathBuf> {
    let script = join_script(sentences);
    if script.is_empty() {
        anyhow::bail!("Script has no text to synthesize");
    }

    info!(
        "Generating audio for {} sentences ({} chars)",
        sentences.len(),
        script.chars().count()
    );

    let mut session = SynthesisSession::connect(config, cancel)
        .await
        .context("Failed to open synthesis session")?;
    if let Some(events) = events {
        session = session.with_events(events);
    }

    let audio = session.synthesize(&script).await.context("Synthesis failed")?;

    AudioFile::write(output_path, &audio)
}

/// Blocking variant of `generate_audio`
///
/// Runs on a dedicated worker thread with its own runtime, so it is safe to call
/// from code that is itself driven by an async executor.
pub fn generate_audio_blocking(
    sentences: Vec<String>,
    config: TtsConfig,
    output_path: PathBuf,
) -> Result<PathBuf> {
    let worker = std::thread::Builder::new()
        .name("tts-synthesis".to_string())
        .spawn(move || -> Result<PathBuf> {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to build synthesis runtime")?;

            runtime.block_on(generate_audio(
                &sentences,
                &config,
                output_path,
                CancellationToken::new(),
                None,
            ))
        })
        .context("Failed to spawn synthesis worker")?;

    worker
        .join()
        .map_err(|_| anyhow!("Synthesis worker panicked"))?
}

/// Join sentences into one request text; ASCII-ending sentences get a separating space
fn join_script<S: AsRef<str>>(sentences: &[S]) -> String {
    let mut script = String::new();

    for sentence in sentences.iter().map(|s| s.as_ref().trim()).filter(|s| !s.is_empty()) {
        if script.chars().last().is_some_and(|c| c.is_ascii()) {
            script.push(' ');
        }
        script.push_str(sentence);
    }

    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_script() {
        assert_eq!(join_script(&["你好。", "世界。"]), "你好。世界。");
        assert_eq!(join_script(&["Hello.", "你好。", " ", "World."]), "Hello. 你好。World.");
        assert_eq!(join_script::<&str>(&[]), "");
    }
}
