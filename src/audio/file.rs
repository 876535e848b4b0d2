use anyhow::{Context, Result};
use hound::WavReader;
use std::path::{Path, PathBuf};
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info};

/// Playable length and format of an audio file on disk
#[derive(Debug, Clone)]
pub struct AudioFile {
    pub path: PathBuf,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioFile {
    /// Persist synthesized audio bytes, creating parent directories
    pub fn write(path: impl AsRef<Path>, bytes: &[u8]) -> Result<PathBuf> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write audio to {}", path.display()))?;

        info!("Wrote {} bytes of audio to {}", bytes.len(), path.display());
        Ok(path.to_path_buf())
    }

    /// Measure the real duration of an audio file
    pub fn probe(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Probing audio file: {}", path.display());

        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));

        let audio = if is_wav {
            Self::probe_wav(path)?
        } else {
            Self::probe_container(path)?
        };

        info!(
            "Audio file probed: {:.3}s, {}Hz, {} channels",
            audio.duration_seconds, audio.sample_rate, audio.channels
        );

        Ok(audio)
    }

    fn probe_wav(path: &Path) -> Result<Self> {
        let reader = WavReader::open(path).context("Failed to open WAV file")?;

        let spec = reader.spec();
        // duration() counts frames, i.e. samples per channel
        let frames = reader.duration();

        Ok(Self {
            path: path.to_path_buf(),
            duration_seconds: frames as f64 / spec.sample_rate as f64,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }

    fn probe_container(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open audio file {}", path.display()))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .context("Unsupported or corrupt audio container")?;

        let mut format = probed.format;
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .context("No audio track found")?;

        let track_id = track.id;
        let params = track.codec_params.clone();
        let sample_rate = params.sample_rate.context("Audio track has no sample rate")?;
        let channels = params.channels.map(|c| c.count() as u16).unwrap_or(1);

        let duration_seconds = match params.n_frames {
            Some(frames) => frames as f64 / sample_rate as f64,
            None => {
                // Streams without a frame count: sum packet durations
                debug!("No frame count in container header, scanning packets");
                let mut total = 0u64;
                loop {
                    match format.next_packet() {
                        Ok(packet) if packet.track_id() == track_id => total += packet.dur,
                        Ok(_) => {}
                        Err(SymphoniaError::IoError(e))
                            if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                        {
                            break
                        }
                        Err(e) => return Err(e).context("Failed to read audio packets"),
                    }
                }

                match params.time_base {
                    Some(tb) => {
                        let time = tb.calc_time(total);
                        time.seconds as f64 + time.frac
                    }
                    None => total as f64 / sample_rate as f64,
                }
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            duration_seconds,
            sample_rate,
            channels,
        })
    }
}
