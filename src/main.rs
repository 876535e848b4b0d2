use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use narration_sync::timing::{split_sentences, to_srt, MappingPolicy};
use narration_sync::{generate_audio, subtitle_timestamps, AlignmentJob, Config, SynthesisEvent};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "narration-sync", version, about = "Synthesize narration and time captions against it")]
struct Cli {
    /// Config file (extension optional)
    #[arg(long, default_value = "config/narration-sync")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Synthesize a script; one voice sentence per non-empty line
    Synthesize {
        #[arg(long)]
        script: PathBuf,

        /// Output audio file (default: <output dir>/narration-<timestamp>.<encoding>)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Split lines further at sentence punctuation
        #[arg(long)]
        split: bool,
    },

    /// Time display captions against a synthesized audio file
    Align {
        /// JSON file with voice_sentences, display_segments and mapping
        #[arg(long)]
        job: PathBuf,

        #[arg(long)]
        audio: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Write here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Fail on voice indices out of range instead of skipping them
        #[arg(long)]
        strict_mapping: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Srt,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Synthesize { script, output, split } => {
            let cfg = Config::load(&cli.config)?;
            info!("Loaded config, voice {}", cfg.tts.voice_type);

            let raw = std::fs::read_to_string(&script)
                .with_context(|| format!("Failed to read script {}", script.display()))?;
            let lines = raw.lines().map(str::trim).filter(|l| !l.is_empty());
            let sentences: Vec<String> = if split {
                lines.flat_map(split_sentences).collect()
            } else {
                lines.map(str::to_string).collect()
            };

            let output = output.unwrap_or_else(|| {
                cfg.output.directory.join(format!(
                    "narration-{}.{}",
                    chrono::Local::now().format("%Y%m%d-%H%M%S"),
                    cfg.tts.encoding
                ))
            });

            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling synthesis");
                    ctrl_c.cancel();
                }
            });

            let (tx, mut rx) = mpsc::unbounded_channel();
            let progress = tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    match event {
                        SynthesisEvent::AudioChunk { index, total_bytes, .. } if index % 10 == 0 => {
                            info!("Received {} audio chunks ({} bytes)", index + 1, total_bytes);
                        }
                        other => debug!("{:?}", other),
                    }
                }
            });

            let path = generate_audio(&sentences, &cfg.tts, output, cancel, Some(tx)).await?;
            let _ = progress.await;

            println!("{}", path.display());
        }

        Command::Align {
            job,
            audio,
            format,
            output,
            strict_mapping,
        } => {
            let job = AlignmentJob::load(&job)?;
            let policy = if strict_mapping {
                MappingPolicy::Strict
            } else {
                MappingPolicy::Lenient
            };

            let timestamps = subtitle_timestamps(&job, &audio, policy)?;

            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&timestamps)?,
                OutputFormat::Srt => to_srt(&timestamps),
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote {} timestamps to {}", timestamps.len(), path.display());
                }
                None => println!("{}", rendered),
            }
        }
    }

    Ok(())
}
