use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;

use midframe_core::{BrightnessDetector, FaceDetector, FrameDimensions};
use midframe_media::{FrameSource, SyntheticSource};
use midframe_speech::{NullSpeech, ProcessSpeech, SpeechSynth};

mod capture;
mod config;
mod engine;
mod session;

use capture::{Delivery, NoShare};
use config::Config;
use engine::EngineHandle;
use session::CaptureSession;

/// Terminal bell, the audible capture cue.
const CAPTURE_CUE: &str = "\x07";

#[derive(Parser)]
#[command(name = "midframe", about = "Spoken face-centering guidance for self-portraits")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a guidance session against the synthetic frame source
    Run {
        /// Disable spoken guidance
        #[arg(long)]
        quiet: bool,
    },
    /// Run speech and detection diagnostics
    Test,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Run { quiet } => run(config, quiet).await,
        Commands::Test => diagnostics(config),
    }
}

async fn run(config: Config, quiet: bool) -> Result<()> {
    let synth: Box<dyn SpeechSynth> = if quiet {
        Box::new(NullSpeech)
    } else {
        Box::new(ProcessSpeech::with_command(&config.speech_command))
    };

    let dims = FrameDimensions {
        width: config.frame_width,
        height: config.frame_height,
    };
    let session = CaptureSession::new(dims, synth);
    let source = SyntheticSource::new(config.frame_width, config.frame_height);
    let detector = BrightnessDetector::with_threshold(config.luma_threshold);

    let handle = engine::spawn_engine(
        Box::new(source),
        Some(Box::new(detector)),
        session,
        Box::new(NoShare),
        config.output_dir.clone(),
        Duration::from_millis(config.tick_ms),
    );

    println!(
        "midframe running. commands: c=capture s=save w=where r=reset d=detector status q=quit"
    );

    tokio::select! {
        result = command_loop(&handle, config.luma_threshold) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
            Ok(())
        }
    }
}

async fn command_loop(handle: &EngineHandle, luma_threshold: u8) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "c" | "capture" => match handle.capture().await {
                Ok(filename) => {
                    print!("{CAPTURE_CUE}");
                    std::io::stdout().flush()?;
                    println!("captured: {filename}");
                }
                Err(err) => println!("capture failed: {err}"),
            },
            "s" | "save" => match handle.save().await {
                Ok(Delivery::Shared) => println!("shared"),
                Ok(Delivery::Saved(path)) => println!("saved: {}", path.display()),
                Err(err) => println!("save failed: {err}"),
            },
            "r" | "reset" => match handle.reset().await {
                Ok(()) => println!("session reset"),
                Err(err) => println!("reset failed: {err}"),
            },
            "w" | "where" => {
                handle.announce_position().await?;
                let report = handle.status().await?;
                println!("{}", report.status);
            }
            "d" | "detector" => {
                handle
                    .switch_detector(Box::new(BrightnessDetector::with_threshold(luma_threshold)))
                    .await?;
                println!("detector reinstalled");
            }
            "status" => {
                let report = handle.status().await?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            "q" | "quit" => break,
            "" => {
                let report = handle.status().await?;
                println!("{}", report.status);
            }
            other => println!("unknown command: {other}"),
        }
    }
    Ok(())
}

/// Probe the speech backend and run one detection pass, reporting both.
fn diagnostics(config: Config) -> Result<()> {
    println!("speech command: {}", config.speech_command);
    let synth = ProcessSpeech::with_command(&config.speech_command);
    println!(
        "speech available: {}",
        if synth.is_available() { "yes" } else { "no" }
    );

    let mut source = SyntheticSource::new(config.frame_width, config.frame_height);
    let mut detector = BrightnessDetector::with_threshold(config.luma_threshold);
    let frame = source.next_frame()?;
    let faces = detector.detect(&frame.data, frame.width, frame.height)?;

    println!(
        "detection: {} face(s) in a {}x{} synthetic frame",
        faces.len(),
        frame.width,
        frame.height
    );
    for face in &faces {
        let (cx, cy) = face.bounds.center();
        println!(
            "  box ({:.0}, {:.0})-({:.0}, {:.0}) center ({cx:.0}, {cy:.0}) confidence {:.2}",
            face.bounds.x_min, face.bounds.y_min, face.bounds.x_max, face.bounds.y_max,
            face.confidence
        );
    }

    Ok(())
}
