use std::path::PathBuf;

/// Runtime configuration, loaded from environment variables.
pub struct Config {
    /// Frame width in pixels for the synthetic source.
    pub frame_width: u32,
    /// Frame height in pixels for the synthetic source.
    pub frame_height: u32,
    /// Milliseconds between detection ticks.
    pub tick_ms: u64,
    /// Directory captured photos fall back to when sharing is unavailable.
    pub output_dir: PathBuf,
    /// TTS command driving spoken guidance.
    pub speech_command: String,
    /// Luma threshold for the baseline brightness detector.
    pub luma_threshold: u8,
}

impl Config {
    /// Load configuration from `MIDFRAME_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let output_dir = std::env::var("MIDFRAME_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        Self {
            frame_width: env_u32("MIDFRAME_FRAME_WIDTH", 640),
            frame_height: env_u32("MIDFRAME_FRAME_HEIGHT", 480),
            tick_ms: env_u64("MIDFRAME_TICK_MS", 33),
            output_dir,
            speech_command: std::env::var("MIDFRAME_SPEECH_COMMAND")
                .unwrap_or_else(|_| "espeak-ng".to_string()),
            luma_threshold: env_u8("MIDFRAME_LUMA_THRESHOLD", 160),
        }
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u8(key: &str, default: u8) -> u8 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
