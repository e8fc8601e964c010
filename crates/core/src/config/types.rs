use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Log levels accepted by ffmpeg's `-loglevel` flag.
pub const FFMPEG_LOG_LEVELS: &[&str] = &[
    "quiet", "panic", "fatal", "error", "warning", "info", "verbose", "debug", "trace",
];

/// Configuration shared by the probe adapter, the planner and the writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemuxConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Pass `-y` so ffmpeg never stops to ask before writing.
    #[serde(default = "default_true")]
    pub overwrite: bool,

    /// Timeout for a single encoder run in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Additional global ffmpeg arguments, placed before the inputs.
    #[serde(default)]
    pub extra_ffmpeg_args: Vec<String>,

    /// Input extensions whose timestamps must be regenerated (`-fflags +genpts`).
    #[serde(default = "default_regenerate_pts_extensions")]
    pub regenerate_pts_extensions: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_log_level() -> String {
    "error".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}

fn default_regenerate_pts_extensions() -> Vec<String> {
    vec!["avi".to_string()]
}

impl Default for RemuxConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            ffmpeg_log_level: default_log_level(),
            overwrite: true,
            timeout_secs: default_timeout(),
            extra_ffmpeg_args: Vec::new(),
            regenerate_pts_extensions: default_regenerate_pts_extensions(),
        }
    }
}

impl RemuxConfig {
    /// Creates a new config with custom ffmpeg/ffprobe paths.
    pub fn with_paths(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            ..Default::default()
        }
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the ffmpeg log level.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.ffmpeg_log_level = level.into();
        self
    }

    /// Whether inputs with this extension need regenerated timestamps.
    pub fn needs_regenerated_pts(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.');
        self.regenerate_pts_extensions
            .iter()
            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }

    /// Global ffmpeg flags that precede every input clause.
    pub fn global_ffmpeg_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.overwrite {
            args.push("-y".to_string());
        }
        args.extend(["-loglevel".to_string(), self.ffmpeg_log_level.clone()]);
        args.extend(self.extra_ffmpeg_args.iter().cloned());
        args
    }
}
