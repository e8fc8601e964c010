use super::types::{RemuxConfig, FFMPEG_LOG_LEVELS};
use super::ConfigError;

/// Validate configuration
/// Currently validates:
/// - Timeout is not 0
/// - Binary paths are not empty
/// - Log level is one ffmpeg understands
pub fn validate_config(config: &RemuxConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "ffmpeg_path cannot be empty".to_string(),
        ));
    }

    if config.ffprobe_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "ffprobe_path cannot be empty".to_string(),
        ));
    }

    if !FFMPEG_LOG_LEVELS.contains(&config.ffmpeg_log_level.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "unknown ffmpeg_log_level '{}'",
            config.ffmpeg_log_level
        )));
    }

    Ok(())
}
