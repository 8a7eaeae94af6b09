use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Segmenter clip duration is at least 1 second
/// - GIF trial ladder is non-empty and descending
/// - GIF budget, fps and width are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Segmenter validation
    if config.segmenter.max_clip_duration_secs == 0 {
        return Err(ConfigError::ValidationError(
            "segmenter.max_clip_duration_secs must be at least 1".to_string(),
        ));
    }

    // GIF validation
    if config.gif.trial_durations_secs.is_empty() {
        return Err(ConfigError::ValidationError(
            "gif.trial_durations_secs cannot be empty".to_string(),
        ));
    }
    if config
        .gif
        .trial_durations_secs
        .windows(2)
        .any(|w| w[0] <= w[1])
    {
        return Err(ConfigError::ValidationError(
            "gif.trial_durations_secs must be strictly descending".to_string(),
        ));
    }
    if config.gif.max_size_bytes == 0 || config.gif.fps == 0 || config.gif.width == 0 {
        return Err(ConfigError::ValidationError(
            "gif.max_size_bytes, gif.fps and gif.width must be non-zero".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_clip_duration_fails() {
        let mut config = Config::default();
        config.segmenter.max_clip_duration_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_ladder_fails() {
        let mut config = Config::default();
        config.gif.trial_durations_secs = vec![];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_non_descending_ladder_fails() {
        let mut config = Config::default();
        config.gif.trial_durations_secs = vec![3, 5, 1];
        assert!(validate_config(&config).is_err());
    }
}
