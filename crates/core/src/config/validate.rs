use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Every timeout is finite and non-zero
/// - Result count stays within what the provider accepts
/// - Retry budget is bounded
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    for (name, secs) in [
        ("search.timeout_secs", config.search.timeout_secs),
        ("completion.timeout_secs", config.completion.timeout_secs),
        ("http.download_timeout_secs", config.http.download_timeout_secs),
    ] {
        if secs == 0 {
            return Err(ConfigError::ValidationError(format!("{} cannot be 0", name)));
        }
    }

    if !(1..=100).contains(&config.search.num_results) {
        return Err(ConfigError::ValidationError(
            "search.num_results must be between 1 and 100".to_string(),
        ));
    }

    if config.http.max_retries > 10 {
        return Err(ConfigError::ValidationError(
            "http.max_retries cannot exceed 10".to_string(),
        ));
    }

    Ok(())
}
