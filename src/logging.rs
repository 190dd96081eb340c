//! Tracing subscriber setup for binaries and ad-hoc test runs.

use tracing::Level;

use crate::config::LoggingConfig;

/// Parse a level name, falling back to `INFO` for anything unrecognized.
pub fn parse_level(level: &str) -> Level {
    level.trim().parse().unwrap_or(Level::INFO)
}

/// Install a stderr fmt subscriber at the configured level.
///
/// Returns `false` when a global subscriber is already installed, which is
/// the normal case when several tests initialize logging.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(parse_level(&config.level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level(" WARN "), Level::WARN);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }

    #[test]
    fn second_init_is_harmless() {
        let config = LoggingConfig::default();
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
