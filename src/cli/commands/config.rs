use clap::Args;

/// Logging options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", env = "TUNEKIT_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log filter directives
    #[arg(long = "log-filter", env = "TUNEKIT_LOG_FILTER", global = true)]
    pub log_filter: Option<String>,
}

impl LoggingConfig {
    pub fn get_effective_level(&self) -> &str {
        match (self.verbose, self.log_level.as_deref()) {
            (v, _) if v >= 2 => "trace",
            (1, _) => "debug",
            (0, Some(level)) => level,
            _ => "info",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_level() {
        let mut logging = LoggingConfig::default();
        assert_eq!(logging.get_effective_level(), "info");

        logging.log_level = Some("warn".into());
        assert_eq!(logging.get_effective_level(), "warn");

        logging.verbose = 1;
        assert_eq!(logging.get_effective_level(), "debug");

        logging.verbose = 3;
        assert_eq!(logging.get_effective_level(), "trace");
    }
}
