//! Daemon configuration.
//!
//! Every setting is a CLI flag with an environment-variable fallback via
//! clap's `env` attribute. No configuration file is read: the daemon is
//! meant to be launched from a shell or a container entrypoint, not tuned
//! through a config file.

use clap::Parser;

/// Reverse-osmosis plant digital twin: Modbus TCP slave, SSE telemetry, and
/// a small REST control surface, for ICS security training.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address the Modbus TCP slave binds to.
    #[arg(long, env = "RO_MODBUS_ADDRESS", default_value = "0.0.0.0")]
    pub modbus_address: String,

    /// Port the Modbus TCP slave binds to. Falls back to 5020 if binding to
    /// 502 fails (unprivileged process without CAP_NET_BIND_SERVICE).
    #[arg(long, env = "RO_MODBUS_PORT", default_value_t = 502)]
    pub modbus_port: u16,

    /// Address the HTTP/SSE server binds to.
    #[arg(long, env = "RO_HTTP_ADDRESS", default_value = "0.0.0.0")]
    pub http_address: String,

    /// Port the HTTP/SSE server binds to.
    #[arg(long, env = "RO_HTTP_PORT", default_value_t = 8000)]
    pub http_port: u16,

    /// Physics tick period in milliseconds (default 10 Hz).
    #[arg(long, env = "RO_TICK_MS", default_value_t = 100)]
    pub tick_ms: u64,

    /// Number of ticks to run before the Modbus and HTTP servers start
    /// accepting connections, so clients never observe the all-zero
    /// startup transient.
    #[arg(long, env = "RO_WARMUP_TICKS", default_value_t = 50)]
    pub warmup_ticks: u32,

    /// Seconds of inactivity after which an idle Modbus TCP connection is
    /// closed by the server.
    #[arg(long, env = "RO_MODBUS_IDLE_TIMEOUT_SECS", default_value_t = 120)]
    pub modbus_idle_timeout_secs: u64,

    /// Enable verbose (debug level) logging.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Suppress all logging output.
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl Args {
    pub fn tick_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_ms)
    }

    pub fn modbus_idle_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.modbus_idle_timeout_secs)
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            log::LevelFilter::Off
        } else if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn defaults_match_documented_values() {
        let args = Args::parse_from(["ro-plant-twin"]);
        assert_eq!(args.modbus_address, "0.0.0.0");
        assert_eq!(args.modbus_port, 502);
        assert_eq!(args.http_port, 8000);
        assert_eq!(args.tick_ms, 100);
        assert_eq!(args.warmup_ticks, 50);
        assert_eq!(args.modbus_idle_timeout_secs, 120);
    }

    #[test]
    fn cli_definition_is_well_formed() {
        Args::command().debug_assert();
    }
}
