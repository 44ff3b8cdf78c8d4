//! Command-line surface
//!
//! The fixed daemon flags are joined by whatever fields the registered
//! providers contributed to the [`ConfigSurface`]. Every flag can also come
//! from its environment variable.

use clap::{Arg, ArgMatches, Command, value_parser};
use define_core::{ConfigSurface, Overrides};
use std::path::PathBuf;
use tracing::Level;

/// Configuration file consulted when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "/dev/null";

/// Port used when neither `--port` nor `$PORT` is set
pub const DEFAULT_PORT: u16 = 8080;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Parsed daemon options
#[derive(Debug)]
pub struct Cli {
    pub config_path: PathBuf,
    pub port: u16,
    pub log_level: Level,
    pub overrides: Overrides,
}

impl Cli {
    /// Extract daemon options and provider overrides from parsed matches
    pub fn from_matches(matches: &ArgMatches, surface: &ConfigSurface) -> Self {
        let mut overrides = Overrides::new();
        overrides.preferred_source = matches.get_one::<String>("preferred-source").cloned();

        for field in surface.fields() {
            if let Some(value) = matches.get_one::<String>(&field.flag_name()) {
                overrides.set(field, value.clone());
            }
        }

        let log_level = matches
            .get_one::<String>("log-level")
            .map(|level| level.to_ascii_lowercase());
        let log_level = match log_level.as_deref() {
            Some("trace") => Level::TRACE,
            Some("debug") => Level::DEBUG,
            Some("warn") => Level::WARN,
            Some("error") => Level::ERROR,
            _ => Level::INFO,
        };

        Self {
            config_path: matches
                .get_one::<PathBuf>("config")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
            port: matches.get_one::<u16>("port").copied().unwrap_or(DEFAULT_PORT),
            log_level,
            overrides,
        }
    }
}

/// Build the command for the daemon flags plus every contributed field
pub fn command(surface: &ConfigSurface) -> Command {
    let mut command = Command::new("defined")
        .about("Look up word definitions and serve them as HTML")
        .version(env!("CARGO_PKG_VERSION"))
        .after_help("Set $PORT for the port to listen on.")
        .arg(
            Arg::new("config")
                .long("config")
                .env("DEFINE_CONFIG")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_CONFIG_PATH)
                .help("JSON configuration file"),
        )
        .arg(
            Arg::new("preferred-source")
                .long("preferred-source")
                .env("DEFINE_PREFERRED_SOURCE")
                .value_name("PROVIDER")
                .help("Provider that answers every lookup"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .env("PORT")
                .value_parser(value_parser!(u16))
                .default_value("8080")
                .help("Port to listen on"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .env("DEFINE_LOG_LEVEL")
                .value_parser(LOG_LEVELS)
                .ignore_case(true)
                .default_value("info")
                .help("Log verbosity"),
        );

    for field in surface.fields() {
        let flag = field.flag_name();
        let mut arg = Arg::new(flag.clone())
            .long(flag)
            .value_name("VALUE")
            .help(field.help.clone())
            .help_heading(format!("Provider: {}", field.provider))
            .hide_env_values(field.secret);
        if let Some(env) = &field.env {
            arg = arg.env(env.clone());
        }
        command = command.arg(arg);
    }

    command
}
