use std::{borrow::Cow, fmt, io::IsTerminal, str::FromStr};

use clap::{Parser, ValueEnum};
use logforth::filter::EnvFilter;

/// Serves Prometheus queries as MCP tools.
///
/// The upstream connection and the transport are configured through environment variables
/// (`PROMETHEUS_URL`, `PROMETHEUS_MCP_SERVER_TRANSPORT`, ...). The flags only control logging.
#[derive(Debug, Parser)]
#[command(name = "Prometheus MCP Server", version, long_about = concat!("Prometheus MCP Server v", env!("CARGO_PKG_VERSION")))]
pub struct Args {
    /// Log level of the server crates. Dependencies log warnings and errors only.
    #[arg(long = "log", env = "PROMETHEUS_MCP_LOG", default_value_t = LogLevel::default())]
    pub log_level: LogLevel,
    /// Format of log lines
    #[arg(long, env = "PROMETHEUS_MCP_LOG_STYLE", default_value_t = LogStyle::default())]
    pub log_style: LogStyle,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogStyle {
    /// ANSI-colored text, the default when stderr is a terminal
    Color,
    /// Plain text
    Text,
    /// One JSON object per line
    Json,
}

impl Default for LogStyle {
    fn default() -> Self {
        if std::io::stderr().is_terminal() {
            LogStyle::Color
        } else {
            LogStyle::Text
        }
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn env_filter(self) -> EnvFilter {
        let directives = match self {
            LogLevel::Off => Cow::Borrowed("off"),
            level => Cow::Owned(format!(
                "warn,prometheus_mcp={level},server={level},mcp={level},config={level},prometheus_api={level}"
            )),
        };

        EnvFilter::from_str(&directives).expect("These all are valid env filters.")
    }
}

/// Writes the name clap accepts for the value.
fn write_value_name<T: ValueEnum>(value: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.to_possible_value() {
        Some(possible) => f.write_str(possible.get_name()),
        None => Ok(()),
    }
}

impl fmt::Display for LogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value_name(self, f)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value_name(self, f)
    }
}
