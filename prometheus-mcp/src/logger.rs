use std::fmt::Write;

use jiff::{Zoned, tz::TimeZone};
use log::{Level, Record};
use logforth::{
    append::{Stderr, Stdout},
    diagnostic::Diagnostic,
    layout::{JsonLayout, Layout},
};

use crate::args::{Args, LogStyle};

/// `<UTC timestamp> <level>  <crate>: <message>`, with the level optionally colored.
#[derive(Debug, Clone)]
struct TextLayout {
    colored: bool,
}

impl TextLayout {
    fn new(style: LogStyle) -> Self {
        Self {
            colored: style == LogStyle::Color,
        }
    }
}

fn ansi_color(level: Level) -> u8 {
    match level {
        Level::Error => 31,
        Level::Warn => 33,
        Level::Info => 32,
        Level::Debug => 34,
        Level::Trace => 35,
    }
}

impl Layout for TextLayout {
    fn format(&self, record: &Record<'_>, _: &[Box<dyn Diagnostic>]) -> anyhow::Result<Vec<u8>> {
        let mut line = String::new();
        let now = Zoned::now().with_time_zone(TimeZone::UTC);

        write!(line, "{} ", now.strftime("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        let level = record.level();

        if self.colored {
            write!(line, "\x1b[{}m{level:>5}\x1b[0m", ansi_color(level))?;
        } else {
            write!(line, "{level:>5}")?;
        }

        let target = record.target().split("::").next().unwrap_or_default();
        write!(line, "  {target}: {}", record.args())?;

        Ok(line.into_bytes())
    }
}

/// Where log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Output {
    Stdout,
    /// Used with the stdio transport, where stdout carries the protocol.
    Stderr,
}

pub(super) fn init(args: &Args, output: Output) {
    logforth::builder()
        .dispatch(|d| {
            let d = d.filter(args.log_level.env_filter());

            match (args.log_style, output) {
                (LogStyle::Json, Output::Stdout) => d.append(Stdout::default().with_layout(JsonLayout::default())),
                (LogStyle::Json, Output::Stderr) => d.append(Stderr::default().with_layout(JsonLayout::default())),
                (style, Output::Stdout) => d.append(Stdout::default().with_layout(TextLayout::new(style))),
                (style, Output::Stderr) => d.append(Stderr::default().with_layout(TextLayout::new(style))),
            }
        })
        .apply();
}
