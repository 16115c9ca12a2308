//! MCP front-end settings.

use std::{fmt, str::FromStr};

use crate::ConfigError;

/// Transport and bind settings for the MCP front-end.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The transport the MCP server is exposed on.
    pub transport: Transport,
    /// Host to bind in http and sse modes.
    pub bind_host: String,
    /// Port to bind in http and sse modes.
    pub bind_port: u16,
}

impl ServerConfig {
    /// The `host:port` pair the http and sse transports listen on.
    pub fn bind_address(&self) -> String {
        if self.bind_host.contains(':') && !self.bind_host.starts_with('[') {
            // IPv6 literal
            format!("[{}]:{}", self.bind_host, self.bind_port)
        } else {
            format!("{}:{}", self.bind_host, self.bind_port)
        }
    }
}

/// The MCP transport to serve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transport {
    /// MCP over stdin and stdout.
    #[default]
    Stdio,
    /// Streamable HTTP.
    Http,
    /// Server-sent events.
    Sse,
}

impl Transport {
    /// Whether this transport listens on a network socket.
    pub fn is_network(self) -> bool {
        !matches!(self, Transport::Stdio)
    }
}

impl AsRef<str> for Transport {
    fn as_ref(&self) -> &str {
        match self {
            Transport::Stdio => "stdio",
            Transport::Http => "http",
            Transport::Sse => "sse",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl FromStr for Transport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            "sse" => Ok(Transport::Sse),
            _ => Err(ConfigError::InvalidTransport(s.to_string())),
        }
    }
}
