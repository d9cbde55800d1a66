//! Mirror destination endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A mirror destination (host and port) that traffic should be replicated to.
///
/// The engine treats endpoints as opaque: the `host:port` rendering is all it
/// ever needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Destination host (IP or DNS name).
    pub host: String,

    /// Destination port.
    pub port: u16,
}

impl Endpoint {
    /// Create a new endpoint.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_host_port() {
        let ep = Endpoint::new("10.0.0.5", 9000);
        assert_eq!(ep.to_string(), "10.0.0.5:9000");
    }
}
