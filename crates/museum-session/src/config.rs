//! Session configuration.

use std::time::Duration;

use museum_protocol::bytes::STRING_LEN;

use crate::SessionError;

/// Settings shared by every session on a server.
///
/// `#[derive(Clone)]` because the server hands each session task an
/// `Arc` of one copy, and builders take it by value.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Server name, sent in the server hello and the about text.
    pub server_name: String,

    /// Message of the day, shown under the name while a level loads.
    pub motd: String,

    /// How long to wait for the next client packet before closing the
    /// connection. `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            server_name: "Museum".to_string(),
            motd: String::new(),
            idle_timeout: None,
        }
    }
}

impl SessionConfig {
    /// Checks that the name and MOTD fit their 64-byte wire fields.
    ///
    /// Without this every handshake would fail at encode time instead of
    /// the server failing once at startup.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.server_name.is_empty() {
            return Err(SessionError::InvalidConfig(
                "server name must not be empty".into(),
            ));
        }
        for (field, value) in [("server name", &self.server_name), ("motd", &self.motd)] {
            if value.len() > STRING_LEN {
                return Err(SessionError::InvalidConfig(format!(
                    "{field} is {} bytes, the protocol allows {STRING_LEN}",
                    value.len()
                )));
            }
        }
        Ok(())
    }
}
