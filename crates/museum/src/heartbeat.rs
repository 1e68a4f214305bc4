//! Server list announcements.
//!
//! A heartbeat is an HTTP GET to the classic server list carrying the
//! server's name, port, and player counts. A 200 reply's body is the URL
//! players use to join; anything else is an error.

use reqwest::StatusCode;

/// Where heartbeats go unless overridden.
pub const HEARTBEAT_ENDPOINT: &str = "https://www.classicube.net/server/heartbeat/";

/// Names are never verified, so the salt can be a fixed string.
pub const DEFAULT_SALT: &str = "PJSalt";

#[derive(Debug, thiserror::Error)]
pub enum HeartbeatError {
    /// The request never got a response.
    #[error("heartbeat request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server list answered with something other than 200.
    #[error("server list returned HTTP {status}")]
    Rejected { status: StatusCode, body: String },
}

/// What to announce, and where.
#[derive(Debug, Clone)]
pub struct Heartbeat {
    pub name: String,
    pub port: u16,
    /// The `max` players figure shown in the server list.
    pub max_connections: usize,
    pub public: bool,
    pub salt: String,
    pub software: Option<String>,
    endpoint: String,
    client: reqwest::Client,
}

impl Heartbeat {
    pub fn new(name: impl Into<String>, port: u16, max_connections: usize, public: bool) -> Self {
        Self {
            name: name.into(),
            port,
            max_connections,
            public,
            salt: DEFAULT_SALT.to_string(),
            software: None,
            endpoint: HEARTBEAT_ENDPOINT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Sends heartbeats somewhere other than [`HEARTBEAT_ENDPOINT`].
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    pub fn software(mut self, software: impl Into<String>) -> Self {
        self.software = Some(software.into());
        self
    }

    /// Query parameters for an announce with `users` players online.
    pub fn query(&self, users: usize) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("name", self.name.clone()),
            ("port", self.port.to_string()),
            ("users", users.to_string()),
            ("max", self.max_connections.to_string()),
            ("public", self.public.to_string()),
            ("salt", self.salt.clone()),
        ];
        if let Some(software) = &self.software {
            query.push(("software", software.clone()));
        }
        query
    }

    /// Announces the server and returns the play URL.
    ///
    /// # Errors
    /// [`HeartbeatError::Rejected`] for a non-200 reply, whose body is
    /// logged; [`HeartbeatError::Request`] if the request itself failed.
    pub async fn send(&self, users: usize) -> Result<String, HeartbeatError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query(users))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            tracing::error!(%status, body = %body, "heartbeat rejected");
            return Err(HeartbeatError::Rejected { status, body });
        }

        Ok(body.trim().to_string())
    }
}
