use crate::error::ClientError;
use std::env;
use std::time::Duration;
use tolk_core::IceServerConfig;
use tolk_core::utils::default_stun_urls;

pub const SIGNALING_URL_ENV: &str = "TOLK_SIGNALING_URL";
pub const TURN_URL_ENV: &str = "TOLK_TURN_URL";
pub const TURN_USER_ENV: &str = "TOLK_TURN_USER";
pub const TURN_PASSWORD_ENV: &str = "TOLK_TURN_PASSWORD";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the signaling server, e.g. `ws://host:5002/signal`.
    pub signaling_url: String,
    pub ice_servers: Vec<IceServerConfig>,
    /// Delay before the first dial pass after joining a room.
    pub initial_dial_delay: Duration,
    /// Period of the dial retry timer while no peer is connected.
    pub dial_interval: Duration,
    /// How long an unanswered offer is kept before the peer is re-dialed.
    pub negotiation_timeout: Duration,
    pub reconnect_delay: Duration,
    pub max_reconnect_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            signaling_url: "ws://127.0.0.1:5002/signal".to_owned(),
            ice_servers: vec![IceServerConfig {
                urls: default_stun_urls(),
                username: None,
                credential: None,
            }],
            initial_dial_delay: Duration::from_millis(250),
            dial_interval: Duration::from_millis(1200),
            negotiation_timeout: Duration::from_secs(5),
            reconnect_delay: Duration::from_millis(500),
            max_reconnect_delay: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Reads the signaling endpoint and optional TURN relay from the environment.
    /// A missing endpoint is the one fatal startup error.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let signaling_url = lookup(SIGNALING_URL_ENV)
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ClientError::Config(format!("{} is not set", SIGNALING_URL_ENV)))?;

        let mut config = Self {
            signaling_url,
            ..Self::default()
        };
        if let Some(turn) = lookup(TURN_URL_ENV) {
            config.ice_servers.extend(turn_servers(
                &turn,
                lookup(TURN_USER_ENV),
                lookup(TURN_PASSWORD_ENV),
            ));
        }
        Ok(config)
    }
}

/// STUN + TURN (tcp/udp) entries for one relay host.
pub fn turn_servers(
    host: &str,
    username: Option<String>,
    credential: Option<String>,
) -> Vec<IceServerConfig> {
    let host = host.trim();
    if host.is_empty() {
        return Vec::new();
    }
    vec![
        IceServerConfig {
            urls: vec![format!("stun:{}", host)],
            username: None,
            credential: None,
        },
        IceServerConfig {
            urls: vec![
                format!("turn:{}?transport=tcp", host),
                format!("turn:{}?transport=udp", host),
            ],
            username,
            credential,
        },
    ]
}
