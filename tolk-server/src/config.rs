use crate::error::ServerError;
use std::env;
use std::net::SocketAddr;
use tolk_core::IceServerConfig;
use tolk_core::utils::default_stun_urls;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TURN_URL_ENV: &str = "TOLK_TURN_URL";
pub const TURN_USER_ENV: &str = "TOLK_TURN_USER";
pub const TURN_PASSWORD_ENV: &str = "TOLK_TURN_PASSWORD";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5002;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Handed to every client in `ice-config` right after `welcome`.
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            ice_servers: vec![IceServerConfig {
                urls: default_stun_urls(),
                username: None,
                credential: None,
            }],
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ServerError> {
        let mut config = Self::default();
        if let Ok(host) = env::var(HOST_ENV)
            && !host.trim().is_empty()
        {
            config.host = host.trim().to_owned();
        }
        if let Ok(port) = env::var(PORT_ENV) {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ServerError::Config(format!("invalid {}: {:?}", PORT_ENV, port)))?;
        }
        if let Ok(turn) = env::var(TURN_URL_ENV)
            && !turn.trim().is_empty()
        {
            let turn = turn.trim();
            config.ice_servers.push(IceServerConfig {
                urls: vec![
                    format!("turn:{}?transport=tcp", turn),
                    format!("turn:{}?transport=udp", turn),
                ],
                username: env::var(TURN_USER_ENV).ok(),
                credential: env::var(TURN_PASSWORD_ENV).ok(),
            });
        }
        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ServerError::Config(format!("invalid bind address {}:{}", self.host, self.port)))
    }
}
