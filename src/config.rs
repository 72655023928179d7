use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telex: TelexConfig,
    /// Requests whose User-Agent contains one of these are acknowledged but not forwarded
    #[serde(default)]
    pub skip_user_agents: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub port: u16,
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            path: "/zendesk-integration".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct TelexConfig {
    pub base_url: String,
    pub channel_id: Option<String>,
    pub username: String,
    pub ticket_event_name: String,
    pub message_event_name: String,
    pub timeout_secs: u64,
}

impl Default for TelexConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ping.telex.im/v1/webhooks".to_string(),
            channel_id: None,
            username: "ZendeskBot".to_string(),
            ticket_event_name: "Zendesk New Ticket".to_string(),
            message_event_name: "Zendesk Ticket".to_string(),
            timeout_secs: 10,
        }
    }
}

impl TelexConfig {
    /// Full webhook URL for the configured channel.
    pub fn webhook_url(&self) -> Result<String> {
        let channel_id = match self.channel_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => bail!("telex channel id is not configured (set TELEX_CHANNEL_ID or telex.channel_id)"),
        };
        Ok(format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            channel_id
        ))
    }

    /// Client timeout; zero would fail every forward, so it is refused.
    pub fn timeout(&self) -> Result<Duration> {
        if self.timeout_secs == 0 {
            bail!("telex.timeout_secs must be greater than zero");
        }
        Ok(Duration::from_secs(self.timeout_secs))
    }
}

impl Config {
    /// Reads the YAML config file, or falls back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&config_str)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml(config_str: &str) -> Result<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(config_str);
        serde_path_to_error::deserialize(deserializer)
            .map_err(|e| anyhow::anyhow!("{} at `{}`", e.inner(), e.path()))
    }
}
