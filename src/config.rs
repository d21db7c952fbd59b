use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub hub: HubConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// REST base, e.g. `https://clubs.example.edu/api`.
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Notification hub endpoint. Configured separately from the REST base:
    /// deployments often serve the API behind a rewriting proxy path that
    /// websocket upgrades cannot traverse, so the hub needs an absolute origin.
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_file")]
    pub file: String,
}

fn default_session_file() -> String {
    ".club-console/session.json".to_string()
}

impl Config {
    /// Environment overrides use the `CONSOLE` prefix with `__` nesting,
    /// e.g. `CONSOLE__API__BASE_URL`, `CONSOLE__HUB__URL`.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("CONSOLE").separator("__"))
            .set_default("api.base_url", "https://clubs.example.edu/api")?
            .set_default("hub.url", "https://clubs.example.edu/notiHub")?
            .set_default("session.file", default_session_file())?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_field() {
        let config = Config::load().unwrap();
        assert!(config.api.base_url.ends_with("/api"));
        assert!(config.hub.url.ends_with("/notiHub"));
        assert_eq!(config.session.file, ".club-console/session.json");
    }
}
