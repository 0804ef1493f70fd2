//! Server configuration, read from command-line flags with environment
//! fallbacks and validated once at start-up.

use std::error::Error;
use std::fmt::{self, Debug, Display};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use axum::http::HeaderValue;
use clap::Parser;
use folio_chat_core::persona::Persona;
use folio_chat_gemini_model::{GeminiConfig, GeminiConfigBuilder};

/// Command-line and environment settings.
#[derive(Clone, Parser)]
#[command(name = "folio-chat-server", version, about = "Portfolio chat backend")]
pub struct Settings {
    /// API key of the Gemini API.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Model used for both the reply and the suggestions.
    #[arg(long, env = "FOLIO_CHAT_MODEL", default_value = "gemini-1.5-flash")]
    pub model: String,

    /// Base URL of the Gemini API.
    #[arg(
        long,
        env = "FOLIO_CHAT_BASE_URL",
        default_value = "https://generativelanguage.googleapis.com/v1beta"
    )]
    pub base_url: String,

    /// Address to listen on.
    #[arg(long, env = "FOLIO_CHAT_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "FOLIO_CHAT_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Limit for each model request in seconds, 0 to disable.
    #[arg(long, env = "FOLIO_CHAT_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// File that replaces the built-in persona preamble.
    #[arg(long, env = "FOLIO_CHAT_PERSONA_FILE")]
    pub persona_file: Option<PathBuf>,

    /// Origins allowed to call the API. Any origin when empty.
    #[arg(
        long = "allowed-origin",
        env = "FOLIO_CHAT_ALLOWED_ORIGINS",
        value_delimiter = ','
    )]
    pub allowed_origins: Vec<String>,
}

impl Settings {
    /// Checks the settings that clap can't check by itself.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::new("the Gemini API key is empty"));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::new("the model name is empty"));
        }
        self.origin_headers()?;
        Ok(())
    }

    /// Returns the address to listen on.
    #[inline]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the per-request timeout.
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Returns the provider configuration.
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfigBuilder::with_api_key(self.api_key.trim())
            .with_model(self.model.trim())
            .with_base_url(&self.base_url)
            .build()
    }

    /// Parses the allowed origins into header values.
    pub fn origin_headers(&self) -> Result<Vec<HeaderValue>, ConfigError> {
        self.allowed_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|_| {
                    ConfigError::new(format!("invalid allowed origin: {origin:?}"))
                })
            })
            .collect()
    }

    /// Loads the persona, from the persona file if one is configured.
    pub async fn load_persona(&self) -> Result<Persona, ConfigError> {
        let Some(path) = &self.persona_file else {
            return Ok(Persona::default());
        };
        let preamble = tokio::fs::read_to_string(path).await.map_err(|err| {
            ConfigError::new(format!(
                "failed to read persona file {}: {err}",
                path.display()
            ))
        })?;
        if preamble.trim().is_empty() {
            return Err(ConfigError::new(format!(
                "persona file {} is empty",
                path.display()
            )));
        }
        Ok(Persona::with_preamble(preamble.trim_end()))
    }
}

impl Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("timeout_secs", &self.timeout_secs)
            .field("persona_file", &self.persona_file)
            .field("allowed_origins", &self.allowed_origins)
            .finish()
    }
}

/// An invalid configuration.
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: {}", self.message)
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Settings {
        let mut argv = vec!["folio-chat-server", "--api-key", "secret"];
        argv.extend_from_slice(args);
        Settings::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = parse(&[]);
        assert!(settings.validate().is_ok());
        assert_eq!(settings.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(settings.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(settings.gemini_config().model(), "gemini-1.5-flash");
        assert!(settings.origin_headers().unwrap().is_empty());
    }

    #[test]
    fn test_blank_api_key() {
        let settings = Settings::try_parse_from([
            "folio-chat-server",
            "--api-key",
            "  ",
        ])
        .unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_timeout_disabled() {
        let settings = parse(&["--timeout-secs", "0"]);
        assert_eq!(settings.timeout(), None);
    }

    #[test]
    fn test_allowed_origins() {
        let settings = parse(&[
            "--allowed-origin",
            "https://hdo.dev,http://localhost:3001",
        ]);
        let origins = settings.origin_headers().unwrap();
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "https://hdo.dev");

        let settings = parse(&["--allowed-origin", "bad\norigin"]);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_debug_hides_api_key() {
        assert!(!format!("{:?}", parse(&[])).contains("secret"));
    }

    #[tokio::test]
    async fn test_missing_persona_file() {
        let settings = parse(&["--persona-file", "/nonexistent/persona.md"]);
        assert!(settings.load_persona().await.is_err());
        assert_eq!(parse(&[]).load_persona().await.unwrap(), Persona::default());
    }
}
