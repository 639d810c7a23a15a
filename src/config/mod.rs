//! Configuration module for the EduMaster backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Embedded portal for the batches screen.
pub const BATCHES_PORTAL_URL: &str = "https://jsgfiuwgerfmsajdk.netlify.app";

/// Embedded portal for the live-classes screen.
pub const LIVE_CLASSES_PORTAL_URL: &str = "https://irsion-10-0-hq44-alphaproject.netlify.app/";

/// Default generateContent endpoint for the chat assistant.
pub const DEFAULT_CHAT_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// generateContent endpoint for the chat assistant
    pub chat_api_url: String,
    /// API key for the chat assistant (chat degrades to canned replies without it)
    pub chat_api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("EDUMASTER_DB_PATH")
            .unwrap_or_else(|_| "./data/edumaster.sqlite".to_string())
            .into();

        let bind_addr = env::var("EDUMASTER_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid EDUMASTER_BIND_ADDR format");

        let log_level = env::var("EDUMASTER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let chat_api_url =
            env::var("EDUMASTER_CHAT_API_URL").unwrap_or_else(|_| DEFAULT_CHAT_API_URL.to_string());

        let chat_api_key = env::var("EDUMASTER_CHAT_API_KEY").ok();

        Self {
            db_path,
            bind_addr,
            log_level,
            chat_api_url,
            chat_api_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("EDUMASTER_DB_PATH");
        env::remove_var("EDUMASTER_BIND_ADDR");
        env::remove_var("EDUMASTER_LOG_LEVEL");
        env::remove_var("EDUMASTER_CHAT_API_URL");
        env::remove_var("EDUMASTER_CHAT_API_KEY");

        let config = Config::from_env();

        assert_eq!(config.db_path, PathBuf::from("./data/edumaster.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.chat_api_url, DEFAULT_CHAT_API_URL);
        assert!(config.chat_api_key.is_none());
    }
}
