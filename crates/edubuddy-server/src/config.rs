//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development. Without `OPENAI_API_KEY` the
//! assistant endpoint is disabled; everything else works.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use edubuddy_shared::constants::{
    APP_NAME, DEFAULT_CHAT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_HTTP_PORT, DEFAULT_UPLOAD_PREFIX,
    MAX_FILE_SIZE,
};
use edubuddy_shared::MatchPolicy;

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Externally visible base URL, used to build public file links.
    /// Env: `PUBLIC_BASE_URL`
    /// Default: `http://localhost:8080`
    pub public_base_url: String,

    /// Filesystem path where uploaded files are stored.
    /// Env: `BLOB_STORAGE_PATH`
    /// Default: `./blobs`
    pub blob_storage_path: PathBuf,

    /// Key prefix for uploaded note files.
    /// Env: `UPLOAD_PREFIX`
    /// Default: `pdfs`
    pub upload_prefix: String,

    /// Maximum uploaded file size in bytes.
    /// Env: `MAX_UPLOAD_SIZE`
    /// Default: 10 MiB
    pub max_upload_size: usize,

    /// SQLite database file. `None` uses the platform data directory.
    /// Env: `DATABASE_PATH`
    pub database_path: Option<PathBuf>,

    /// Human-readable name for this instance.
    /// Env: `INSTANCE_NAME`
    /// Default: `"EduBuddy"`
    pub instance_name: String,

    /// How multi-term search queries combine.
    /// Env: `SEARCH_MATCH_POLICY` (`any` / `all`)
    /// Default: `any`
    pub match_policy: MatchPolicy,

    /// API key for the chat-completion provider.
    /// Env: `OPENAI_API_KEY`
    /// Default: unset (assistant disabled).
    pub openai_api_key: Option<String>,

    /// Env: `OPENAI_BASE_URL`
    /// Default: `https://api.openai.com/v1`
    pub openai_base_url: String,

    /// Env: `OPENAI_MODEL`
    /// Default: `gpt-3.5-turbo`
    pub openai_model: String,

    /// Timeout for one chat-completion request, in seconds.
    /// Env: `CHAT_TIMEOUT_SECS`
    /// Default: `30`
    pub chat_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            public_base_url: format!("http://localhost:{DEFAULT_HTTP_PORT}"),
            blob_storage_path: PathBuf::from("./blobs"),
            upload_prefix: DEFAULT_UPLOAD_PREFIX.to_string(),
            max_upload_size: MAX_FILE_SIZE,
            database_path: None,
            instance_name: APP_NAME.to_string(),
            match_policy: MatchPolicy::AnyTerm,
            openai_api_key: None,
            openai_base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            openai_model: DEFAULT_CHAT_MODEL.to_string(),
            chat_timeout_secs: 30,
        }
    }
}

// Hand-written so the API key never ends up in logs.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("http_addr", &self.http_addr)
            .field("public_base_url", &self.public_base_url)
            .field("blob_storage_path", &self.blob_storage_path)
            .field("upload_prefix", &self.upload_prefix)
            .field("max_upload_size", &self.max_upload_size)
            .field("database_path", &self.database_path)
            .field("instance_name", &self.instance_name)
            .field("match_policy", &self.match_policy)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("chat_timeout_secs", &self.chat_timeout_secs)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(url) = lookup("PUBLIC_BASE_URL").filter(|u| !u.trim().is_empty()) {
            config.public_base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(path) = lookup("BLOB_STORAGE_PATH") {
            config.blob_storage_path = PathBuf::from(path);
        }

        if let Some(prefix) = lookup("UPLOAD_PREFIX") {
            let prefix = prefix.trim().trim_matches('/');
            if is_safe_prefix(prefix) {
                config.upload_prefix = prefix.to_string();
            } else {
                tracing::warn!(value = %prefix, "Invalid UPLOAD_PREFIX, using default");
            }
        }

        if let Some(val) = lookup("MAX_UPLOAD_SIZE") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_upload_size = n,
                _ => tracing::warn!(value = %val, "Invalid MAX_UPLOAD_SIZE, using default"),
            }
        }

        if let Some(path) = lookup("DATABASE_PATH").filter(|p| !p.is_empty()) {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Some(name) = lookup("INSTANCE_NAME") {
            config.instance_name = name;
        }

        if let Some(val) = lookup("SEARCH_MATCH_POLICY") {
            match val.parse::<MatchPolicy>() {
                Ok(policy) => config.match_policy = policy,
                Err(e) => tracing::warn!(error = %e, "Invalid SEARCH_MATCH_POLICY, using default"),
            }
        }

        if let Some(key) = lookup("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                config.openai_api_key = Some(key.trim().to_string());
            }
        }

        if let Some(url) = lookup("OPENAI_BASE_URL").filter(|u| !u.trim().is_empty()) {
            config.openai_base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(model) = lookup("OPENAI_MODEL").filter(|m| !m.trim().is_empty()) {
            config.openai_model = model.trim().to_string();
        }

        if let Some(val) = lookup("CHAT_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(n) if n > 0 => config.chat_timeout_secs = n,
                _ => tracing::warn!(value = %val, "Invalid CHAT_TIMEOUT_SECS, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    pub fn assistant_enabled(&self) -> bool {
        self.openai_api_key.is_some()
    }
}

/// One or more plain path segments: no traversal, no empty segments.
fn is_safe_prefix(prefix: &str) -> bool {
    !prefix.is_empty()
        && prefix.split('/').all(|seg| {
            !seg.is_empty()
                && seg != "."
                && seg != ".."
                && seg
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> ServerConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.max_upload_size, 10 * 1024 * 1024);
        assert_eq!(config.upload_prefix, "pdfs");
        assert!(!config.assistant_enabled());
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("HTTP_ADDR", "127.0.0.1:9000"),
            ("PUBLIC_BASE_URL", "https://notes.example.org/"),
            ("SEARCH_MATCH_POLICY", "all"),
            ("OPENAI_API_KEY", "sk-test"),
            ("MAX_UPLOAD_SIZE", "2048"),
        ]);
        assert_eq!(config.http_addr, ([127, 0, 0, 1], 9000).into());
        assert_eq!(config.public_base_url, "https://notes.example.org");
        assert_eq!(config.match_policy, MatchPolicy::AllTerms);
        assert_eq!(config.max_upload_size, 2048);
        assert!(config.assistant_enabled());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_with(&[
            ("HTTP_ADDR", "not-an-addr"),
            ("UPLOAD_PREFIX", "../etc"),
            ("SEARCH_MATCH_POLICY", "fuzzy"),
            ("OPENAI_API_KEY", "   "),
            ("MAX_UPLOAD_SIZE", "0"),
            ("CHAT_TIMEOUT_SECS", "0"),
        ]);
        let default = ServerConfig::default();
        assert_eq!(config.http_addr, default.http_addr);
        assert_eq!(config.upload_prefix, "pdfs");
        assert_eq!(config.match_policy, MatchPolicy::AnyTerm);
        assert_eq!(config.max_upload_size, default.max_upload_size);
        assert_eq!(config.chat_timeout_secs, default.chat_timeout_secs);
        assert!(!config.assistant_enabled());

        let config = config_with(&[("CHAT_TIMEOUT_SECS", "soon")]);
        assert_eq!(config.chat_timeout_secs, 30);

        let config = config_with(&[("CHAT_TIMEOUT_SECS", "5")]);
        assert_eq!(config.chat_timeout_secs, 5);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = config_with(&[("OPENAI_API_KEY", "sk-secret")]);
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_safe_prefix() {
        assert!(is_safe_prefix("pdfs"));
        assert!(is_safe_prefix("notes/2024"));
        assert!(!is_safe_prefix(""));
        assert!(!is_safe_prefix("a//b"));
        assert!(!is_safe_prefix("a/../b"));
    }
}
