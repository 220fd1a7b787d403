use serde::Deserialize;

/// Application configuration loaded from environment variables
///
/// TMDB credentials are not part of this struct; they are resolved per request
/// by [`crate::credentials`].
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL poster paths are appended to
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// Redis connection URL; caching is disabled when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// JSON file holding stored TMDB secrets
    #[serde(default = "default_secrets_path")]
    pub secrets_path: String,

    /// Language sent to TMDB with every request
    #[serde(default = "default_language")]
    pub language: String,

    /// Region used for provider availability when the request names none
    #[serde(default = "default_region")]
    pub default_region: String,

    /// Discover pages fetched per genre when the request names none
    #[serde(default = "default_pages")]
    pub default_pages: u32,

    /// Upper bound on discover pages per genre
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// TTL of cached catalog responses, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Per-request timeout against TMDB, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retries after a transient TMDB failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_secrets_path() -> String {
    "secrets.json".to_string()
}

fn default_language() -> String {
    "ko-KR".to_string()
}

fn default_region() -> String {
    "KR".to_string()
}

fn default_pages() -> u32 {
    1
}

fn default_max_pages() -> u32 {
    5
}

fn default_cache_ttl_secs() -> u64 {
    1800 // 30 minutes
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_max_retries() -> u32 {
    2
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tmdb_api_url: default_tmdb_api_url(),
            tmdb_image_url: default_tmdb_image_url(),
            redis_url: None,
            secrets_path: default_secrets_path(),
            language: default_language(),
            default_region: default_region(),
            default_pages: default_pages(),
            max_pages: default_max_pages(),
            cache_ttl_secs: default_cache_ttl_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_env_is_empty() {
        let config = Config::from_vars(Vec::new()).unwrap();
        assert_eq!(config.tmdb_api_url, "https://api.themoviedb.org/3");
        assert_eq!(config.language, "ko-KR");
        assert_eq!(config.default_region, "KR");
        assert_eq!(config.default_pages, 1);
        assert_eq!(config.cache_ttl_secs, 1800);
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn test_env_overrides_defaults() {
        let vars = vec![
            ("REDIS_URL".to_string(), "redis://cache:6379".to_string()),
            ("DEFAULT_REGION".to_string(), "US".to_string()),
            ("MAX_RETRIES".to_string(), "4".to_string()),
            ("PORT".to_string(), "8080".to_string()),
        ];
        let config = Config::from_vars(vars).unwrap();
        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.default_region, "US");
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let vars = vec![("PORT".to_string(), "not-a-port".to_string())];
        assert!(Config::from_vars(vars).is_err());
    }
}
