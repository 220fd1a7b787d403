//! TMDB credential resolution
//!
//! Each credential is looked up in priority order: explicit request input, then
//! the stored secrets file, then the process environment. The first non-blank
//! value wins. A v4 access token takes precedence over a v3 API key.

use serde::Deserialize;
use std::{fmt, path::Path};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const API_KEY_VAR: &str = "TMDB_API_KEY";
pub const ACCESS_TOKEN_VAR: &str = "TMDB_ACCESS_TOKEN";

/// Secrets stored on disk, keyed the same way as the environment variables
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(rename = "TMDB_API_KEY", default)]
    pub api_key: Option<String>,
    #[serde(rename = "TMDB_ACCESS_TOKEN", default)]
    pub access_token: Option<String>,
}

impl Secrets {
    /// Loads the secrets file; a missing file yields empty secrets
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No secrets file found");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Internal(format!("Failed to read secrets file {}: {}", path.display(), e))
        })?;
        let secrets: Secrets = serde_json::from_str(&raw)?;

        tracing::info!(path = %path.display(), "Loaded stored TMDB secrets");
        Ok(secrets)
    }
}

/// How requests to TMDB are authenticated
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// v4 read access token, sent as `Authorization: Bearer`
    Bearer(String),
    /// v3 key, sent as the `api_key` query parameter
    ApiKey(String),
}

impl Auth {
    /// Stable, non-reversible identifier of the credential for cache keys
    pub fn fingerprint(&self) -> Uuid {
        let material = match self {
            Auth::Bearer(token) => format!("bearer:{}", token),
            Auth::ApiKey(key) => format!("api_key:{}", key),
        };
        Uuid::new_v5(&Uuid::NAMESPACE_OID, material.as_bytes())
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Bearer(_) => write!(f, "Auth::Bearer({})", self.fingerprint()),
            Auth::ApiKey(_) => write!(f, "Auth::ApiKey({})", self.fingerprint()),
        }
    }
}

/// Returns the first non-blank candidate, trimmed
fn first_present<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Resolves TMDB authentication for one request
pub fn resolve_auth(
    explicit_token: Option<&str>,
    explicit_key: Option<&str>,
    secrets: &Secrets,
) -> Option<Auth> {
    resolve_auth_with(explicit_token, explicit_key, secrets, |var| std::env::var(var).ok())
}

/// [`resolve_auth`] with the environment lookup supplied by the caller
pub fn resolve_auth_with<F>(
    explicit_token: Option<&str>,
    explicit_key: Option<&str>,
    secrets: &Secrets,
    env: F,
) -> Option<Auth>
where
    F: Fn(&str) -> Option<String>,
{
    let env_token = env(ACCESS_TOKEN_VAR);
    if let Some(token) = first_present([
        explicit_token,
        secrets.access_token.as_deref(),
        env_token.as_deref(),
    ]) {
        return Some(Auth::Bearer(token));
    }

    let env_key = env(API_KEY_VAR);
    first_present([explicit_key, secrets.api_key.as_deref(), env_key.as_deref()]).map(Auth::ApiKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_explicit_input_wins() {
        let secrets = Secrets {
            api_key: Some("stored".to_string()),
            access_token: None,
        };
        let auth = resolve_auth_with(None, Some("explicit"), &secrets, |var| {
            (var == API_KEY_VAR).then(|| "from-env".to_string())
        });
        assert_eq!(auth, Some(Auth::ApiKey("explicit".to_string())));
    }

    #[test]
    fn test_stored_secret_beats_environment() {
        let secrets = Secrets {
            api_key: Some("stored".to_string()),
            access_token: None,
        };
        let auth = resolve_auth_with(None, None, &secrets, |var| {
            (var == API_KEY_VAR).then(|| "from-env".to_string())
        });
        assert_eq!(auth, Some(Auth::ApiKey("stored".to_string())));
    }

    #[test]
    fn test_environment_is_last_resort() {
        let auth = resolve_auth_with(None, None, &Secrets::default(), |var| {
            (var == API_KEY_VAR).then(|| "  from-env  ".to_string())
        });
        assert_eq!(auth, Some(Auth::ApiKey("from-env".to_string())));
    }

    #[test]
    fn test_blank_values_are_skipped() {
        let secrets = Secrets {
            api_key: Some("stored".to_string()),
            access_token: Some("   ".to_string()),
        };
        let auth = resolve_auth_with(Some(""), Some(" "), &secrets, no_env);
        assert_eq!(auth, Some(Auth::ApiKey("stored".to_string())));
    }

    #[test]
    fn test_access_token_takes_precedence_over_api_key() {
        let secrets = Secrets {
            api_key: Some("stored-key".to_string()),
            access_token: None,
        };
        let auth = resolve_auth_with(None, Some("explicit-key"), &secrets, |var| {
            (var == ACCESS_TOKEN_VAR).then(|| "env-token".to_string())
        });
        assert_eq!(auth, Some(Auth::Bearer("env-token".to_string())));
    }

    #[test]
    fn test_nothing_configured() {
        assert_eq!(resolve_auth_with(None, None, &Secrets::default(), no_env), None);
    }

    #[test]
    fn test_fingerprint_is_stable_and_distinguishes_secrets() {
        let a = Auth::ApiKey("abc".to_string());
        let b = Auth::ApiKey("abd".to_string());
        assert_eq!(a.fingerprint(), Auth::ApiKey("abc".to_string()).fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), Auth::Bearer("abc".to_string()).fingerprint());
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let auth = Auth::Bearer("super-secret-token".to_string());
        assert!(!format!("{:?}", auth).contains("super-secret-token"));
    }

    #[test]
    fn test_secrets_file_missing_is_empty() {
        let secrets = Secrets::load("/nonexistent/mood-reel/secrets.json").unwrap();
        assert!(secrets.api_key.is_none());
        assert!(secrets.access_token.is_none());
    }

    #[test]
    fn test_secrets_file_parses() {
        let path = std::env::temp_dir().join(format!("mood-reel-secrets-{}.json", Uuid::new_v4()));
        std::fs::write(&path, r#"{"TMDB_API_KEY": "file-key"}"#).unwrap();

        let secrets = Secrets::load(&path).unwrap();
        assert_eq!(secrets.api_key.as_deref(), Some("file-key"));
        assert!(secrets.access_token.is_none());

        std::fs::remove_file(&path).unwrap();
    }
}
