//! TMDB (The Movie Database) catalog client
//!
//! API flow:
//! 1. Discovery: /discover/{movie|tv} filtered to one genre, most popular first
//! 2. Availability: /{movie|tv}/{id}/watch/providers → offers per region
//! 3. Cards: /{movie|tv}/{id}?append_to_response=credits,videos
//!
//! Authenticates with a v4 bearer token when one is configured, otherwise with
//! the v3 `api_key` query parameter; never both.
use crate::{
    cached,
    config::Config,
    credentials::Auth,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        ApiDiscoverPage, ApiRegionList, ApiTitleDetails, Candidate, ContentKind, TitleDetails,
        WatchProviders,
    },
    services::providers::CatalogProvider,
};
use reqwest::{header::ACCEPT, Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::{collections::BTreeSet, sync::Arc, time::Duration};
use uuid::Uuid;

const REGIONS_CACHE_TTL: u64 = 3600; // 1 hour
const ERROR_SNIPPET_LEN: usize = 200;
const PARSE_SNIPPET_LEN: usize = 120;
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_url: String,
    language: String,
    auth: Option<Auth>,
    cache: Option<Cache>,
    cache_ttl: u64,
    max_retries: u32,
    retry_backoff: Duration,
}

/// First `max` characters of a response body, for error messages
fn snippet(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}

impl TmdbClient {
    /// Creates an unauthenticated client; see [`CatalogProvider::with_auth`]
    pub fn new(config: &Config, cache: Option<Cache>) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            api_url: config.tmdb_api_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            auth: None,
            cache,
            cache_ttl: config.cache_ttl_secs,
            max_retries: config.max_retries,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        })
    }

    /// Overrides the base delay between retries (doubled on every attempt)
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    fn auth(&self) -> AppResult<&Auth> {
        self.auth.as_ref().ok_or_else(|| {
            AppError::MissingCredentials(
                "No TMDB API key or access token configured".to_string(),
            )
        })
    }

    fn auth_fingerprint(&self) -> Uuid {
        self.auth.as_ref().map(Auth::fingerprint).unwrap_or_default()
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_url, endpoint.trim_start_matches('/'))
    }

    /// GETs `endpoint` and decodes the JSON body
    ///
    /// Transport errors, 5xx and 429 are retried with exponential backoff up to
    /// `max_retries` times. Any other non-success status, an empty body, or a
    /// body that is not the expected JSON is an `ExternalApi` error.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let auth = self.auth()?;
        let url = self.endpoint_url(endpoint);

        let mut query: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        if !self.language.is_empty() && !query.iter().any(|(k, _)| *k == "language") {
            query.push(("language", self.language.as_str()));
        }
        if let Auth::ApiKey(key) = auth {
            query.push(("api_key", key.as_str()));
        }

        let mut attempt = 0;
        loop {
            let mut request = self
                .http_client
                .get(&url)
                .header(ACCEPT, "application/json")
                .query(&query);
            if let Auth::Bearer(token) = auth {
                request = request.bearer_auth(token);
            }

            let outcome = request.send().await.map_err(AppError::from);
            let retryable = match &outcome {
                Ok(response) => {
                    let status = response.status();
                    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
                }
                Err(e) => e.is_transient(),
            };

            if retryable && attempt < self.max_retries {
                let delay = self.retry_backoff * 2u32.pow(attempt);
                tracing::warn!(
                    endpoint = %endpoint,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Transient TMDB failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Self::decode(endpoint, outcome?).await;
        }
    }

    async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> AppResult<T> {
        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            return Err(AppError::ExternalApi(format!(
                "TMDB returned status {} @ {}: {}",
                status,
                endpoint,
                snippet(&raw, ERROR_SNIPPET_LEN)
            )));
        }

        if raw.trim().is_empty() {
            return Err(AppError::ExternalApi(format!(
                "TMDB returned an empty body @ {}",
                endpoint
            )));
        }

        serde_json::from_str(&raw).map_err(|e| {
            tracing::debug!(endpoint = %endpoint, response = %raw, "Undecodable TMDB response");
            AppError::ExternalApi(format!(
                "Failed to parse TMDB response @ {}: {} (body starts: {})",
                endpoint,
                e,
                snippet(&raw, PARSE_SNIPPET_LEN)
            ))
        })
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbClient {
    async fn discover(
        &self,
        kind: ContentKind,
        genre_id: u32,
        page: u32,
    ) -> AppResult<Vec<Candidate>> {
        cached!(
            self.cache,
            CacheKey::Discover {
                kind,
                genre_id,
                page,
                language: self.language.clone(),
                auth: self.auth_fingerprint(),
            },
            self.cache_ttl,
            async move {
                let endpoint = format!("discover/{}", kind.path_segment());
                let response: ApiDiscoverPage = self
                    .get_json(
                        &endpoint,
                        &[
                            ("with_genres", genre_id.to_string()),
                            ("page", page.to_string()),
                            ("sort_by", "popularity.desc".to_string()),
                            ("include_adult", "false".to_string()),
                        ],
                    )
                    .await?;

                let candidates: Vec<Candidate> = response
                    .results
                    .into_iter()
                    .filter(|item| !item.adult)
                    .map(|item| Candidate::from_api(item, kind))
                    .collect();

                tracing::info!(
                    kind = %kind,
                    genre_id,
                    page,
                    total_pages = response.total_pages,
                    results = candidates.len(),
                    provider = "tmdb",
                    "Discover page fetched"
                );

                Ok::<_, AppError>(candidates)
            }
        )
    }

    async fn watch_providers(&self, kind: ContentKind, id: u64) -> AppResult<WatchProviders> {
        cached!(
            self.cache,
            CacheKey::WatchProviders {
                kind,
                id,
                auth: self.auth_fingerprint(),
            },
            self.cache_ttl,
            async move {
                let endpoint = format!("{}/{}/watch/providers", kind.path_segment(), id);
                let providers: WatchProviders = self.get_json(&endpoint, &[]).await?;

                tracing::debug!(
                    kind = %kind,
                    title_id = id,
                    regions = providers.results.len(),
                    provider = "tmdb",
                    "Watch providers fetched"
                );

                Ok::<_, AppError>(providers)
            }
        )
    }

    async fn details(&self, kind: ContentKind, id: u64) -> AppResult<TitleDetails> {
        cached!(
            self.cache,
            CacheKey::Details {
                kind,
                id,
                language: self.language.clone(),
                auth: self.auth_fingerprint(),
            },
            self.cache_ttl,
            async move {
                let endpoint = format!("{}/{}", kind.path_segment(), id);
                let api: ApiTitleDetails = self
                    .get_json(
                        &endpoint,
                        &[("append_to_response", "credits,videos".to_string())],
                    )
                    .await?;
                Ok::<_, AppError>(TitleDetails::from(api))
            }
        )
    }

    async fn provider_regions(&self) -> AppResult<Vec<String>> {
        cached!(
            self.cache,
            CacheKey::ProviderRegions {
                auth: self.auth_fingerprint(),
            },
            REGIONS_CACHE_TTL,
            async move {
                // Region codes don't depend on language
                let list: ApiRegionList = self
                    .get_json(
                        "watch/providers/regions",
                        &[("language", "en-US".to_string())],
                    )
                    .await?;

                let codes: BTreeSet<String> = list
                    .results
                    .into_iter()
                    .map(|region| region.iso_3166_1)
                    .filter(|code| !code.is_empty())
                    .collect();

                Ok::<_, AppError>(codes.into_iter().collect::<Vec<String>>())
            }
        )
    }

    fn with_auth(&self, auth: Auth) -> Arc<dyn CatalogProvider> {
        Arc::new(Self {
            auth: Some(auth),
            ..self.clone()
        })
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Query, State},
        http::{HeaderMap, StatusCode as AxumStatus},
        response::IntoResponse,
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    /// Serves `router` on an ephemeral port and returns its base URL
    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(api_url: String, auth: Auth) -> TmdbClient {
        let config = Config {
            tmdb_api_url: api_url,
            max_retries: 2,
            ..Config::default()
        };
        TmdbClient {
            auth: Some(auth),
            ..TmdbClient::new(&config, None)
                .unwrap()
                .with_retry_backoff(Duration::from_millis(1))
        }
    }

    fn discover_body() -> serde_json::Value {
        json!({
            "page": 1,
            "total_pages": 3,
            "results": [
                {"id": 1, "title": "Paddington 2", "vote_average": 7.6, "popularity": 40.0},
                {"id": 2, "title": "Adult Title", "adult": true}
            ]
        })
    }

    #[test]
    fn test_snippet_respects_char_boundaries() {
        assert_eq!(snippet("안녕하세요", 2), "안녕");
        assert_eq!(snippet("short", 200), "short");
    }

    #[test]
    fn test_endpoint_url_joins_cleanly() {
        let client = client_for("http://tmdb.local/3/".to_string(), Auth::ApiKey("k".into()));
        assert_eq!(
            client.endpoint_url("/discover/movie"),
            "http://tmdb.local/3/discover/movie"
        );
    }

    #[tokio::test]
    async fn test_missing_auth_is_an_error() {
        let client = TmdbClient::new(&Config::default(), None).unwrap();
        let result = client.discover(ContentKind::Movie, 35, 1).await;
        assert!(matches!(result, Err(AppError::MissingCredentials(_))));
    }

    #[tokio::test]
    async fn test_discover_sends_expected_query_and_drops_adult_titles() {
        let router = Router::new().route(
            "/discover/movie",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("with_genres").map(String::as_str), Some("35"));
                assert_eq!(params.get("page").map(String::as_str), Some("2"));
                assert_eq!(params.get("sort_by").map(String::as_str), Some("popularity.desc"));
                assert_eq!(params.get("include_adult").map(String::as_str), Some("false"));
                assert_eq!(params.get("language").map(String::as_str), Some("ko-KR"));
                assert_eq!(params.get("api_key").map(String::as_str), Some("v3-key"));
                Json(discover_body())
            }),
        );
        let base = spawn_server(router).await;
        let client = client_for(base, Auth::ApiKey("v3-key".to_string()));

        let candidates = client.discover(ContentKind::Movie, 35, 2).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Paddington 2");
        assert_eq!(candidates[0].kind, ContentKind::Movie);
    }

    #[tokio::test]
    async fn test_bearer_auth_never_sends_api_key() {
        let router = Router::new().route(
            "/discover/tv",
            get(
                |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| async move {
                    let bearer = headers
                        .get("authorization")
                        .and_then(|h| h.to_str().ok())
                        .map(str::to_string);
                    if bearer.as_deref() != Some("Bearer v4-token") || params.contains_key("api_key")
                    {
                        return AxumStatus::UNAUTHORIZED.into_response();
                    }
                    Json(json!({"results": [{"id": 7, "name": "Bluey"}]})).into_response()
                },
            ),
        );
        let base = spawn_server(router).await;
        let client = client_for(base, Auth::Bearer("v4-token".to_string()));

        let candidates = client.discover(ContentKind::Series, 16, 1).await.unwrap();
        assert_eq!(candidates[0].title, "Bluey");
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/discover/movie",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                        return AxumStatus::SERVICE_UNAVAILABLE.into_response();
                    }
                    Json(discover_body()).into_response()
                }),
            )
            .with_state(hits.clone());
        let base = spawn_server(router).await;
        let client = client_for(base, Auth::ApiKey("k".to_string()));

        let candidates = client.discover(ContentKind::Movie, 35, 1).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/discover/movie",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    AxumStatus::BAD_GATEWAY
                }),
            )
            .with_state(hits.clone());
        let base = spawn_server(router).await;
        let client = client_for(base, Auth::ApiKey("k".to_string()));

        let result = client.discover(ContentKind::Movie, 35, 1).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
        // initial attempt + 2 retries
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/movie/404/watch/providers",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    (AxumStatus::NOT_FOUND, "The resource you requested could not be found.")
                }),
            )
            .with_state(hits.clone());
        let base = spawn_server(router).await;
        let client = client_for(base, Auth::ApiKey("k".to_string()));

        let result = client.watch_providers(ContentKind::Movie, 404).await;
        match result {
            Err(AppError::ExternalApi(msg)) => assert!(msg.contains("404")),
            other => panic!("expected ExternalApi error, got {:?}", other),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_json_body_is_an_error() {
        let router = Router::new().route(
            "/movie/1",
            get(|| async { "<html>maintenance</html>" }),
        );
        let base = spawn_server(router).await;
        let client = client_for(base, Auth::ApiKey("k".to_string()));

        let result = client.details(ContentKind::Movie, 1).await;
        match result {
            Err(AppError::ExternalApi(msg)) => assert!(msg.contains("<html>maintenance")),
            other => panic!("expected ExternalApi error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_body_is_an_error() {
        let router = Router::new().route("/watch/providers/regions", get(|| async { "" }));
        let base = spawn_server(router).await;
        let client = client_for(base, Auth::ApiKey("k".to_string()));

        assert!(client.provider_regions().await.is_err());
    }

    #[tokio::test]
    async fn test_provider_regions_are_sorted_and_unique() {
        let router = Router::new().route(
            "/watch/providers/regions",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("language").map(String::as_str), Some("en-US"));
                Json(json!({"results": [
                    {"iso_3166_1": "US"},
                    {"iso_3166_1": "KR"},
                    {"iso_3166_1": ""},
                    {"iso_3166_1": "KR"}
                ]}))
            }),
        );
        let base = spawn_server(router).await;
        let client = client_for(base, Auth::ApiKey("k".to_string()));

        let regions = client.provider_regions().await.unwrap();
        assert_eq!(regions, vec!["KR".to_string(), "US".to_string()]);
    }

    #[tokio::test]
    async fn test_watch_providers_are_keyed_by_region() {
        let router = Router::new().route(
            "/tv/42/watch/providers",
            get(|| async {
                Json(json!({
                    "id": 42,
                    "results": {
                        "KR": {"flatrate": [{"provider_id": 8, "provider_name": "Netflix"}]}
                    }
                }))
            }),
        );
        let base = spawn_server(router).await;
        let client = client_for(base, Auth::ApiKey("v3-key".to_string()));

        let providers = client.watch_providers(ContentKind::Series, 42).await.unwrap();
        assert!(providers.is_available("KR", 8));
        assert!(!providers.is_available("US", 8));
    }

    #[tokio::test]
    async fn test_details_request_credits_and_videos() {
        let router = Router::new().route(
            "/movie/7",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(
                    params.get("append_to_response").map(String::as_str),
                    Some("credits,videos")
                );
                Json(json!({
                    "id": 7,
                    "credits": {"cast": [{"name": "Ben Whishaw", "character": "Paddington"}]},
                    "videos": {"results": [{"site": "YouTube", "key": "abc", "type": "Trailer"}]}
                }))
            }),
        );
        let base = spawn_server(router).await;
        let client = client_for(base, Auth::Bearer("v4-token".to_string()));

        let details = client.details(ContentKind::Movie, 7).await.unwrap();
        assert_eq!(details.cast, vec!["Ben Whishaw (Paddington)".to_string()]);
        assert_eq!(
            details.trailer_url.as_deref(),
            Some("https://www.youtube.com/watch?v=abc")
        );
    }

    #[test]
    fn test_with_auth_changes_fingerprint() {
        let client = TmdbClient::new(&Config::default(), None).unwrap();
        assert_eq!(client.auth_fingerprint(), Uuid::nil());

        let authed = TmdbClient {
            auth: Some(Auth::ApiKey("k".to_string())),
            ..client
        };
        assert_ne!(authed.auth_fingerprint(), Uuid::nil());
        assert_eq!(authed.name(), "tmdb");
    }
}
