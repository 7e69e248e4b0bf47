//! Authenticated Instagram web session.
//!
//! [`InstagramClient`] logs in once with a username/password pair and then
//! serves post, profile and location lookups over the web API. Instagram's
//! session is not designed for concurrent use, so every outbound request is
//! serialized through a single lock.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, ORIGIN, REFERER};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{FetchError, LoginError};

use super::parse;
use super::post::{Location, OwnerProfile, PostRecord};
use super::shortcode::media_id_to_shortcode;
use super::{PostSource, SidecarNodes};

// =============================================================================
// Constants
// =============================================================================

/// Web origin serving login, GraphQL and location pages.
pub const DEFAULT_BASE_URL: &str = "https://www.instagram.com";

/// Private API host serving profile lookups.
pub const DEFAULT_API_BASE_URL: &str = "https://i.instagram.com";

/// Instagram internal app ID (public, embedded in the web app).
const IG_APP_ID: &str = "936619743392459";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// GraphQL persisted query returning a post by shortcode.
///
/// Instagram rotates these ids from time to time; override through
/// [`ClientOptions::graphql_doc_id`].
pub const DEFAULT_GRAPHQL_DOC_ID: &str = "8845758582119845";

/// Default timeout for a single HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

// =============================================================================
// Options
// =============================================================================

/// Login credentials.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Tunables for the session client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Timeout for each HTTP request
    pub request_timeout: Duration,

    /// GraphQL persisted query id for post lookups
    pub graphql_doc_id: String,

    /// Origin of the web endpoints, without a trailing slash
    pub base_url: String,

    /// Origin of the profile endpoint, without a trailing slash
    pub api_base_url: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            graphql_doc_id: DEFAULT_GRAPHQL_DOC_ID.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// A logged-in Instagram session.
pub struct InstagramClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base: Url,
    csrf_token: String,
    username: String,
    options: ClientOptions,

    /// Held for the duration of every outbound request
    gate: Mutex<()>,
}

impl InstagramClient {
    /// Log in and return a ready session.
    ///
    /// This performs two requests: one to obtain a CSRF token and one to
    /// submit the credentials. No retry is attempted on failure.
    pub async fn login(
        credentials: &Credentials,
        mut options: ClientOptions,
    ) -> Result<Self, LoginError> {
        options.base_url = options.base_url.trim_end_matches('/').to_string();
        options.api_base_url = options.api_base_url.trim_end_matches('/').to_string();

        let base = Url::parse(&options.base_url)
            .map_err(|e| LoginError::InvalidBaseUrl(format!("{}: {}", options.base_url, e)))?;
        let origin = HeaderValue::from_str(&options.base_url)
            .map_err(|e| LoginError::InvalidBaseUrl(format!("{}: {}", options.base_url, e)))?;

        let jar = Arc::new(Jar::default());
        jar.add_cookie_str("ig_pr=1", &base);
        jar.add_cookie_str("ig_vw=1920", &base);

        let http = build_http_client(&jar, origin, options.request_timeout)
            .map_err(|e| LoginError::Connection(e.without_url().to_string()))?;

        let login_page = format!("{}/accounts/login/", options.base_url);

        // The login page sets the csrftoken cookie
        let response = http
            .get(&login_page)
            .send()
            .await
            .map_err(|e| LoginError::Connection(e.without_url().to_string()))?;
        if !response.status().is_success() {
            return Err(LoginError::Connection(format!(
                "HTTP error code {}.",
                response.status().as_u16()
            )));
        }

        let csrf_token = cookie_value(&jar, &base, "csrftoken").ok_or_else(|| {
            LoginError::UnexpectedResponse("login page did not set a csrftoken cookie".to_string())
        })?;

        let enc_password = format!(
            "#PWD_INSTAGRAM_BROWSER:0:{}:{}",
            Utc::now().timestamp(),
            credentials.password
        );

        let response = http
            .post(format!("{}/api/v1/web/accounts/login/ajax/", options.base_url))
            .header("X-CSRFToken", &csrf_token)
            .header("X-IG-App-ID", IG_APP_ID)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(REFERER, &login_page)
            .form(&[
                ("enc_password", enc_password.as_str()),
                ("username", credentials.username.as_str()),
            ])
            .send()
            .await
            .map_err(|e| LoginError::Connection(e.without_url().to_string()))?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            LoginError::UnexpectedResponse(format!(
                "HTTP {} with non-JSON body: {}",
                status,
                e.without_url()
            ))
        })?;

        interpret_login_response(&options.base_url, &credentials.username, &body)?;

        // Instagram rotates the token on login
        let csrf_token = cookie_value(&jar, &base, "csrftoken").unwrap_or(csrf_token);

        info!(username = %credentials.username, "Logged in to Instagram");

        Ok(Self {
            http,
            jar,
            base,
            csrf_token,
            username: credentials.username.clone(),
            options,
            gate: Mutex::new(()),
        })
    }

    /// The account this session is logged in as.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether the session still holds a `sessionid` cookie.
    pub fn has_session_cookie(&self) -> bool {
        cookie_value(&self.jar, &self.base, "sessionid").is_some_and(|v| !v.is_empty())
    }

    /// Fetch the full profile of a user.
    pub async fn profile(&self, username: &str) -> Result<OwnerProfile, FetchError> {
        let request = self
            .http
            .get(format!(
                "{}/api/v1/users/web_profile_info/?username={}",
                self.options.api_base_url,
                urlencoding::encode(username)
            ))
            .header("X-IG-App-ID", IG_APP_ID)
            .header("X-CSRFToken", &self.csrf_token);

        let body = self.send_json(request).await?;

        let user = body
            .pointer("/data/user")
            .filter(|user| user.is_object())
            .ok_or_else(|| FetchError::NotFound(format!("Profile {} does not exist.", username)))?;

        Ok(parse::parse_profile(user))
    }

    /// Send a request while holding the session lock and decode its JSON body.
    async fn send_json(&self, request: RequestBuilder) -> Result<Value, FetchError> {
        let _guard = self.gate.lock().await;

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Connection(e.without_url().to_string()))?;

        let status = response.status();
        let url = response.url().path().to_string();
        debug!(status = status.as_u16(), path = %url, "Instagram response");

        match status {
            StatusCode::NOT_FOUND => {
                return Err(FetchError::NotFound(format!("404 Not Found: {}", url)));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(FetchError::Connection(format!(
                    "429 Too Many Requests: {}",
                    url
                )));
            }
            s if !s.is_success() => {
                return Err(FetchError::Connection(format!(
                    "HTTP error code {}.",
                    s.as_u16()
                )));
            }
            _ => {}
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_decode() {
                FetchError::Other(format!("JSON decode fail: {}", e))
            } else {
                FetchError::Connection(e.without_url().to_string())
            }
        })?;

        check_response_status(&body)?;

        Ok(body)
    }
}

#[async_trait]
impl PostSource for InstagramClient {
    async fn post_by_shortcode(&self, shortcode: &str) -> Result<PostRecord, FetchError> {
        let variables = serde_json::json!({ "shortcode": shortcode }).to_string();

        let request = self
            .http
            .post(format!("{}/graphql/query", self.options.base_url))
            .header("X-CSRFToken", &self.csrf_token)
            .header("X-IG-App-ID", IG_APP_ID)
            .header(REFERER, format!("{}/p/{}/", self.options.base_url, shortcode))
            .form(&[
                ("variables", variables.as_str()),
                ("doc_id", self.options.graphql_doc_id.as_str()),
                ("server_timestamps", "true"),
            ]);

        let body = self.send_json(request).await?;

        let node = parse::media_node(&body).ok_or_else(|| {
            FetchError::NotFound(format!("Fetching Post metadata failed for {}", shortcode))
        })?;

        let mut post = parse::parse_post(node)?;

        if !post.owner.username.is_empty() {
            let embedded_id = post.owner.id;
            post.owner = self.profile(&post.owner.username).await?;
            if post.owner.id == 0 {
                post.owner.id = embedded_id;
            }
        }

        debug!(
            shortcode = %post.shortcode,
            post_type = post.post_type.as_str(),
            "Fetched post"
        );

        Ok(post)
    }

    async fn post_by_media_id(&self, media_id: u64) -> Result<PostRecord, FetchError> {
        let shortcode = media_id_to_shortcode(media_id);
        let post = self.post_by_shortcode(&shortcode).await?;

        if let Some(fetched) = post.media_id.filter(|&id| id != media_id) {
            warn!(
                requested = media_id,
                fetched, "Media id of fetched post does not match the requested one"
            );
        }

        Ok(post)
    }

    async fn location(&self, post: &PostRecord) -> Result<Option<Location>, FetchError> {
        let Some(location) = &post.location else {
            return Ok(None);
        };

        // The embedded reference is enough when it already carries a name
        if let Some(name) = &location.name {
            return Ok(Some(Location {
                id: location.id,
                name: name.clone(),
            }));
        }

        let request = self
            .http
            .get(format!(
                "{}/explore/locations/{}/?__a=1&__d=dis",
                self.options.base_url, location.id
            ))
            .header("X-IG-App-ID", IG_APP_ID)
            .header("X-CSRFToken", &self.csrf_token);

        let body = self.send_json(request).await?;

        let info = body
            .pointer("/native_location_data/location_info")
            .ok_or_else(|| {
                FetchError::Other(format!("location {} page has no location_info", location.id))
            })?;

        parse::parse_location(location.id, info).map(Some)
    }

    async fn sidecar_nodes(&self, post: &PostRecord) -> SidecarNodes {
        if !post.post_type.is_sidecar() {
            return Box::new(std::iter::empty());
        }

        if post.sidecar_edges.is_empty() {
            let err = FetchError::Other(format!(
                "carousel post {} has no edge_sidecar_to_children",
                post.shortcode
            ));
            return Box::new(std::iter::once(Err(err)));
        }

        let edges = post.sidecar_edges.clone();
        Box::new(
            edges
                .into_iter()
                .enumerate()
                .map(|(index, edge)| parse::parse_sidecar_edge(index, &edge)),
        )
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn build_http_client(
    jar: &Arc<Jar>,
    origin: HeaderValue,
    timeout: Duration,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.8"));
    headers.insert(ORIGIN, origin);

    reqwest::Client::builder()
        .cookie_provider(Arc::clone(jar))
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .build()
}

/// Read a single cookie value from the jar.
fn cookie_value(jar: &Jar, url: &Url, name: &str) -> Option<String> {
    let header = jar.cookies(url)?;
    let header = header.to_str().ok()?;
    parse_cookie_header(header, name)
}

fn parse_cookie_header(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// Interpret the JSON body returned by the login endpoint.
fn interpret_login_response(
    base_url: &str,
    username: &str,
    body: &Value,
) -> Result<(), LoginError> {
    if body.get("two_factor_required").and_then(Value::as_bool) == Some(true) {
        return Err(LoginError::TwoFactorRequired(username.to_string()));
    }

    if let Some(url) = body.get("checkpoint_url").and_then(Value::as_str) {
        return Err(LoginError::Checkpoint(format!("{}{}", base_url, url)));
    }

    let status = body.get("status").and_then(Value::as_str).unwrap_or("");
    if status != "ok" {
        let message = body.get("message").and_then(Value::as_str).unwrap_or("");
        return Err(LoginError::UnexpectedResponse(format!(
            "\"{}\" status, message \"{}\".",
            status, message
        )));
    }

    match body.get("authenticated").and_then(Value::as_bool) {
        Some(true) => Ok(()),
        Some(false) if body.get("user").and_then(Value::as_bool) == Some(true) => {
            Err(LoginError::BadCredentials)
        }
        Some(false) => Err(LoginError::UserNotFound(username.to_string())),
        None => Err(LoginError::UnexpectedResponse(body.to_string())),
    }
}

/// Map an API-level `status` field to an error.
///
/// Instagram sometimes answers 200 OK with `{"status": "fail", ...}`.
fn check_response_status(body: &Value) -> Result<(), FetchError> {
    let status = match body.get("status").and_then(Value::as_str) {
        None | Some("ok") => return Ok(()),
        Some(status) => status,
    };

    let message = body.get("message").and_then(Value::as_str).unwrap_or("");
    if message.contains("wait a few minutes") || message.contains("rate limited") {
        return Err(FetchError::Connection(format!(
            "429 Too Many Requests: {}",
            message
        )));
    }

    Err(FetchError::Connection(format!(
        "Returned \"{}\" status, message \"{}\".",
        status, message
    )))
}
