//! Blocking HTTP client for the SubDB API
//!
//! One `SubDbClient` wraps a `reqwest::blocking::Client` configured from an
//! explicit [`ClientConfig`]. Calls never retry; transport failures bubble
//! up as [`SubDbError::Network`] while HTTP statuses are handed back as-is.

use std::path::Path;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::blocking::{Client, Response};
use reqwest::header::{CONTENT_TYPE, PRAGMA};
use reqwest::StatusCode;

use crate::config::{
    API_URL, APP_NAME, APP_URL, APP_VERSION, PROTOCOL_NAME, PROTOCOL_VERSION, SANDBOX_API_URL,
    UPLOAD_TIMEOUT,
};
use crate::errors::Result;
use crate::hashing::movie_hash;
use crate::protocol::{self, Action, Method, SearchHit, UPLOAD_CONTENT_TYPE};

/// Identifies the program talking to the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInfo {
    pub name: String,
    pub version: String,
    pub url: Option<String>,
}

impl ProductInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            url: None,
        }
    }

    /// How the bundled command-line tool identifies itself
    pub fn subdb_cli() -> Self {
        Self::new(APP_NAME, APP_VERSION).with_url(APP_URL)
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// `SubDB/1.0 (name/version; url)` as required by the API
    pub fn user_agent(&self) -> String {
        match &self.url {
            Some(url) => format!(
                "{}/{} ({}/{}; {})",
                PROTOCOL_NAME, PROTOCOL_VERSION, self.name, self.version, url
            ),
            None => format!(
                "{}/{} ({}/{})",
                PROTOCOL_NAME, PROTOCOL_VERSION, self.name, self.version
            ),
        }
    }
}

/// Everything needed to reach the API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub upload_timeout: Duration,
    /// Honor `HTTP_PROXY` and friends from the environment
    pub use_system_proxy: bool,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, product: &ProductInfo) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: product.user_agent(),
            upload_timeout: UPLOAD_TIMEOUT,
            use_system_proxy: true,
        }
    }

    pub fn production(product: &ProductInfo) -> Self {
        Self::new(API_URL, product)
    }

    pub fn sandbox(product: &ProductInfo) -> Self {
        Self::new(SANDBOX_API_URL, product)
    }
}

/// Status and raw payload of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body decoded as UTF-8
    pub fn text(&self) -> String {
        protocol::decode_text(&self.body)
    }
}

/// How the API answered an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Created,
    /// The API already has a subtitle for this hash
    Duplicate,
    Rejected(StatusCode),
}

impl From<StatusCode> for UploadOutcome {
    fn from(status: StatusCode) -> Self {
        if status.is_success() {
            UploadOutcome::Created
        } else if status == StatusCode::FORBIDDEN {
            UploadOutcome::Duplicate
        } else {
            UploadOutcome::Rejected(status)
        }
    }
}

/// SubDB API client
#[derive(Debug, Clone)]
pub struct SubDbClient {
    http: Client,
    config: ClientConfig,
}

impl SubDbClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        // GET requests are unbounded; only uploads carry a timeout
        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(None::<Duration>);
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build()?;
        debug!("SubDB client for {} as {}", config.base_url, config.user_agent);
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Raw `action=languages` response
    pub fn languages(&self) -> Result<ApiResponse> {
        self.send(&Action::Languages, None)
    }

    /// Language codes the API serves, in server order.
    ///
    /// A non-success status is logged and yields an empty list.
    pub fn list_languages(&self) -> Result<Vec<String>> {
        let response = self.languages()?;
        if !response.is_success() {
            warn!("Language list request answered {}", response.status);
            return Ok(Vec::new());
        }
        let languages = protocol::parse_languages(&response.text());
        info!("API offers {} languages", languages.len());
        Ok(languages)
    }

    /// Raw `action=search` response
    pub fn search(&self, hash: &str, version: Option<&str>) -> Result<ApiResponse> {
        let action = Action::Search {
            hash: hash.to_string(),
            version: version.map(str::to_string),
        };
        self.send(&action, None)
    }

    /// Languages available for `hash`; empty when the API has nothing
    pub fn search_languages(&self, hash: &str, version: Option<&str>) -> Result<Vec<SearchHit>> {
        let response = self.search(hash, version)?;
        if !response.is_success() {
            debug!("Search for {} answered {}", hash, response.status);
            return Ok(Vec::new());
        }
        Ok(protocol::parse_search(&response.text()))
    }

    /// Raw subtitle bytes; non-200 means no subtitle for that hash/language
    pub fn download(&self, hash: &str, language: &str) -> Result<ApiResponse> {
        let action = Action::Download {
            hash: hash.to_string(),
            language: language.to_string(),
        };
        self.send(&action, None)
    }

    /// POST a subtitle for `hash`. Returns the status the API answered with.
    pub fn upload(&self, hash: &str, subtitle: &str) -> Result<StatusCode> {
        let action = Action::Upload {
            hash: hash.to_string(),
        };
        let response = self.send(&action, Some(protocol::upload_body(hash, subtitle)))?;
        info!("Upload for {} answered {}", hash, response.status);
        Ok(response.status)
    }

    /// Hash `movie` and upload the subtitle file next to it.
    pub fn upload_file(&self, movie: &Path, subtitle: &Path) -> Result<UploadOutcome> {
        let hash = movie_hash(movie)?;
        let bytes = std::fs::read(subtitle)?;
        let (text, _) = crate::encoding::decode_subtitle(&bytes);
        Ok(self.upload(&hash, &text)?.into())
    }

    /// Issue `action` with the method it calls for. POSTs carry the
    /// multipart headers and the upload timeout.
    fn send(&self, action: &Action, body: Option<String>) -> Result<ApiResponse> {
        let url = action.url(&self.config.base_url);
        let method = action.method();
        let mut request = match method {
            Method::Get => self.http.get(&url),
            Method::Post => self
                .http
                .post(&url)
                .header(CONTENT_TYPE, UPLOAD_CONTENT_TYPE)
                .header(PRAGMA, "no-cache")
                .timeout(self.config.upload_timeout),
        };
        match body {
            Some(body) => {
                debug!("{} {} ({} bytes)", method.as_str(), url, body.len());
                request = request.body(body);
            }
            None => debug!("{} {}", method.as_str(), url),
        }
        Self::read_response(request.send()?)
    }

    fn read_response(response: Response) -> Result<ApiResponse> {
        let status = response.status();
        let body = response.bytes()?.to_vec();
        debug!("Response {} ({} bytes)", status, body.len());
        Ok(ApiResponse { status, body })
    }
}
