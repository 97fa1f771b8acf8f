use std::time::Duration;

use futures_util::StreamExt;
use pagesnap_logging::{snap_debug, snap_trace};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, LOCATION, USER_AGENT};
use reqwest::{redirect, Client, Response, Url};

use crate::{FailureKind, FetchError, FetchMetadata, FetchOutput};

/// Desktop Chrome identity; plain library user agents get bot-blocked by many sites.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    /// Applies to each hop of a redirect chain.
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
    pub accept_language: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 10,
            max_bytes: 10 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

/// Single-shot document download. Implementations never retry.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError>;
}

/// HTTP fetcher presenting a browser identity.
///
/// Redirects are followed by hand so the hop count ends up in [`FetchMetadata`].
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    fn client(&self) -> Result<Client, FetchError> {
        Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(redirect::Policy::none())
            .default_headers(self.browser_headers()?)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    fn browser_headers(&self) -> Result<HeaderMap, FetchError> {
        let value = |name: &str, raw: &str| {
            HeaderValue::from_str(raw).map_err(|err| {
                FetchError::new(FailureKind::Network, format!("bad {name} header: {err}"))
            })
        };
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, value("user-agent", &self.settings.user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(
            ACCEPT_LANGUAGE,
            value("accept-language", &self.settings.accept_language)?,
        );
        Ok(headers)
    }

    /// Sends GET requests until a non-redirect response arrives.
    async fn follow(&self, client: &Client, start: Url) -> Result<(Response, usize), FetchError> {
        let mut current = start;
        let mut hops = 0;
        loop {
            let response = client
                .get(current.clone())
                .send()
                .await
                .map_err(map_reqwest_error)?;
            let Some(next) = redirect_target(&current, &response) else {
                return Ok((response, hops));
            };
            hops += 1;
            if hops > self.settings.redirect_limit {
                return Err(FetchError::new(
                    FailureKind::RedirectLimitExceeded,
                    format!("more than {} redirects", self.settings.redirect_limit),
                ));
            }
            snap_trace!("redirect {} -> {}", current, next);
            current = next;
        }
    }

    /// Streams the body, aborting as soon as it outgrows `max_bytes`.
    async fn read_body(&self, response: Response) -> Result<Vec<u8>, FetchError> {
        let limit = self.settings.max_bytes;
        let too_large = |actual: u64| {
            FetchError::new(
                FailureKind::TooLarge {
                    max_bytes: limit,
                    actual,
                },
                "response body exceeds the size limit",
            )
        };
        if let Some(declared) = response.content_length().filter(|len| *len > limit) {
            return Err(too_large(declared));
        }

        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let grown = (body.len() + chunk.len()) as u64;
            if grown > limit {
                return Err(too_large(grown));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let start = Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = self.client()?;
        let (response, redirect_count) = self.follow(&client, start).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.canonical_reason().unwrap_or("unexpected status"),
            ));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = self.read_body(response).await?;
        snap_debug!(
            "fetched {} ({} bytes, {} redirects)",
            final_url,
            bytes.len(),
            redirect_count
        );

        Ok(FetchOutput {
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url,
                redirect_count,
                status: status.as_u16(),
                content_type,
                byte_len: bytes.len() as u64,
            },
            bytes,
        })
    }
}

/// Next hop for a 3xx response carrying a usable `Location`, resolved against `base`.
fn redirect_target(base: &Url, response: &Response) -> Option<Url> {
    if !response.status().is_redirection() {
        return None;
    }
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    base.join(location).ok()
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else {
        FailureKind::Network
    };
    FetchError::new(kind, err.to_string())
}
