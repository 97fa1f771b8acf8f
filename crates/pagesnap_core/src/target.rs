use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlRejection {
    #[error("url is required")]
    Empty,
    #[error("invalid url: {0}")]
    Invalid(String),
    #[error("unsupported url scheme {0}, expected http or https")]
    UnsupportedScheme(String),
}

/// Checks a capture target before any network activity.
///
/// Surrounding whitespace is ignored; the returned URL is parsed but the
/// caller keeps the trimmed input as the entry's `source_url`.
pub fn validate_capture_url(raw: &str) -> Result<Url, UrlRejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlRejection::Empty);
    }
    let url = Url::parse(trimmed).map_err(|err| UrlRejection::Invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UrlRejection::UnsupportedScheme(other.to_string())),
    }
}
