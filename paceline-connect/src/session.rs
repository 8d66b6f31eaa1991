//! Session restore — secret blob to credential handle.
//!
//! The secret is the base64-encoded JSON token dump produced by the
//! vendor's auth tooling. Restore decodes it, pulls out the OAuth2 access
//! token, and builds an HTTP client pinned to the region's endpoint
//! family. The China deployment sits behind certificates the default
//! trust store rejects, so that region relaxes TLS verification.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use thiserror::Error;

use paceline_core::Region;

const USER_AGENT: &str = concat!("paceline/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors restoring or building a session.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The secret blob could not be decoded into a token dump.
    #[error("malformed secret blob: {0}")]
    Secret(String),

    /// HTTP client construction failed.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Authenticated handle for one account against one endpoint family.
pub struct Session {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) token: String,
}

impl Session {
    /// Restore a session from a secret blob for `region`.
    ///
    /// The blob is validated structurally here; whether the remote still
    /// accepts the token surfaces on the first API call.
    pub fn restore(secret: &str, region: Region) -> Result<Self, ConnectError> {
        let token = parse_secret(secret)?;
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT);
        if region == Region::China {
            builder = builder.danger_accept_invalid_certs(true);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url(region).to_owned(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// API host per endpoint family.
pub(crate) fn base_url(region: Region) -> &'static str {
    match region {
        Region::Global => "https://connectapi.garmin.com",
        Region::China => "https://connectapi.garmin.cn",
    }
}

// ---------------------------------------------------------------------------
// Secret blob parsing
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct TokenDump {
    #[serde(default)]
    oauth2_token: Option<Oauth2Token>,
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct Oauth2Token {
    access_token: String,
}

/// Extract the OAuth2 access token from a secret blob.
///
/// Accepts the base64-wrapped dump the vendor tooling prints, or the bare
/// JSON dump itself.
pub(crate) fn parse_secret(secret: &str) -> Result<String, ConnectError> {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return Err(ConnectError::Secret("empty secret".to_owned()));
    }

    let json = match BASE64.decode(trimmed.as_bytes()) {
        Ok(bytes) => String::from_utf8(bytes)
            .map_err(|_| ConnectError::Secret("decoded blob is not UTF-8".to_owned()))?,
        // Not base64 — treat the value as the raw JSON dump.
        Err(_) => trimmed.to_owned(),
    };

    let dump: TokenDump = serde_json::from_str(&json)
        .map_err(|e| ConnectError::Secret(format!("token dump is not valid JSON: {e}")))?;

    let token = dump
        .oauth2_token
        .map(|t| t.access_token)
        .or(dump.access_token)
        .unwrap_or_default();
    if token.is_empty() {
        return Err(ConnectError::Secret(
            "token dump has no oauth2 access token".to_owned(),
        ));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"{"oauth2_token":{"access_token":"tok-123","token_type":"Bearer"}}"#;

    #[test]
    fn parses_bare_json_dump() {
        assert_eq!(parse_secret(DUMP).unwrap(), "tok-123");
    }

    #[test]
    fn parses_base64_wrapped_dump() {
        let encoded = BASE64.encode(DUMP.as_bytes());
        assert_eq!(parse_secret(&encoded).unwrap(), "tok-123");
    }

    #[test]
    fn accepts_flat_access_token_shape() {
        assert_eq!(
            parse_secret(r#"{"access_token":"tok-9"}"#).unwrap(),
            "tok-9"
        );
    }

    #[test]
    fn rejects_garbage_and_empty_secrets() {
        assert!(matches!(parse_secret("   "), Err(ConnectError::Secret(_))));
        assert!(matches!(
            parse_secret("not json at all"),
            Err(ConnectError::Secret(_))
        ));
        assert!(matches!(
            parse_secret(r#"{"oauth1_token":"only"}"#),
            Err(ConnectError::Secret(_))
        ));
    }

    #[test]
    fn region_selects_endpoint_family() {
        assert!(base_url(Region::Global).contains("garmin.com"));
        assert!(base_url(Region::China).contains("garmin.cn"));
    }

    #[test]
    fn restore_builds_session_for_both_regions() {
        for region in [Region::Global, Region::China] {
            let session = Session::restore(DUMP, region).unwrap();
            assert_eq!(session.base_url(), base_url(region));
            assert_eq!(session.token, "tok-123");
        }
    }
}
