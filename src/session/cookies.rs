//! Loading pre-captured cookies for authenticated sessions.
//!
//! The file is the JSON array produced by common browser cookie-export
//! extensions. Only persistent cookies (those with an `expirationDate`) are
//! replayed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::{Result, ScrapeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn from_export(raw: Option<&str>) -> Self {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("strict") => SameSite::Strict,
            Some("lax") => SameSite::Lax,
            _ => SameSite::None,
        }
    }

    fn as_attr(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Raw entry as written by the export tool.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportedCookie {
    name: String,
    value: String,
    domain: String,
    path: Option<String>,
    #[serde(default)]
    http_only: bool,
    #[serde(default)]
    secure: bool,
    same_site: Option<String>,
    expiration_date: Option<f64>,
}

/// A cookie ready to be installed before the first navigation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    /// Expiry as Unix seconds.
    pub expires: i64,
}

impl Cookie {
    /// `Set-Cookie` style header value for a cookie jar.
    pub fn to_header(&self) -> String {
        let mut header = format!(
            "{}={}; Domain={}; Path={}; SameSite={}",
            self.name,
            self.value,
            self.domain,
            self.path,
            self.same_site.as_attr()
        );
        if let Some(at) = DateTime::<Utc>::from_timestamp(self.expires, 0) {
            header.push_str(&format!("; Expires={}", at.format("%a, %d %b %Y %H:%M:%S GMT")));
        }
        if self.secure {
            header.push_str("; Secure");
        }
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        header
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now.timestamp()
    }

    /// URL the cookie applies to, used to scope it inside a jar.
    pub fn origin(&self) -> Result<Url> {
        let host = self.domain.trim_start_matches('.');
        Url::parse(&format!("https://{host}{}", self.path))
            .map_err(|e| ScrapeError::Config(format!("cookie domain {:?}: {e}", self.domain)))
    }
}

/// Parse an exported cookie array, dropping session cookies.
pub fn parse_cookies(json: &str) -> Result<Vec<Cookie>> {
    let raw: Vec<ExportedCookie> = serde_json::from_str(json)?;
    let total = raw.len();
    let cookies: Vec<Cookie> = raw
        .into_iter()
        .filter_map(|c| {
            let expires = c.expiration_date? as i64;
            Some(Cookie {
                same_site: SameSite::from_export(c.same_site.as_deref()),
                path: c.path.unwrap_or_else(|| "/".to_string()),
                name: c.name,
                value: c.value,
                domain: c.domain,
                http_only: c.http_only,
                secure: c.secure,
                expires,
            })
        })
        .collect();
    if cookies.len() < total {
        debug!(dropped = total - cookies.len(), "Skipped cookies without expiry");
    }
    Ok(cookies)
}

/// Read and parse a cookie file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_cookies(path: &Path) -> Result<Vec<Cookie>> {
    let json = tokio::fs::read_to_string(path).await?;
    let cookies = parse_cookies(&json)?;
    info!(count = cookies.len(), "Loaded cookies");
    Ok(cookies)
}

/// Build a jar holding `cookies`. Expired cookies and cookies with unusable
/// domains are skipped.
pub fn cookie_jar(cookies: &[Cookie]) -> Arc<reqwest::cookie::Jar> {
    let jar = reqwest::cookie::Jar::default();
    let now = Utc::now();
    for cookie in cookies {
        if cookie.is_expired_at(now) {
            debug!(name = %cookie.name, expires = cookie.expires, "Skipping expired cookie");
            continue;
        }
        match cookie.origin() {
            Ok(origin) => jar.add_cookie_str(&cookie.to_header(), &origin),
            Err(e) => warn!(name = %cookie.name, error = %e, "Skipping cookie"),
        }
    }
    Arc::new(jar)
}
