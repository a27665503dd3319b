//! Static HTTP sessions backed by `reqwest`.
//!
//! A static page fetches a URL once and answers every question from that
//! document. This is enough for JSON endpoints and for listings whose
//! pagination controls are plain links: clicking an anchor follows its
//! `href`. [`Page::peek`] fetches article pages with the same client while
//! the listing stays current. Script-driven controls (a `<button>` that
//! loads more cards) are reported as not visible, so show-more listings end
//! after their first batch instead of failing; clicking one anyway is
//! [`ScrapeError::Unsupported`]. Scrolling never loads anything new, so
//! infinite-scroll listings also end after their first batch.

use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use super::cookies::{cookie_jar, load_cookies};
use super::{Page, SessionConfig, SessionProvider};
use crate::error::{Result, ScrapeError};

/// Opens [`HttpPage`]s that share one client (and cookie jar).
#[derive(Debug, Clone)]
pub struct HttpSessionProvider {
    client: Client,
}

impl HttpSessionProvider {
    /// Build a provider, loading the cookie file first when one is configured.
    #[instrument(level = "info", skip_all, fields(headless = config.headless))]
    pub async fn new(config: &SessionConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(60));

        if let Some(path) = &config.cookies {
            let cookies = load_cookies(path).await?;
            builder = builder.cookie_provider(cookie_jar(&cookies));
        } else {
            builder = builder.cookie_store(true);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl SessionProvider for HttpSessionProvider {
    type Page = HttpPage;

    async fn open(&self) -> Result<HttpPage> {
        Ok(HttpPage {
            client: self.client.clone(),
            url: None,
            body: String::new(),
        })
    }
}

/// One fetched document and the URL it came from.
#[derive(Debug)]
pub struct HttpPage {
    client: Client,
    url: Option<Url>,
    body: String,
}

impl HttpPage {
    fn matches(&self, selector: &str) -> Result<bool> {
        let selector = parse_selector(selector)?;
        Ok(Html::parse_document(&self.body).select(&selector).next().is_some())
    }

    /// GET `url`, returning the final URL after redirects and the body.
    async fn fetch(&self, url: &str) -> Result<(Url, String)> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), %url, "Non-success response");
            return Err(ScrapeError::Transport {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let final_url = response.url().clone();
        Ok((final_url, response.text().await?))
    }

    /// `href` resolved against the current URL; unchanged before the first
    /// navigation.
    fn resolve(&self, href: &str) -> Result<String> {
        match &self.url {
            Some(base) => base
                .join(href)
                .map(String::from)
                .map_err(|e| ScrapeError::parse("href", format!("{href}: {e}"))),
            None => Ok(href.to_string()),
        }
    }

    /// `href` of the first element matching `selector`, resolved against the
    /// current URL. `Ok(None)` when the element exists but is not a link.
    fn link_target(&self, selector: &str) -> Result<Option<String>> {
        let parsed = parse_selector(selector)?;
        let document = Html::parse_document(&self.body);
        let element = document.select(&parsed).next().ok_or_else(|| ScrapeError::Render {
            selector: selector.to_string(),
            timeout_ms: 0,
        })?;

        let Some(href) = element.value().attr("href") else {
            return Ok(None);
        };
        self.resolve(href).map(Some)
    }
}

impl Page for HttpPage {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn goto(&mut self, url: &str) -> Result<()> {
        let (final_url, body) = self.fetch(url).await?;
        self.url = Some(final_url);
        self.body = body;
        debug!(bytes = self.body.len(), "Fetched page");
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        if self.matches(selector)? {
            Ok(())
        } else {
            Err(ScrapeError::Render {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }

    async fn content(&mut self) -> Result<String> {
        Ok(self.body.clone())
    }

    /// Only link-backed elements count as visible: nothing else can be acted on.
    async fn is_visible(&mut self, selector: &str) -> Result<bool> {
        if !self.matches(selector)? {
            return Ok(false);
        }
        Ok(self.link_target(selector)?.is_some())
    }

    #[instrument(level = "debug", skip_all, fields(%selector))]
    async fn click(&mut self, selector: &str) -> Result<()> {
        match self.link_target(selector)? {
            Some(target) => self.goto(&target).await,
            None => Err(ScrapeError::Unsupported(format!(
                "click non-link element `{selector}` without a script engine"
            ))),
        }
    }

    async fn scroll_into_view_last(&mut self, _selector: &str) -> Result<()> {
        Ok(())
    }

    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn peek(&mut self, url: &str) -> Result<String> {
        let target = self.resolve(url)?;
        let (_, body) = self.fetch(&target).await?;
        debug!(bytes = body.len(), "Fetched side document");
        Ok(body)
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector(format!("{selector}: {e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with(url: &str, body: &str) -> HttpPage {
        HttpPage {
            client: Client::new(),
            url: Some(Url::parse(url).unwrap()),
            body: body.to_string(),
        }
    }

    const LISTING: &str = r#"
        <html><body>
          <div class="cards"><article><a href="/insights/one">One</a></article></div>
          <nav><a class="pag-button pag-next" href="?page=2">Next</a></nav>
          <div class="show-more-container"><button>Show more</button></div>
        </body></html>
    "#;

    #[tokio::test]
    async fn test_wait_for_present_and_missing() {
        let mut page = page_with("https://firm.test/insights", LISTING);
        assert!(page.wait_for("div.cards", Duration::from_secs(1)).await.is_ok());

        let err = page
            .wait_for("div.card-grid", Duration::from_millis(1500))
            .await
            .unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(err, ScrapeError::Render { timeout_ms: 1500, .. }));
    }

    #[tokio::test]
    async fn test_is_visible_checks_document() {
        let mut page = page_with("https://firm.test/insights", LISTING);
        assert!(page.is_visible("a.pag-next").await.unwrap());
        assert!(!page.is_visible("a[data-page=\"2\"]").await.unwrap());
        assert!(!page.is_visible("div.show-more-container > button").await.unwrap());
    }

    #[test]
    fn test_link_target_resolves_relative_href() {
        let page = page_with("https://firm.test/insights?page=1", LISTING);
        assert_eq!(
            page.link_target("a.pag-button.pag-next").unwrap(),
            Some("https://firm.test/insights?page=2".to_string())
        );
        assert_eq!(page.link_target("div.show-more-container > button").unwrap(), None);
    }

    #[tokio::test]
    async fn test_click_button_is_unsupported() {
        let mut page = page_with("https://firm.test/insights", LISTING);
        let err = page.click("div.show-more-container > button").await.unwrap_err();
        assert!(matches!(err, ScrapeError::Unsupported(_)));
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let page = page_with("https://firm.test/insights/list?page=1", LISTING);
        assert_eq!(page.resolve("detail").unwrap(), "https://firm.test/insights/detail");
        assert_eq!(page.resolve("/a/b").unwrap(), "https://firm.test/a/b");
        assert_eq!(page.resolve("https://other.test/x").unwrap(), "https://other.test/x");
    }

    #[test]
    fn test_invalid_selector() {
        assert!(matches!(parse_selector("div[[["), Err(ScrapeError::Selector(_))));
    }
}
