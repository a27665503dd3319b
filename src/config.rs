//! YAML run configuration.
//!
//! Every field has a default, so an empty file (or no file at all) is a valid
//! configuration. Command-line flags override whatever the file says; see
//! [`AppConfig::apply_cli`].
//!
//! ```yaml
//! session:
//!   headless: true
//!   cookies: ~/.config/insights/cookies.json
//!   wait_timeout_ms: 30000
//! max_concurrent: 3
//! settle_ms: 2000
//! launch_jitter_ms: [1000, 2000]
//! retry:
//!   attempts: 2
//!   delay_ms: 2000
//! parallel_sources: 4
//! ```

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::cli::Cli;
use crate::error::{Result, ScrapeError};
use crate::gate;
use crate::orchestrator::{self, OrchestratorSettings};
use crate::retry::{self, RetryPolicy};
use crate::session::{DEFAULT_USER_AGENT, SessionConfig};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionSection {
    pub headless: bool,
    pub user_agent: String,
    pub cookies: Option<PathBuf>,
    pub wait_timeout_ms: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cookies: None,
            wait_timeout_ms: orchestrator::DEFAULT_WAIT_TIMEOUT.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrySection {
    pub attempts: usize,
    pub delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            attempts: retry::DEFAULT_ATTEMPTS,
            delay_ms: retry::DEFAULT_DELAY.as_millis() as u64,
        }
    }
}

/// Complete run configuration after defaults are filled in.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionSection,
    /// Rendering sessions allowed open at once.
    pub max_concurrent: usize,
    /// Delay after each pagination step.
    pub settle_ms: u64,
    /// Random pause range before each session launch, in milliseconds.
    pub launch_jitter_ms: [u64; 2],
    pub retry: RetrySection,
    /// Sources fetched at once.
    pub parallel_sources: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session: SessionSection::default(),
            max_concurrent: gate::DEFAULT_CAPACITY,
            settle_ms: orchestrator::DEFAULT_SETTLE.as_millis() as u64,
            launch_jitter_ms: [1_000, 2_000],
            retry: RetrySection::default(),
            parallel_sources: 4,
        }
    }
}

impl AppConfig {
    /// Parse a YAML document. An empty document yields the defaults.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| ScrapeError::Config(e.to_string()))
    }

    /// Read and parse the YAML file at `path`.
    #[instrument(level = "info", skip_all, fields(path = %path))]
    pub async fn load(path: &str) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ScrapeError::Config(format!("{path}: {e}")))?;
        let config = Self::from_yaml(&text)?;
        debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Overlay command-line flags that were given.
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(path) = &cli.cookies {
            self.session.cookies = Some(PathBuf::from(path));
        }
        if cli.headful {
            self.session.headless = false;
        }
        if let Some(n) = cli.max_concurrent {
            self.max_concurrent = n;
        }
        self
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            headless: self.session.headless,
            user_agent: self.session.user_agent.clone(),
            cookies: self.session.cookies.clone(),
        }
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            settle: Duration::from_millis(self.settle_ms),
            wait_timeout: Duration::from_millis(self.session.wait_timeout_ms),
        }
    }

    pub fn launch_jitter(&self) -> RangeInclusive<Duration> {
        let [lo, hi] = self.launch_jitter_ms;
        Duration::from_millis(lo.min(hi))..=Duration::from_millis(lo.max(hi))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry.attempts, Duration::from_millis(self.retry.delay_ms))
    }
}
