//! Command-line interface definitions for Insight Harvester.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Output and cookie paths can also come from environment variables.

use clap::Parser;

use crate::horizon::FetchHorizon;

/// Command-line arguments for the Insight Harvester application.
///
/// Flags given here take precedence over the YAML configuration file, which
/// in turn takes precedence over built-in defaults.
///
/// # Examples
///
/// ```sh
/// # Newest batch from every firm
/// insight_harvester -j ./json
///
/// # Six months of BDO and Marcum
/// insight_harvester -s bdo -s marcum -f 6m
///
/// # One PwC Viewpoint search, everything it has
/// insight_harvester -s pwc -f all -u 'https://viewpoint.pwc.com/...&start={page}&rows=20'
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Source to fetch (repeatable). Defaults to every registered source
    #[arg(short, long = "source", value_name = "NAME")]
    pub sources: Vec<String>,

    /// How far back to go: `first`, `all`, or `<N>m` for N months
    #[arg(short, long, default_value = "first")]
    pub fetch: String,

    /// Replace the listing URLs of the selected source
    #[arg(short, long)]
    pub url: Option<String>,

    /// Output directory for the per-source JSON files
    #[arg(short, long, env = "INSIGHTS_JSON_DIR", default_value = "./json")]
    pub json_output_dir: String,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Browser-exported cookie file for authenticated sessions
    #[arg(long, env = "INSIGHTS_COOKIES")]
    pub cookies: Option<String>,

    /// Show the browser window instead of running headless. Only affects
    /// browser-backed session providers; the built-in HTTP session ignores it
    #[arg(long)]
    pub headful: bool,

    /// Maximum rendering sessions open at once
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Print the registered sources and exit
    #[arg(long)]
    pub list: bool,
}

impl Cli {
    pub fn horizon(&self) -> FetchHorizon {
        FetchHorizon::parse(&self.fetch)
    }
}
