use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "epsg-view")]
#[command(about = "Resolve an EPSG search into a map projection and viewport")]
pub struct CliConfig {
    /// Free-text search, e.g. "25832" or "WGS 84 / UTM zone 32N"
    #[arg(short, long)]
    pub query: Option<String>,

    /// Page URL or query string carrying a projQuery parameter
    #[arg(long)]
    pub page_url: Option<String>,

    /// Registry search endpoint (overrides the config file)
    #[arg(long)]
    pub registry_endpoint: Option<String>,

    /// Registry request timeout in seconds (overrides the config file)
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Code searched on startup when no query or projQuery is given
    #[arg(long)]
    pub default_hint: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Toggle base layer N (1-based) as if clicked in the layer switcher
    #[arg(long)]
    pub base_layer: Option<usize>,

    #[arg(long, help = "Show the graticule")]
    pub graticule: bool,

    #[arg(long, help = "Show the graticule outline")]
    pub graticule_outline: bool,

    #[arg(long, help = "Render tile reprojection edges")]
    pub render_edges: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}
