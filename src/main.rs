use clap::Parser;
use epsg_view::utils::error::ErrorSeverity;
use epsg_view::utils::{logger, validation::Validate};
use epsg_view::domain::ports::ConfigProvider;
use epsg_view::{
    CliConfig, EpsgIoRegistry, Resolver, ResolverError, SearchSession, Settings, TomlConfig,
};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting epsg-view");
    tracing::debug!("CLI config: {:?}", cli);

    let file = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(config) => Some(config),
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => None,
    };

    let settings = Settings::from_sources(&cli, file.as_ref());
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let registry = match EpsgIoRegistry::from_config(&settings) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!("❌ Could not build registry client: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    };
    tracing::debug!("Registry endpoint: {}", registry.endpoint());

    let resolver = Resolver::new(registry).with_fallback_projection(settings.fallback_projection());
    let session = SearchSession::new(resolver, settings.initial_map());

    // An explicit query replaces the page-load search.
    let outcome = match &cli.query {
        Some(query) => session.search(query).await,
        None => {
            session
                .bootstrap_from_config(cli.page_url.as_deref(), &settings)
                .await
        }
    };
    tracing::debug!("Search outcome: {:?}", outcome);

    if let Some(layer) = cli.base_layer {
        let toggled = match layer.checked_sub(1) {
            Some(index) => session.with_map(|map| map.toggle_base_layer(index)),
            None => Err(ResolverError::ValidationError {
                message: "base layers are numbered from 1".to_string(),
            }),
        };
        if let Err(e) = toggled {
            tracing::warn!("⚠️ {}", e);
            eprintln!("⚠️ {}", e.user_friendly_message());
        }
    }

    let state = session.state();
    session.finish();

    let map = session.map();
    println!("{}", session.status());
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "state": state,
            "resolution": session.last_resolution(),
            "map": map,
            "layer_switcher": map.layer_switcher_labels(),
        }))?
    );

    Ok(())
}
