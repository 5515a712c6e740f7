use std::sync::Arc;

use roomrank::cli::{Cli, Commands, ConfigAction};
use roomrank::config::Config;
use roomrank::engine::HttpGateway;
use roomrank::error::{Result, RoomrankError};
use roomrank::projection::DisplayResult;
use roomrank::query::{Composer, FusionMode, SearchConfig};
use roomrank::service::SearchService;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Search {
            query,
            dense_weight,
            lexical_weight,
            sparse_weight,
            fusion,
            fusion_window,
            size,
            fields,
            rerank,
            rerank_window,
            min_score,
            lat,
            lon,
            radius,
            min_rating,
            json,
            dry_run,
        } => {
            let mut search = SearchConfig::new(query);
            if let Some(weight) = dense_weight {
                search.weights.dense = weight;
            }
            if let Some(weight) = lexical_weight {
                search.weights.lexical = weight;
            }
            if let Some(weight) = sparse_weight {
                search.weights.sparse = weight;
            }
            search.fusion = match fusion.as_str() {
                "rrf" => FusionMode::Rrf,
                _ => FusionMode::Linear,
            };
            if let Some(window) = fusion_window {
                search.fusion_window = window;
            }
            search.size = size;
            if !fields.is_empty() {
                search.fields = fields;
            }
            search.rerank = rerank;
            if let Some(window) = rerank_window {
                search.rerank_params.window = window;
            }
            if let Some(score) = min_score {
                search.rerank_params.min_score = score;
            }
            search.geo.lat = lat;
            search.geo.lon = lon;
            search.geo.radius_km = radius;
            search.min_rating = min_rating;

            cmd_search(cli.config, cli.profile, search, json, dry_run)?;
        }
        Commands::Raw { file, json } => {
            cmd_raw(cli.config, cli.profile, file, json)?;
        }
        Commands::Warm => {
            cmd_warm(cli.config, cli.profile)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_filter = if verbose {
        "roomrank=debug"
    } else {
        "roomrank=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn cmd_search(
    config_path: Option<std::path::PathBuf>,
    profile: Option<String>,
    search: SearchConfig,
    json: bool,
    dry_run: bool,
) -> Result<()> {
    let config = load_config(config_path, profile)?;

    if dry_run {
        let composer = Composer::new(config.schema.clone(), &config.inference);
        let request = composer.compose(&search)?;
        println!("{}", to_pretty_json(&request)?);
        return Ok(());
    }

    let gateway = Arc::new(HttpGateway::from_config(&config.engine)?);
    let service = SearchService::new(&config, gateway);

    let outcome = runtime()?.block_on(service.search(&search))?;

    if json {
        let payload = serde_json::json!({
            "results": outcome.results,
            "query": outcome.request,
        });
        println!("{}", to_pretty_json(&payload)?);
    } else {
        print_results(&outcome.results);
    }

    Ok(())
}

fn cmd_raw(
    config_path: Option<std::path::PathBuf>,
    profile: Option<String>,
    file: Option<std::path::PathBuf>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path, profile)?;

    let raw = match file {
        Some(path) => std::fs::read_to_string(&path).map_err(|e| RoomrankError::Io {
            source: e,
            context: format!("Failed to read query file: {:?}", path),
        })?,
        None => std::io::read_to_string(std::io::stdin()).map_err(|e| RoomrankError::Io {
            source: e,
            context: "Failed to read query from stdin".to_string(),
        })?,
    };
    let query: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| RoomrankError::Json {
            source: e,
            context: "Failed to parse query document".to_string(),
        })?;

    let gateway = Arc::new(HttpGateway::from_config(&config.engine)?);
    let service = SearchService::new(&config, gateway);

    let results = runtime()?.block_on(service.search_raw(query))?;

    if json {
        let payload = serde_json::json!({ "results": results });
        println!("{}", to_pretty_json(&payload)?);
    } else {
        print_results(&results);
    }

    Ok(())
}

fn cmd_warm(config_path: Option<std::path::PathBuf>, profile: Option<String>) -> Result<()> {
    let config = load_config(config_path, profile)?;

    let gateway = Arc::new(HttpGateway::from_config(&config.engine)?);
    let service = SearchService::new(&config, gateway);

    println!("Warming up inference models...");
    let statuses = runtime()?.block_on(service.warm_up());

    let mut failed = false;
    for (model, status) in statuses {
        match status {
            Ok(()) => println!("  ✓ {}", model),
            Err(e) => {
                failed = true;
                println!("  ✗ {}: {}", model, e);
            }
        }
    }

    if failed {
        return Err(RoomrankError::Config(
            "One or more inference models failed to warm up".to_string(),
        ));
    }
    Ok(())
}

fn cmd_config(config_path: Option<std::path::PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path, None)?;
            let json = serde_json::to_string_pretty(&config).map_err(|e| RoomrankError::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;
            println!("{}", json);
        }
        ConfigAction::Validate { file } => {
            let path = file.unwrap_or_else(|| Config::default_path().unwrap());
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
            println!("  Engine: {} (index: {})", config.engine.endpoint, config.engine.index);
        }
        ConfigAction::Init { force } => {
            let path = Config::default_path()?;

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| RoomrankError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            let config = Config::default();
            config.save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<std::path::PathBuf>, profile: Option<String>) -> Result<Config> {
    let path = config_path.unwrap_or_else(|| Config::default_path().unwrap());

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'roomrank config init' to create one."
        );
        return Ok(Config::default());
    }

    if let Some(profile) = profile {
        Config::load_with_profile(&path, &profile)
    } else {
        Config::load(&path)
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| RoomrankError::Io {
        source: e,
        context: "Failed to create tokio runtime".to_string(),
    })
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| RoomrankError::Json {
        source: e,
        context: "Failed to serialize output".to_string(),
    })
}

fn print_results(results: &[DisplayResult]) {
    if results.is_empty() {
        println!("No results");
        return;
    }

    println!("{} result(s)", results.len());
    for (i, hit) in results.iter().enumerate() {
        println!();
        println!(
            "{}. {} ({}/5) - {}",
            i + 1,
            hit.hotel_name,
            hit.rating,
            hit.city
        );
        println!("   score: {}  id: {}", hit.score, hit.id);
        if hit.address != "N/A" {
            println!("   {}", hit.address);
        }
        for fragment in hit.highlights.iter().take(3) {
            println!("   > {}", fragment);
        }
    }
}
