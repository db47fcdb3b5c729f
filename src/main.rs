use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use bizmap::api::{HereClient, SearchProvider, YelpClient, collect_businesses};
use bizmap::classify::{FilterCriteria, filter_results};
use bizmap::config::{FileConfig, env_var_for, resolve_api_key};
use bizmap::domain::query::{MAX_RADIUS_M, miles_to_meters};
use bizmap::domain::{AddressType, Coordinates, ProviderKind, SearchArea, SearchQuery};
use bizmap::export::{ExportFormat, default_file_name, export_results};
use bizmap::render::{build_table, category_summary, write_geojson, write_map};

/// Dedup radius for --dedup
const DEDUP_DISTANCE_M: f64 = 50.0;

/// Search HERE and Yelp for businesses and map the results
///
/// Examples:
///   # Coffee shops in San Francisco from both providers
///   bizmap -q "coffee shop" -l "San Francisco, CA" --map sf.html
///
///   # Primary plus additional categories, HERE only, exported to CSV
///   bizmap -q "Law Firm" -q "Paralegal" -l "Detroit, MI" -p here -o firms.csv
///
///   # Search around coordinates and keep only listings within 1 km
///   bizmap -q "bakery" --lat 37.7749 --lon -122.4194 --within 1000
///
///   # Use a config file
///   bizmap --config my-search.toml
#[derive(Parser, Debug)]
#[command(name = "bizmap")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches bizmap.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Business category to search for; repeat for up to 4 additional categories
    #[arg(short = 'q', long = "query")]
    queries: Vec<String>,

    /// Location to search in, e.g. "Detroit, MI" or a full address
    #[arg(short = 'l', long)]
    location: Option<String>,

    /// Latitude for direct coordinate input (use with --lon)
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude for direct coordinate input (use with --lat)
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Search radius in miles
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u32).range(1..=25))]
    radius_miles: Option<u32>,

    /// Provider to query; repeat to enable both (default: both)
    #[arg(short = 'p', long = "provider", value_enum)]
    providers: Vec<ProviderKind>,

    /// Results requested per provider and category
    #[arg(long)]
    limit: Option<u32>,

    /// HERE API key (overrides config file and HERE_API_KEY)
    #[arg(long)]
    here_key: Option<String>,

    /// Yelp API key (overrides config file and YELP_API_KEY)
    #[arg(long)]
    yelp_key: Option<String>,

    /// Keep only these categories (label or search term); repeatable
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Keep only listings within this many meters of the search center
    #[arg(long)]
    within: Option<f64>,

    /// Keep only commercial or residential addresses
    #[arg(long, value_enum)]
    address_type: Option<AddressType>,

    /// Keep only listings in this "City, ST" locality; repeatable
    #[arg(long = "locality")]
    localities: Vec<String>,

    /// Drop listings with the same name within 50 m of an earlier one
    #[arg(long)]
    dedup: bool,

    /// Export file (format from --format or the extension)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Export to a timestamped business_listings_*.csv file
    #[arg(long, conflicts_with = "output")]
    export: bool,

    /// Export format
    #[arg(long, value_enum)]
    format: Option<ExportFormat>,

    /// Write an interactive HTML map
    #[arg(long)]
    map: Option<PathBuf>,

    /// Write the results as GeoJSON
    #[arg(long)]
    geojson: Option<PathBuf>,

    /// Do not print the results table
    #[arg(long)]
    no_table: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            Some(FileConfig::from_path(config_path)?)
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load()
    };

    let verbose = args.verbose || file_config.as_ref().map(|c| c.verbose).unwrap_or(false);
    init_logging(verbose);

    let queries = if !args.queries.is_empty() {
        args.queries.clone()
    } else {
        file_config
            .as_ref()
            .map(|c| c.queries.clone())
            .unwrap_or_default()
    };
    let location = args
        .location
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.location.clone()));
    let lat = args.lat.or_else(|| file_config.as_ref().and_then(|c| c.lat));
    let lon = args.lon.or_else(|| file_config.as_ref().and_then(|c| c.lon));
    let radius_miles = args
        .radius_miles
        .or_else(|| file_config.as_ref().map(|c| c.radius_miles))
        .unwrap_or(5);
    let providers = if !args.providers.is_empty() {
        dedup_providers(&args.providers)
    } else {
        file_config
            .as_ref()
            .and_then(|c| c.providers.clone())
            .map(|p| dedup_providers(&p))
            .unwrap_or_else(|| ProviderKind::ALL.to_vec())
    };
    let dedup = args.dedup || file_config.as_ref().map(|c| c.dedup).unwrap_or(false);
    let map_path = args
        .map
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.map.clone()));
    let output = args
        .output
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.output.clone()));

    if queries.iter().all(|q| q.trim().is_empty()) {
        bail!("Please enter a primary business category with --query/-q");
    }
    if location.is_none() && lat.is_none() {
        bail!("Must provide either --location/-l, or --lat and --lon");
    }
    if providers.is_empty() {
        bail!("At least one provider must be enabled");
    }

    let area = match (lat, lon) {
        (Some(lt), Some(ln)) => SearchArea::Point(
            Coordinates::new(lt, ln)
                .with_context(|| format!("Invalid coordinates: ({}, {})", lt, ln))?,
        ),
        _ => SearchArea::Place(location.clone().unwrap_or_default()),
    };
    let radius_m = miles_to_meters(radius_miles).min(MAX_RADIUS_M);
    let mut query = SearchQuery::new(&queries, area, radius_m).context("Invalid search")?;
    if let Some(limit) = args.limit {
        query = query.with_limit(limit);
    }

    println!("bizmap - Business Search");
    println!("========================");
    println!();

    if verbose {
        println!("Configuration:");
        for (i, term) in query.terms().iter().enumerate() {
            println!("  Category {}: {}", i + 1, term);
        }
        println!("  Location: {}", query.area().describe());
        println!("  Radius: {} mi ({}m)", radius_miles, radius_m);
        println!(
            "  Providers: {}",
            providers
                .iter()
                .map(ProviderKind::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("  Dedup: {}", if dedup { "enabled" } else { "disabled" });
        println!();
    }

    let clients = build_providers(&providers, &args, file_config.as_ref())
        .context("Provider configuration error")?;

    let spinner = create_spinner(&format!(
        "Collecting data for {} categories in {}...",
        query.terms().len(),
        query.area().describe()
    ));
    let start = Instant::now();
    let collected = collect_businesses(&clients, &query).context("Failed to collect business data")?;
    spinner.finish_with_message(format!(
        "Collected {} businesses [{:.1}s]",
        collected.len(),
        start.elapsed().as_secs_f32()
    ));

    for warning in collected.warnings() {
        eprintln!("Warning: {}", warning.message);
    }

    let collected = if dedup {
        let deduped = collected.dedup_nearby(DEDUP_DISTANCE_M);
        if verbose {
            println!(
                "  Removed {} duplicate listings",
                collected.len() - deduped.len()
            );
        }
        deduped
    } else {
        collected
    };

    if collected.is_empty() {
        println!(
            "No businesses found in {} for the selected categories.",
            query.area().describe()
        );
    } else {
        println!(
            "Found {} businesses across {} categories!",
            collected.len(),
            query.terms().len()
        );
        println!();
        println!("Results by Category:");
        for line in category_summary(&collected) {
            println!("{}", line);
        }
    }
    println!();

    let criteria = FilterCriteria {
        categories: args.categories.clone(),
        max_distance_m: args.within,
        address_type: args.address_type,
        localities: args.localities.clone(),
    };
    let filtered = filter_results(&collected, &criteria);
    if !criteria.is_empty() {
        if filtered.is_empty() {
            println!("No listings found matching the selected filters.");
        } else {
            println!("Found {} available listings", filtered.len());
        }
        println!();
    }

    if !args.no_table && !filtered.is_empty() {
        println!("{}", build_table(&filtered));
        println!();
    }

    let mut failures = 0;

    if let Some(ref path) = map_path {
        let title = format!("{} - {}", query.primary_term(), query.area().describe());
        match write_map(path, &filtered, &title) {
            Ok(()) => println!("Map: {}", path.display()),
            Err(e) => {
                eprintln!("Error: {}", e);
                failures += 1;
            }
        }
    }

    if let Some(ref path) = args.geojson {
        match write_geojson(path, &filtered) {
            Ok(()) => println!("GeoJSON: {}", path.display()),
            Err(e) => {
                eprintln!("Error: {}", e);
                failures += 1;
            }
        }
    }

    if let Some(path) = export_path(output, args.export, args.format) {
        let format = args
            .format
            .or_else(|| ExportFormat::from_path(&path))
            .unwrap_or(ExportFormat::Csv);
        match export_results(&filtered, &path, format) {
            Ok(rows) => println!("Exported {} rows to {}", rows, path.display()),
            Err(e) => {
                eprintln!("Error: {}", e);
                failures += 1;
            }
        }
    }

    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );

    if failures > 0 {
        bail!("{} output file(s) could not be written", failures);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "bizmap=debug" } else { "bizmap=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn dedup_providers(providers: &[ProviderKind]) -> Vec<ProviderKind> {
    ProviderKind::ALL
        .into_iter()
        .filter(|p| providers.contains(p))
        .collect()
}

/// Build a client per enabled provider, failing on the first missing key
fn build_providers(
    providers: &[ProviderKind],
    args: &Args,
    file_config: Option<&FileConfig>,
) -> Result<Vec<Box<dyn SearchProvider>>> {
    let mut clients: Vec<Box<dyn SearchProvider>> = Vec::new();

    for &provider in providers {
        let env_key = std::env::var(env_var_for(provider)).ok();
        match provider {
            ProviderKind::Here => {
                let config = file_config.and_then(|c| c.here.clone()).unwrap_or_default();
                let key = resolve_api_key(
                    provider,
                    args.here_key.as_deref(),
                    config.api_key.as_deref(),
                    env_key,
                )?;
                clients.push(Box::new(HereClient::new(key, config)?));
            }
            ProviderKind::Yelp => {
                let config = file_config.and_then(|c| c.yelp.clone()).unwrap_or_default();
                let key = resolve_api_key(
                    provider,
                    args.yelp_key.as_deref(),
                    config.api_key.as_deref(),
                    env_key,
                )?;
                clients.push(Box::new(YelpClient::new(key, config)?));
            }
        }
    }

    Ok(clients)
}

fn export_path(
    output: Option<PathBuf>,
    export: bool,
    format: Option<ExportFormat>,
) -> Option<PathBuf> {
    output.or_else(|| {
        export.then(|| default_file_name(&chrono::Local::now(), format.unwrap_or(ExportFormat::Csv)))
    })
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
