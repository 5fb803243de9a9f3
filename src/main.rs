use anyhow::Context;
use chrono::{Datelike, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

use car_value::config::{Config, HistoryConfig, StoreBackend};
use car_value::history::{CacheStore, FileStore, HistoryLog, KeyValueStore, MemoryStore};
use car_value::pricing::{Estimate, FactorModel};
use car_value::recommend::{CandidateListing, CompareSelection, SortKey};
use car_value::service::HttpBackend;
use car_value::vehicle::VehicleSpec;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Args, Debug, Clone)]
struct SpecArgs {
    /// Read the vehicle spec from a JSON file instead of the flags below
    #[arg(long)]
    spec_file: Option<PathBuf>,

    /// Manufacturing year
    #[arg(long, default_value_t = 2020.0)]
    year: f64,

    /// Power in kW
    #[arg(long, default_value_t = 120.0)]
    power_kw: f64,

    /// Power in PS
    #[arg(long, default_value_t = 163.0)]
    power_ps: f64,

    /// Fuel consumption in L/100km
    #[arg(long, default_value_t = 6.5)]
    fuel_l_100km: f64,

    /// Fuel consumption in g/km
    #[arg(long, default_value_t = 120.0)]
    fuel_g_km: f64,

    /// Mileage in km
    #[arg(long, default_value_t = 50_000.0)]
    mileage: f64,

    /// Registration month (1-12)
    #[arg(long, default_value_t = 6)]
    registration_month: u32,

    /// Car age in years (derived from the year when omitted)
    #[arg(long)]
    age: Option<f64>,

    #[arg(long, default_value = "audi")]
    brand: String,

    #[arg(long, default_value = "black")]
    color: String,

    #[arg(long, default_value = "manual")]
    transmission: String,

    #[arg(long, default_value = "petrol")]
    fuel_type: String,
}

impl SpecArgs {
    fn to_spec(&self) -> anyhow::Result<VehicleSpec> {
        if let Some(ref path) = self.spec_file {
            return read_json(path);
        }

        Ok(VehicleSpec {
            manufacturing_year: self.year,
            power_kw: self.power_kw,
            power_ps: self.power_ps,
            fuel_consumption_l_per_100km: self.fuel_l_100km,
            fuel_consumption_g_per_km: self.fuel_g_km,
            mileage_km: self.mileage,
            registration_month: self.registration_month,
            car_age_years: self.age,
            brand: self.brand.clone(),
            color: self.color.clone(),
            transmission_type: self.transmission.clone(),
            fuel_type: self.fuel_type.clone(),
        })
    }
}

impl Default for SpecArgs {
    fn default() -> Self {
        let spec = VehicleSpec::default();
        Self {
            spec_file: None,
            year: spec.manufacturing_year,
            power_kw: spec.power_kw,
            power_ps: spec.power_ps,
            fuel_l_100km: spec.fuel_consumption_l_per_100km,
            fuel_g_km: spec.fuel_consumption_g_per_km,
            mileage: spec.mileage_km,
            registration_month: spec.registration_month,
            age: spec.car_age_years,
            brand: spec.brand,
            color: spec.color,
            transmission: spec.transmission_type,
            fuel_type: spec.fuel_type,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Estimate a vehicle's market price (default if no subcommand)
    Estimate {
        #[command(flatten)]
        spec: SpecArgs,
    },
    /// Estimate, then rank comparable listings against the estimate
    Recommend {
        #[command(flatten)]
        spec: SpecArgs,

        /// Sort order: score, price or delta
        #[arg(long, default_value = "score")]
        sort: SortKey,

        /// Listing id to compare; give twice for a side-by-side view
        #[arg(long = "compare")]
        compare: Vec<String>,

        /// Read candidate listings from a JSON file instead of the service
        #[arg(long)]
        candidates: Option<PathBuf>,

        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Show past estimates, newest first
    History {
        /// Delete all stored estimates
        #[arg(long)]
        clear: bool,
    },
    /// List valid brands, colors, transmissions and fuel types
    Options,
    /// Check whether the prediction service is reachable
    Status,
}

#[derive(Parser, Debug)]
#[command(name = "car-value")]
#[command(about = "Used car price estimates and comparable listings", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/car-value/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Never contact the prediction service
    #[arg(long, global = true)]
    offline: bool,

    /// Don't record this estimate in the history
    #[arg(long, global = true)]
    no_history: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn open_store(config: &HistoryConfig) -> Box<dyn KeyValueStore> {
    match config.backend {
        StoreBackend::Cache => Box::new(CacheStore::new(
            config
                .path
                .clone()
                .unwrap_or_else(car_value::history::get_store_path),
        )),
        StoreBackend::File => Box::new(FileStore::new(
            config
                .path
                .clone()
                .unwrap_or_else(car_value::config::get_config_dir),
        )),
        StoreBackend::Memory => Box::new(MemoryStore::new()),
    }
}

fn open_history(config: &HistoryConfig) -> HistoryLog<Box<dyn KeyValueStore>> {
    HistoryLog::open(open_store(config), config.key.clone())
}

/// Only commands that read or record estimates touch the history store.
fn needs_history(command: &Commands, no_history: bool) -> bool {
    match command {
        Commands::History { .. } => true,
        Commands::Estimate { .. } | Commands::Recommend { .. } => !no_history,
        Commands::Options | Commands::Status => false,
    }
}

fn create_backend(config: &Config, offline: bool) -> anyhow::Result<Option<HttpBackend>> {
    if offline {
        return Ok(None);
    }
    let Some(ref base_url) = config.service.base_url else {
        return Ok(None);
    };
    let timeout = humantime::parse_duration(&config.service.timeout)
        .context("Invalid service.timeout")?;
    let backend = HttpBackend::new(base_url, timeout, config.service.retries)
        .context("Failed to create HTTP client")?;
    Ok(Some(backend))
}

/// Estimate the spec, print warnings, and record the result.
/// Exits the process if the estimate can't be produced.
async fn run_estimate(
    spec: &VehicleSpec,
    backend: Option<&HttpBackend>,
    model: &FactorModel,
    config: &Config,
    history: Option<&mut HistoryLog<Box<dyn KeyValueStore>>>,
    use_colors: bool,
) -> Estimate {
    let (catalog, estimate) = futures::join!(
        car_value::fetch::fetch_options(backend),
        car_value::fetch::fetch_estimate(backend, model, spec, config.service.fallback)
    );

    let warnings = car_value::vehicle::validate_spec(spec, &catalog);
    if !warnings.is_empty() {
        eprintln!("{}", car_value::output::format_warnings(&warnings, use_colors));
    }

    let estimate = match estimate {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Estimate failed: {}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };

    if let Some(history) = history {
        if !history.record(spec, &estimate) {
            eprintln!("Note: history could not be saved; it is kept for this run only.");
        }
    }

    estimate
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();

    let mut logger = colog::default_builder();
    logger.filter_level(if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    });
    logger.init();

    let command = cli.command.unwrap_or(Commands::Estimate {
        spec: SpecArgs::default(),
    });
    let start_time = Instant::now();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match car_value::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = car_value::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let backend = match create_backend(&config, cli.offline) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };

    if cli.verbose {
        match backend {
            Some(ref b) => eprintln!("Prediction service: {}", b.base_url()),
            None => eprintln!("Prediction service: none (local model only)"),
        }
    }

    let model = FactorModel::new(
        config
            .pricing
            .current_year
            .unwrap_or_else(|| Utc::now().year()),
    );
    let mut history =
        needs_history(&command, cli.no_history).then(|| open_history(&config.history));
    let use_colors = car_value::output::should_use_colors();

    match command {
        Commands::Estimate { spec } => {
            let spec = match spec.to_spec() {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            let estimate = run_estimate(
                &spec,
                backend.as_ref(),
                &model,
                &config,
                history.as_mut(),
                use_colors,
            )
            .await;

            println!("{}", car_value::output::format_estimate(&estimate, use_colors));
            println!();
            println!("{}", car_value::output::format_breakdown(&estimate, use_colors));
            println!();
            println!("{}", car_value::output::format_hints(&spec));
        }
        Commands::Recommend {
            spec,
            sort,
            compare,
            candidates,
            tsv,
        } => {
            let spec = match spec.to_spec() {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            let estimate = run_estimate(
                &spec,
                backend.as_ref(),
                &model,
                &config,
                history.as_mut(),
                use_colors,
            )
            .await;

            let listings: Vec<CandidateListing> = match candidates {
                Some(ref path) => match read_json(path) {
                    Ok(items) => items,
                    Err(e) => {
                        eprintln!("{:#}", e);
                        std::process::exit(EXIT_CONFIG);
                    }
                },
                None => {
                    car_value::fetch::fetch_recommendations(backend.as_ref(), &estimate).await
                }
            };

            let ranked = car_value::recommend::rank(&listings, Some(estimate.predicted_price), sort);
            let selection = compare
                .iter()
                .fold(CompareSelection::new(), |sel, id| sel.toggle(id));

            if tsv {
                println!("{}", car_value::output::format_ranked_tsv(&ranked));
            } else {
                println!("{}", car_value::output::format_estimate(&estimate, use_colors));
                println!();
                println!(
                    "{}",
                    car_value::output::format_ranked_table(&ranked, &selection, use_colors)
                );

                if selection.is_ready() {
                    let picked = selection.pick(&ranked);
                    match car_value::output::format_compare(&picked, use_colors) {
                        Some(view) => {
                            println!();
                            println!("{}", view);
                        }
                        None => eprintln!("Compare: selected listings are not in the results."),
                    }
                }
            }

            if cli.verbose {
                eprintln!();
                eprintln!(
                    "Total: {} listings sorted by {} in {:?}",
                    ranked.len(),
                    sort,
                    start_time.elapsed()
                );
            }
        }
        Commands::History { clear } => {
            let mut history = history.unwrap_or_else(|| open_history(&config.history));
            if clear {
                if history.clear() {
                    println!("History cleared.");
                } else {
                    eprintln!("Failed to clear stored history.");
                }
            } else {
                println!(
                    "{}",
                    car_value::output::format_history(history.entries(), use_colors)
                );
            }
        }
        Commands::Options => {
            let catalog = car_value::fetch::fetch_options(backend.as_ref()).await;
            println!("Brands:        {}", catalog.brands.join(", "));
            println!("Colors:        {}", catalog.colors.join(", "));
            println!("Transmissions: {}", catalog.transmission_types.join(", "));
            println!("Fuel types:    {}", catalog.fuel_types.join(", "));
        }
        Commands::Status => match backend {
            None => println!("No prediction service configured; estimates use the local model."),
            Some(ref b) => match b.health().await {
                Ok(status) if status.is_healthy() => {
                    println!("{} is healthy: {}", b.base_url(), status.message)
                }
                Ok(status) => {
                    println!("{} reports '{}': {}", b.base_url(), status.status, status.message);
                    std::process::exit(EXIT_NETWORK);
                }
                Err(e) => {
                    eprintln!("{} is unreachable: {}", b.base_url(), e);
                    std::process::exit(EXIT_NETWORK);
                }
            },
        },
    }

    std::process::exit(EXIT_SUCCESS);
}
