//! countries: command-line front end for the country directory.
//!
//! Usage examples
//! --------------
//!
//! - List every country, or search and filter
//!   $ countries list
//!   $ countries list --search united --region Americas
//!
//! - Show the regions present in the list
//!   $ countries regions
//!
//! - Show one country by code, with its neighbours
//!   $ countries show deu --borders
//!
//! - Read or flip the persisted theme
//!   $ countries theme toggle
//!
//! Point `--api local-mock` (or `COUNTRIES_API=local-mock`) at a json-server
//! mock on `http://localhost:3000/`; it defaults to the in-memory cached backend.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use country_directory::config::{expand_path, BackendKind, DirectoryConfig};
use country_directory::view::{detail_rows, format_population};
use country_directory::{ApiVariant, DirectoryBackend, FetchState, Theme, ThemePreference};

#[derive(Debug, Parser)]
#[command(
    name = "countries",
    version,
    about = "Browse countries from the REST Countries API"
)]
struct Cli {
    /// Which API the base URL serves
    #[arg(long, global = true, value_enum, env = "COUNTRIES_API", default_value = "rest-countries")]
    api: ApiVariant,

    /// Override the API base URL
    #[arg(long, global = true, env = "COUNTRIES_BASE_URL")]
    base_url: Option<String>,

    /// Override the backend (remote: API searches; cached: load once, filter locally)
    #[arg(long, global = true, value_enum, env = "COUNTRIES_BACKEND")]
    backend: Option<BackendKind>,

    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    /// Preference file (supports ~ and $VARS)
    #[arg(long, global = true, env = "COUNTRIES_STORAGE")]
    storage: Option<String>,

    /// Default log level, overridable via RUST_LOG
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List countries, optionally searched and filtered by region
    List {
        /// Name (or, with the cached backend, capital) substring
        #[arg(short, long, default_value = "")]
        search: String,

        /// Exact region, e.g. Europe
        #[arg(short, long, default_value = "")]
        region: String,
    },

    /// List the distinct regions
    Regions,

    /// Show one country by 3- or 2-letter code
    Show {
        code: String,

        /// Also list bordering countries
        #[arg(long)]
        borders: bool,
    },

    /// Show or change the light/dark theme preference
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,

        /// Platform prefers a dark color scheme (used when nothing is saved)
        #[arg(long, env = "COUNTRIES_PREFERS_DARK")]
        prefers_dark: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ThemeAction {
    Get,
    Toggle,
    Set {
        #[arg(value_enum)]
        theme: Theme,
    },
}

fn init_logging(level: &str) {
    let default = format!("{level},country_directory={level},reqwest=warn,hyper=warn");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn build_config(cli: &Cli) -> Result<DirectoryConfig> {
    let mut config = DirectoryConfig::for_api(cli.api);
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(storage) = &cli.storage {
        config.storage_path = expand_path(storage)?;
    }
    config.timeout = Duration::from_secs(cli.timeout);
    Ok(config)
}

/// Issue the list query for `search` and wait for it.
///
/// The remote backend fetches as soon as the term is set; the cached backend
/// issues nothing for a term and needs `load()` instead.
async fn fetch_list(directory: &dyn DirectoryBackend, search: &str, region: &str) {
    let pending = directory.set_search_term(search);
    let pending = if pending.is_idle() {
        directory.load()
    } else {
        pending
    };
    directory.set_region(region);
    pending.settled().await;
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    let config = build_config(&cli)?;

    match cli.command {
        Commands::List { search, region } => {
            let directory = config.backend()?;
            fetch_list(directory.as_ref(), &search, &region).await;

            match directory.snapshot().countries() {
                FetchState::Loaded(countries) if countries.is_empty() => {
                    println!("No countries found");
                }
                FetchState::Loaded(countries) => {
                    for c in countries {
                        println!(
                            "{} ({}) | {} | capital {} | population {}",
                            c.name,
                            c.code,
                            c.region,
                            c.capital,
                            format_population(c.population)
                        );
                    }
                }
                FetchState::Errored(e) if e.is_not_found() => {
                    println!("No countries match: {search}");
                }
                FetchState::Errored(e) => bail!("Failed to load countries: {e}"),
                FetchState::NotRequested | FetchState::Loading => bail!("Country list never settled"),
            }
        }

        Commands::Regions => {
            let directory = config.backend()?;
            fetch_list(directory.as_ref(), "", "").await;

            let snapshot = directory.snapshot();
            if let Some(e) = snapshot.overview.state().error() {
                bail!("Failed to load countries: {e}");
            }
            for region in snapshot.regions() {
                println!("{region}");
            }
        }

        Commands::Show { code, borders } => {
            let directory = config.backend()?;
            directory.set_country_code(&code).settled().await;

            let snapshot = directory.snapshot();
            match snapshot.detail.state() {
                FetchState::Loaded(record) => {
                    println!("{} ({})", record.name, record.code);
                    if let FetchState::Loaded(detail) = snapshot.detail_view() {
                        for (label, value) in detail_rows(&detail) {
                            println!("  {label}: {value}");
                        }
                    }
                }
                FetchState::Errored(e) if e.is_not_found() => {
                    eprintln!("No country found for: {code}");
                    return Ok(());
                }
                FetchState::Errored(e) => bail!("Failed to load {code}: {e}"),
                FetchState::NotRequested | FetchState::Loading => bail!("No country code given"),
            }

            if borders {
                let neighbours = directory.border_countries().await;
                if neighbours.is_empty() {
                    println!("  Border Countries: none");
                } else {
                    let names: Vec<String> = neighbours
                        .iter()
                        .map(|c| format!("{} ({})", c.name, c.code))
                        .collect();
                    println!("  Border Countries: {}", names.join(", "));
                }
            }
        }

        Commands::Theme {
            action,
            prefers_dark,
        } => {
            let mut preference = ThemePreference::load(config.preference_store(), prefers_dark)?;
            match action.unwrap_or(ThemeAction::Get) {
                ThemeAction::Get => {}
                ThemeAction::Toggle => {
                    preference.toggle()?;
                }
                ThemeAction::Set { theme } => preference.set(theme)?,
            }
            println!("{}", preference.theme());
        }
    }

    Ok(())
}
