use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use mcc_carpools::admission::AdmissionService;
use mcc_carpools::config::{AppConfig, GeocoderKind};
use mcc_carpools::location::{AddressResolver, Coordinate, Geocoder, GoogleGeocoder, NominatimGeocoder};
use mcc_carpools::region;
use mcc_carpools::server;
use mcc_carpools::store::{CarpoolStore, JsonFileStore, MemoryStore};
use mcc_carpools::telemetry;

/// MCC Carpools — driver and rider sign-up service
///
/// Drivers are admitted only when their home address falls inside one of
/// the service-area regions.
///
/// Examples:
///   carpools serve
///   carpools serve --port 8080 --store ./carpools.json
///   carpools classify "1000 Oakland Ave, Ann Arbor, MI"
///   carpools classify "5 Pierpont Commons" --lat 42.2917 --lon -83.7169
#[derive(Parser)]
#[command(name = "carpools", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve {
        /// Bind address (overrides CARPOOLS_HOST).
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides CARPOOLS_PORT).
        #[arg(long, short = 'p')]
        port: Option<u16>,

        /// JSON store path (overrides CARPOOLS_STORE).
        #[arg(long, conflicts_with = "ephemeral")]
        store: Option<PathBuf>,

        /// Keep records in memory only.
        #[arg(long)]
        ephemeral: bool,
    },

    /// Print the region classification of an address as JSON.
    Classify {
        /// Street address.
        address: String,

        /// Latitude (-90 to 90). Skips geocoding when given with --lon.
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,

        /// Longitude (-180 to 180).
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("loading configuration")?;
    telemetry::init(&config.log_filter)?;

    match cli.command {
        Command::Serve { host, port, store, ephemeral } => {
            let store: Arc<dyn CarpoolStore> = if ephemeral {
                info!("using in-memory record store");
                Arc::new(MemoryStore::new())
            } else {
                let path = store.unwrap_or_else(|| config.store_path.clone());
                Arc::new(JsonFileStore::open(&path).with_context(|| {
                    format!("opening record store at {}", path.display())
                })?)
            };

            let resolver = AddressResolver::new(build_geocoder(&config)?);
            info!(geocoder = resolver.provider_name(), "address resolver ready");

            let admissions = AdmissionService::new(resolver, store);
            let host = host.unwrap_or_else(|| config.host.clone());
            let port = port.unwrap_or(config.port);
            server::start(&host, port, admissions)
                .await
                .with_context(|| format!("serving on {}:{}", host, port))?;
        }

        Command::Classify { address, lat, lon } => {
            let result = match (lat, lon) {
                (Some(lat), Some(lon)) => {
                    let coord = Coordinate::new(lat, lon)?;
                    region::classify(&address, coord)
                }
                _ => {
                    let resolver = AddressResolver::new(build_geocoder(&config)?);
                    let coord = tokio::task::spawn_blocking({
                        let address = address.clone();
                        move || resolver.resolve(&address)
                    })
                    .await?;
                    match coord {
                        Ok(coord) => region::classify(&address, coord),
                        Err(e) => bail!("{}: '{}'", e, address),
                    }
                }
            };
            if result.is_unknown() {
                info!("address is outside every region");
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

fn build_geocoder(config: &AppConfig) -> anyhow::Result<Arc<dyn Geocoder>> {
    Ok(match config.geocoder {
        GeocoderKind::Google => {
            let key = config
                .google_api_key
                .clone()
                .context("GOOGLE_MAPS_API_KEY is not set")?;
            Arc::new(GoogleGeocoder::new(key))
        }
        GeocoderKind::Nominatim => Arc::new(NominatimGeocoder::new()),
    })
}
