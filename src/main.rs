use carpool_match::config::Settings;
use carpool_match::core::Matcher;
use carpool_match::models::DriverMatchesResponse;
use carpool_match::services::{CachedGeocoder, Dataset, TimedGeocoder};
use std::io::Write;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting carpool matcher...");

    let dataset_path = std::env::args()
        .nth(1)
        .map(Into::into)
        .unwrap_or_else(|| settings.dataset.path.clone());

    let dataset = Dataset::load(&dataset_path)
        .map_err(|e| startup_error(&format!("Failed to load dataset {}", dataset_path.display()), e))?;

    info!(
        "Dataset loaded: {} drivers, {} riders, {} places",
        dataset.drivers.len(),
        dataset.riders.len(),
        dataset.places.len()
    );

    let store = dataset
        .store()
        .map_err(|e| startup_error("Invalid dataset record", e))?;

    let geocoder = CachedGeocoder::new(
        TimedGeocoder::new(dataset.geocoder(), settings.geocoder.lookup_timeout()),
        settings.geocoder.cache_size,
        settings.geocoder.cache_ttl_secs,
    );

    let policy = settings
        .matching
        .policy()
        .map_err(|e| startup_error("Invalid matching policy", e))?;
    let matcher = Matcher::new(policy, settings.matching.concurrency);

    info!("Matcher initialized with policy: {:?}", matcher.algorithm().policy());

    let all = matcher
        .match_all_drivers(&store, &geocoder)
        .await
        .map_err(|e| startup_error("Matching failed", e))?;

    let mut stdout = std::io::stdout().lock();
    for matches in &all {
        let response = DriverMatchesResponse::from_matches(matches, matcher.algorithm());
        let line = serde_json::to_string(&response)
            .map_err(|e| startup_error("Failed to serialize matches", e))?;
        writeln!(stdout, "{}", line)?;
    }

    info!(
        "Matched {} drivers ({} cached addresses)",
        all.len(),
        geocoder.stats().entries
    );

    Ok(())
}
