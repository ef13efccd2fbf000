use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use homerank::config::{LoggingSettings, Settings};
use homerank::core::Ranker;
use homerank::routes::{self, handle_json_payload_error, handle_query_payload_error, AppState};
use homerank::services::{CacheManager, PostgresClient, RealtorClient};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn startup_error(what: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", what, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", what, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Logging is not up yet, so configuration errors go to stderr
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_logging(&settings.logging);

    info!("Starting homerank listing service...");

    // Initialize PostgreSQL client
    let db_max_conn = settings.database.max_connections.unwrap_or(10);
    let db_min_conn = settings.database.min_connections.unwrap_or(1);

    let postgres = Arc::new(
        PostgresClient::from_settings(
            &settings.database.url,
            Some(db_max_conn),
            Some(db_min_conn),
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| startup_error("PostgreSQL connection error", e))?,
    );

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    // Initialize listings API client
    if settings.realtor.api_key.is_empty() {
        warn!("No listings API key configured; ingestion requests will be rejected upstream");
    }

    let realtor = Arc::new(
        RealtorClient::new(
            settings.realtor.base_url.clone(),
            settings.realtor.host.clone(),
            settings.realtor.api_key.clone(),
            settings.realtor.timeout_secs.unwrap_or(20),
        )
        .map_err(|e| startup_error("Listings API client error", e))?,
    );

    // Initialize cache manager (optional - the service works without it)
    let cache = if settings.cache.enabled {
        let cache_ttl = settings.cache.ttl_secs.unwrap_or(900);
        let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

        match CacheManager::new(&settings.cache.redis_url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
                Some(Arc::new(c))
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), running without cache", e);
                None
            }
        }
    } else {
        info!("Caching disabled by configuration");
        None
    };

    let ranker = Ranker::new(settings.scoring.params);

    info!(
        "Ranker initialized with weights: {:?}, {} reference points",
        settings.scoring.weights,
        settings.scoring.reference_points.len()
    );

    // Build application state
    let app_state = AppState {
        postgres,
        realtor,
        cache,
        ranker,
        ranking: settings.ranking.clone(),
        scoring: settings.scoring.clone(),
        ingest: settings.ingest.clone(),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
