use axum::{
    Router,
    routing::{get, post},
};
use dotenvy::dotenv;
use handlers::{analyze_ingredients, get_flag_catalog, scan_product, validate_barcode};
use product_safety_core::{AnalysisPolicy, MatchMode};
use reqwest::Client;
use state::AppState;
use std::{env, net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod errors;
mod handlers;
mod models;
mod state;

async fn health_check() -> &'static str {
    "Safety Check Service OK"
}

fn load_policy() -> AnalysisPolicy {
    let mut policy = AnalysisPolicy::default();

    if let Ok(raw) = env::var("ANALYSIS_CAUTION_THRESHOLD") {
        match raw.parse::<u32>() {
            Ok(value) => policy.caution_threshold = value,
            Err(e) => warn!(
                "Invalid ANALYSIS_CAUTION_THRESHOLD '{}': {}. Using default {}",
                raw, e, policy.caution_threshold
            ),
        }
    }
    if let Ok(raw) = env::var("ANALYSIS_MATCH_MODE") {
        match raw.parse::<MatchMode>() {
            Ok(value) => policy.match_mode = value,
            Err(e) => warn!("{}. Using default match mode", e),
        }
    }

    policy
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer())
        .init();

    info!("Starting Safety Check Service...");

    let user_profile_service_url = env::var("USER_PROFILE_SERVICE_URL")
        .unwrap_or_else(|_| "http://user-profile-service:8001".to_string());
    let product_catalog_service_url = env::var("PRODUCT_CATALOG_SERVICE_URL")
        .unwrap_or_else(|_| "http://product-catalog-service:8002".to_string());
    let port_str = env::var("SAFETY_CHECK_SERVICE_PORT").unwrap_or_else(|_| "8003".to_string());
    let port = port_str.parse::<u16>().unwrap_or(8003);

    info!("User Profile Service URL: {}", user_profile_service_url);
    info!(
        "Product Catalog Service URL: {}",
        product_catalog_service_url
    );

    let policy = load_policy();
    info!(
        caution_threshold = policy.caution_threshold,
        match_mode = ?policy.match_mode,
        "Analysis policy loaded"
    );

    let http_client = Client::new();
    info!("Reqwest HTTP client created.");

    let app_state = Arc::new(AppState {
        http_client,
        user_profile_service_url,
        product_catalog_service_url,
        policy,
    });
    info!("Application state created.");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    info!("CORS layer configured (permissive).");

    let api_routes = Router::new()
        .route("/analyze", post(analyze_ingredients))
        .route("/scan", post(scan_product))
        .route("/barcode/{code}", get(validate_barcode))
        .route("/flags/catalog", get(get_flag_catalog));

    let app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes)
        .layer(cors)
        .with_state(app_state);
    info!("Axum router configured.");

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server configured to listen on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    warn!("Warning: No authentication/authorization implemented yet.");
    info!(
        "Safety Check Service successfully started, listening on {}",
        addr
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
