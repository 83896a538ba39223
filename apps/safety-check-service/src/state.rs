use product_safety_core::AnalysisPolicy;
use reqwest::Client;

#[derive(Clone)]
pub struct AppState {
    pub http_client: Client,
    pub user_profile_service_url: String,
    pub product_catalog_service_url: String,
    pub policy: AnalysisPolicy,
}
