use chrono::{DateTime, Utc};
use product_safety_core::{
    AnalysisResult, FlagType, IngredientFlag, OverallStatus, ProductAnalysisInput,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(flatten)]
    pub product: ProductAnalysisInput,
    // Callers refresh the flag list from the profile service before each call.
    #[serde(default)]
    pub flags: Vec<IngredientFlag>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    #[validate(length(min = 1, message = "Barcode must not be empty"))]
    pub barcode: String,
    #[validate(length(min = 1, message = "User id must not be empty"))]
    pub user_id: String,
}

/// Severity-to-label mapping consumed by the presentation layer. Policy,
/// not styling, which is why the service ships it alongside the verdict.
#[derive(Debug, Serialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct StatusPresentation {
    pub color: &'static str,
    pub icon: &'static str,
    pub title: &'static str,
}

impl StatusPresentation {
    pub fn for_status(status: OverallStatus) -> Self {
        Self {
            color: status.color(),
            icon: status.icon(),
            title: status.title(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub presentation: StatusPresentation,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub barcode: product_safety_core::BarcodeValidationResult,
    pub analysis: AnalysisResult,
    pub presentation: StatusPresentation,
    pub checked_at: DateTime<Utc>,
}

/// Flag list as served by the user-profile service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFlagsData {
    pub user_id: String,
    #[serde(default)]
    pub flags: Vec<IngredientFlag>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFlag {
    pub id: &'static str,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    pub value: &'static str,
    pub display_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}
