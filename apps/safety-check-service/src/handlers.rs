use crate::{
    errors::{AppError, Result},
    models::{
        AnalyzeRequest, AnalyzeResponse, CatalogFlag, ScanRequest, ScanResponse,
        StatusPresentation, UserFlagsData,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use product_safety_core::{FlagType, ProductAnalysisInput, analyze, barcode};
use reqwest::StatusCode;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, payload), fields(flags = payload.flags.len()))]
pub async fn analyze_ingredients(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>> {
    info!("Received ingredient analysis request");

    if barcode::looks_like_barcode(&payload.product.ingredients_text) {
        warn!("Ingredient text looks like a barcode; the verdict will carry little signal");
    }

    let analysis = analyze(&payload.product, &payload.flags, &state.policy);
    info!(
        status = ?analysis.overall_status,
        flagged = analysis.flagged_count,
        "Analysis complete"
    );

    let presentation = StatusPresentation::for_status(analysis.overall_status);
    Ok(Json(AnalyzeResponse {
        analysis,
        presentation,
        checked_at: Utc::now(),
    }))
}

#[instrument(fields(code = %code))]
pub async fn validate_barcode(
    Path(code): Path<String>,
) -> Json<product_safety_core::BarcodeValidationResult> {
    let result = barcode::validate(&code);
    if result.is_valid {
        info!(format = ?result.format, "Barcode accepted");
    } else {
        info!(error = ?result.error, "Barcode rejected");
    }
    Json(result)
}

#[instrument(skip(state, payload), fields(user_id = %payload.user_id, barcode = %payload.barcode))]
pub async fn scan_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ScanRequest>,
) -> Result<Json<ScanResponse>> {
    info!("Received scan request");

    payload.validate().map_err(|e| {
        AppError::BadRequest(format!("Input validation failed: {}", e).replace('\n', ", "))
    })?;

    // Gate the lookup on barcode validity; an invalid code never reaches the
    // catalog.
    let validation = barcode::validate(&payload.barcode);
    let Some(normalized) = validation.normalized_barcode.clone() else {
        let reason = validation
            .error
            .clone()
            .unwrap_or_else(|| "unrecognized barcode".to_string());
        warn!(%reason, "Rejecting scan before product lookup");
        return Err(AppError::InvalidBarcode(reason));
    };
    debug!(format = ?validation.format, %normalized, "Barcode validated");

    let product = fetch_product(&state, &normalized).await?;
    debug!(
        ingredients_present = !product.ingredients_text.is_empty(),
        allergens = product.allergens.len(),
        "Product data fetched"
    );

    let profile = fetch_user_flags(&state, &payload.user_id).await?;
    debug!(flags = profile.flags.len(), "User flags fetched");

    let analysis = analyze(&product, &profile.flags, &state.policy);
    info!(
        status = ?analysis.overall_status,
        flagged = analysis.flagged_count,
        "Safety verdict determined"
    );

    let presentation = StatusPresentation::for_status(analysis.overall_status);
    Ok(Json(ScanResponse {
        barcode: validation,
        analysis,
        presentation,
        checked_at: Utc::now(),
    }))
}

async fn fetch_product(state: &AppState, barcode: &str) -> Result<ProductAnalysisInput> {
    let product_url = format!(
        "{}/api/v1/products/barcode/{}",
        state.product_catalog_service_url, barcode
    );
    debug!("Fetching product data from: {}", product_url);

    let product_resp = state.http_client.get(&product_url).send().await?;
    match product_resp.status() {
        StatusCode::OK => product_resp
            .json::<ProductAnalysisInput>()
            .await
            .map_err(|e| {
                tracing::error!("Failed to deserialize product data JSON: {}", e);
                AppError::ProductProcessingError(format!("Failed to parse product data: {}", e))
            }),
        StatusCode::NOT_FOUND => {
            warn!("Product not found at {}", product_url);
            Err(AppError::NotFoundError(format!(
                "Product not found for barcode {}",
                barcode
            )))
        }
        other_status => {
            let body = product_resp.text().await.unwrap_or_default();
            tracing::error!(
                "Product catalog service failed with status {}: {}",
                other_status,
                body
            );
            Err(AppError::UpstreamServiceError {
                service: "product-catalog-service".to_string(),
                status: other_status.as_u16(),
            })
        }
    }
}

async fn fetch_user_flags(state: &AppState, user_id: &str) -> Result<UserFlagsData> {
    let flags_url = format!(
        "{}/api/v1/users/{}/flags",
        state.user_profile_service_url, user_id
    );
    debug!("Fetching user flags from: {}", flags_url);

    let flags_resp = state.http_client.get(&flags_url).send().await?;
    match flags_resp.status() {
        StatusCode::OK => flags_resp.json::<UserFlagsData>().await.map_err(|e| {
            tracing::error!("Failed to deserialize user flags JSON: {}", e);
            AppError::FlagProcessingError(format!("Failed to parse flag data: {}", e))
        }),
        StatusCode::NOT_FOUND => {
            warn!("User flags not found at {}", flags_url);
            Err(AppError::NotFoundError(format!(
                "Flag list not found for user {}",
                user_id
            )))
        }
        other_status => {
            let body = flags_resp.text().await.unwrap_or_default();
            tracing::error!(
                "User profile service failed with status {}: {}",
                other_status,
                body
            );
            Err(AppError::UpstreamServiceError {
                service: "user-profile-service".to_string(),
                status: other_status.as_u16(),
            })
        }
    }
}

#[instrument]
pub async fn get_flag_catalog() -> Json<Vec<CatalogFlag>> {
    info!("Serving built-in restriction catalog");
    Json(flag_catalog())
}

/// Built-in restrictions offered during onboarding. Values line up with the
/// synonym table keys so catalog picks get expansion for free.
fn flag_catalog() -> Vec<CatalogFlag> {
    fn entry(
        id: &'static str,
        flag_type: FlagType,
        value: &'static str,
        display_name: &'static str,
        description: Option<&'static str>,
    ) -> CatalogFlag {
        CatalogFlag {
            id,
            flag_type,
            value,
            display_name,
            description,
        }
    }

    vec![
        entry(
            "gluten",
            FlagType::Allergen,
            "gluten",
            "Cereals containing gluten",
            Some("Includes wheat (such as spelt and khorasan wheat), rye, barley, oats."),
        ),
        entry(
            "crustaceans",
            FlagType::Allergen,
            "crustacean",
            "Crustaceans",
            Some("Includes crabs, lobsters, prawns, scampi."),
        ),
        entry("eggs", FlagType::Allergen, "egg", "Eggs", None),
        entry("fish", FlagType::Allergen, "fish", "Fish", None),
        entry("peanuts", FlagType::Allergen, "peanut", "Peanuts", None),
        entry("soybeans", FlagType::Allergen, "soy", "Soybeans", None),
        entry(
            "milk",
            FlagType::Allergen,
            "milk",
            "Milk",
            Some("Including lactose."),
        ),
        entry(
            "nuts",
            FlagType::Allergen,
            "nut",
            "Nuts",
            Some(
                "Includes almonds, hazelnuts, walnuts, cashews, pecans, brazils, pistachios, macadamia nuts.",
            ),
        ),
        entry("celery", FlagType::Allergen, "celery", "Celery", None),
        entry("mustard", FlagType::Allergen, "mustard", "Mustard", None),
        entry("sesame", FlagType::Allergen, "sesame", "Sesame seeds", None),
        entry(
            "sulphites",
            FlagType::Allergen,
            "sulphite",
            "Sulphur dioxide and sulphites",
            Some("At concentrations of more than 10mg/kg or 10mg/litre."),
        ),
        entry("lupin", FlagType::Allergen, "lupin", "Lupin", None),
        entry(
            "molluscs",
            FlagType::Allergen,
            "mollusc",
            "Molluscs",
            Some("Includes mussels, oysters, squid, snails."),
        ),
        entry("vegan", FlagType::Diet, "vegan", "Vegan", None),
        entry(
            "vegetarian",
            FlagType::Diet,
            "vegetarian",
            "Vegetarian",
            None,
        ),
    ]
}
