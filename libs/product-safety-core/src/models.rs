use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a dietary restriction. The enumeration is owned by the
/// user-profile service; this crate only reads it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlagType {
    Allergen,
    Additive,
    Diet,
    Custom,
}

/// A user-defined or catalog dietary restriction, as stored on the user's
/// profile. `value` is the canonical matching key (case-insensitive);
/// `display_name` is what ends up in flag reasons shown to the user.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngredientFlag {
    pub id: String,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    pub value: String,
    pub display_name: String,
    pub is_active: bool,
}

/// Vegan classification of a product as declared by the product-data source.
/// The exact value set is owned there; anything unrecognized deserializes to
/// `Unknown` instead of failing the whole payload.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum VeganStatus {
    Vegan,
    NonVegan,
    MaybeVegan,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum VegetarianStatus {
    Vegetarian,
    NonVegetarian,
    MaybeVegetarian,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Product-side inputs to an analysis: the free-text label plus the
/// structured declarations that accompany it. The ingredient text is opaque
/// to this crate — manual entry, OCR output, and database text all arrive
/// through the same field.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductAnalysisInput {
    #[serde(default)]
    pub ingredients_text: String,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub additives: Vec<String>,
    #[serde(default)]
    pub vegan_status: VeganStatus,
    #[serde(default)]
    pub vegetarian_status: VegetarianStatus,
}

/// One token extracted from the ingredient text. Created fresh per analysis
/// call and immutable once returned.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedIngredient {
    /// Original substring as written, trimmed and whitespace-normalized.
    pub name: String,
    /// Lowercased, punctuation-stripped form. Kept for deduplication and
    /// display; matching runs against the raw lowercased name instead.
    pub normalized_name: String,
    pub is_flagged: bool,
    /// Display names of the flags that matched, in flag evaluation order,
    /// without duplicates.
    pub flag_reasons: Vec<String>,
}

/// Coarse-grained verdict shown as the headline result of a scan.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Unknown,
    Good,
    Caution,
    Warning,
}

impl OverallStatus {
    /// Hex color the presentation layer renders the verdict in.
    pub fn color(&self) -> &'static str {
        match self {
            OverallStatus::Good => "#4CAF50",
            OverallStatus::Caution => "#FF9800",
            OverallStatus::Warning => "#F44336",
            OverallStatus::Unknown => "#9E9E9E",
        }
    }

    /// Icon identifier consumed by the presentation layer.
    pub fn icon(&self) -> &'static str {
        match self {
            OverallStatus::Good => "CheckCircle",
            OverallStatus::Caution => "AlertTriangle",
            OverallStatus::Warning => "XCircle",
            OverallStatus::Unknown => "HelpCircle",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            OverallStatus::Good => "Looks Safe",
            OverallStatus::Caution => "Use Caution",
            OverallStatus::Warning => "Warning",
            OverallStatus::Unknown => "Limited Data",
        }
    }
}

/// Output contract of [`crate::analyzer::analyze`].
///
/// `flagged_count` is not guaranteed to equal the number of ingredients with
/// `is_flagged = true`: it is incremented once per matching user-flag event
/// across the per-ingredient, allergen cross-check, and diet passes, and the
/// diet increments are not attached to any ingredient.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub parsed_ingredients: Vec<ParsedIngredient>,
    pub overall_status: OverallStatus,
    pub flagged_count: u32,
}

/// Barcode format labels, in the spelling the rest of the system displays.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum BarcodeFormat {
    #[serde(rename = "EAN-13")]
    Ean13,
    #[serde(rename = "EAN-8")]
    Ean8,
    #[serde(rename = "UPC-A")]
    UpcA,
    #[serde(rename = "UPC-E")]
    UpcE,
    #[serde(rename = "ISBN-10")]
    Isbn10,
    #[serde(rename = "ISBN-13")]
    Isbn13,
    Unknown,
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BarcodeFormat::Ean13 => "EAN-13",
            BarcodeFormat::Ean8 => "EAN-8",
            BarcodeFormat::UpcA => "UPC-A",
            BarcodeFormat::UpcE => "UPC-E",
            BarcodeFormat::Isbn10 => "ISBN-10",
            BarcodeFormat::Isbn13 => "ISBN-13",
            BarcodeFormat::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Output of [`crate::barcode::validate`]. Checksum failures still report the
/// attempted `format`; `normalized_barcode` is only present on success.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<BarcodeFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_barcode: Option<String>,
}
