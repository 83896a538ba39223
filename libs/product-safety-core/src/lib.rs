//! Analysis core for the product safety pipeline.
//!
//! Holds the ingredient analyzer (free-text tokenizer, flag matching with
//! synonym expansion, verdict derivation) and the barcode validator (format
//! classification and checksum verification). Everything here is a pure,
//! synchronous function over its arguments plus a read-only synonym table,
//! so handlers can call in from any number of tasks without coordination.

pub mod analyzer;
pub mod barcode;
pub mod models;
pub mod policy;
pub mod synonyms;

pub use analyzer::{analyze, normalize_ingredient_name, parse_ingredient_string};
pub use models::{
    AnalysisResult, BarcodeFormat, BarcodeValidationResult, FlagType, IngredientFlag,
    OverallStatus, ParsedIngredient, ProductAnalysisInput, VeganStatus, VegetarianStatus,
};
pub use policy::{AnalysisPolicy, MatchMode};
