//! Wire types for the analysis backend
//!
//! Shapes match the JSON the service produces for `POST /api/scan`,
//! `GET /api/ingredients`, and `GET /api/scans`. Optional fields default so
//! trimmed-down responses still parse.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Risk classification of an ingredient, produced by the analysis service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// No known concerns
    Safe,
    /// Flagged in some jurisdictions or studies
    Caution,
    /// Banned in at least one jurisdiction
    Banned,
    /// Classification unavailable
    #[default]
    #[serde(other)]
    Unknown,
}

impl RiskLevel {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "Safe",
            RiskLevel::Caution => "Caution",
            RiskLevel::Banned => "Banned",
            RiskLevel::Unknown => "Unknown",
        }
    }
}

/// A parsed ingredient with its risk assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient name as recognized on the label
    pub name: String,
    /// Short explanation of the assessment
    #[serde(default)]
    pub description: String,
    /// Risk classification
    #[serde(default)]
    pub risk_level: RiskLevel,
    /// Classifier confidence in [0, 1]
    #[serde(default)]
    pub confidence: f64,
    /// Jurisdictions where the ingredient is restricted, with detail
    #[serde(default)]
    pub banned_in: HashMap<String, String>,
    /// Source references backing the assessment
    #[serde(default)]
    pub sources: Vec<String>,
}

/// Successful result of one scan submission. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Server-assigned scan identifier
    pub scan_id: String,
    /// Server-side processing time in seconds
    pub processing_time: f64,
    /// Raw OCR text extracted from the label
    #[serde(default)]
    pub ocr_text: String,
    /// Ingredients in label order
    #[serde(default)]
    pub parsed_ingredients: Vec<Ingredient>,
    /// Nutritional facts, key order irrelevant
    #[serde(default)]
    pub nutritional_info: HashMap<String, serde_json::Value>,
}

impl ScanResult {
    /// Count ingredients at the given risk level.
    pub fn count_at(&self, level: RiskLevel) -> usize {
        self.parsed_ingredients
            .iter()
            .filter(|i| i.risk_level == level)
            .count()
    }
}

/// Error body returned by the backend on a non-2xx response
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// Human-readable failure detail
    pub detail: String,
}

/// Response of `GET /api/ingredients`: the known-ingredient reference catalog
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientCatalog {
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

/// Response of `GET /api/scans`: the server-side scan feed
#[derive(Debug, Clone, Deserialize)]
pub struct ScanFeed {
    #[serde(default)]
    pub scans: Vec<ScanResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_result_deserializes_backend_payload() {
        let json = r#"{
            "scan_id": "abc12345",
            "processing_time": 1.23,
            "ocr_text": "SUGAR, SALT",
            "parsed_ingredients": [
                {"name": "Sugar", "risk_level": "caution", "confidence": 0.9, "banned_in": {}, "sources": []}
            ],
            "nutritional_info": {}
        }"#;

        let result: ScanResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.scan_id, "abc12345");
        assert!((result.processing_time - 1.23).abs() < 1e-9);
        assert_eq!(result.ocr_text, "SUGAR, SALT");
        assert_eq!(result.parsed_ingredients.len(), 1);

        let sugar = &result.parsed_ingredients[0];
        assert_eq!(sugar.name, "Sugar");
        assert_eq!(sugar.risk_level, RiskLevel::Caution);
        assert!((sugar.confidence - 0.9).abs() < 1e-9);
        assert!(sugar.description.is_empty());
        assert!(sugar.banned_in.is_empty());
        assert!(result.nutritional_info.is_empty());
    }

    #[test]
    fn test_unknown_risk_level_is_catch_all() {
        let json = r#"{"name": "E999", "risk_level": "mystery"}"#;
        let ingredient: Ingredient = serde_json::from_str(json).unwrap();
        assert_eq!(ingredient.risk_level, RiskLevel::Unknown);
    }

    #[test]
    fn test_banned_in_carries_jurisdiction_detail() {
        let json = r#"{
            "name": "Potassium bromate",
            "risk_level": "banned",
            "banned_in": {"EU": "Banned since 1990", "UK": "Prohibited additive"}
        }"#;

        let ingredient: Ingredient = serde_json::from_str(json).unwrap();
        assert_eq!(ingredient.risk_level, RiskLevel::Banned);
        assert_eq!(
            ingredient.banned_in.get("EU").map(String::as_str),
            Some("Banned since 1990")
        );
    }

    #[test]
    fn test_error_body_parses_detail() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "unreadable image"}"#).unwrap();
        assert_eq!(body.detail, "unreadable image");
    }

    #[test]
    fn test_risk_counts() {
        let json = r#"{
            "scan_id": "x",
            "processing_time": 0.5,
            "parsed_ingredients": [
                {"name": "Water", "risk_level": "safe"},
                {"name": "Sugar", "risk_level": "caution"},
                {"name": "Red 3", "risk_level": "banned"},
                {"name": "Salt", "risk_level": "safe"}
            ]
        }"#;

        let result: ScanResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.count_at(RiskLevel::Safe), 2);
        assert_eq!(result.count_at(RiskLevel::Caution), 1);
        assert_eq!(result.count_at(RiskLevel::Banned), 1);
        assert_eq!(result.count_at(RiskLevel::Unknown), 0);
    }

    #[test]
    fn test_catalog_and_feed_default_to_empty() {
        let catalog: IngredientCatalog = serde_json::from_str("{}").unwrap();
        assert!(catalog.ingredients.is_empty());

        let feed: ScanFeed = serde_json::from_str("{}").unwrap();
        assert!(feed.scans.is_empty());
    }
}
