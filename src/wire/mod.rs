use serde::{Deserialize, Serialize};

/// ========================================
/// Feature request/response payloads
/// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Optimization,
    CropRecommendation,
    Climate,
    Alerts,
    Fertilizer,
    IdealConditions,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 6] = [
        FeatureKind::Optimization,
        FeatureKind::CropRecommendation,
        FeatureKind::Climate,
        FeatureKind::Alerts,
        FeatureKind::Fertilizer,
        FeatureKind::IdealConditions,
    ];

    /// Physical storage key of the last good result.
    pub fn storage_key(self) -> &'static str {
        match self {
            FeatureKind::Optimization => "optimization",
            FeatureKind::CropRecommendation => "crop_recommendation",
            FeatureKind::Climate => "climate",
            FeatureKind::Alerts => "alerts",
            FeatureKind::Fertilizer => "fertilizer",
            FeatureKind::IdealConditions => "ideal_conditions",
        }
    }

    /// Noun used in caller-facing failure messages.
    pub fn label(self) -> &'static str {
        match self {
            FeatureKind::Optimization => "optimization suggestions",
            FeatureKind::CropRecommendation => "crop recommendation",
            FeatureKind::Climate => "city climate",
            FeatureKind::Alerts => "generated alerts",
            FeatureKind::Fertilizer => "fertilizer recommendation",
            FeatureKind::IdealConditions => "ideal conditions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeYieldRequest {
    pub crop_type: String,
    pub temperature: f64,
    pub humidity: f64,
    pub light_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeYieldResponse {
    pub temperature_adjustment: String,
    pub humidity_adjustment: String,
    pub light_level_adjustment: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRequest {
    pub city: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_crops: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_crop_name: Option<String>,
}

impl CropRequest {
    /// The forced crop, if one was given and is not blank.
    pub fn forced_crop(&self) -> Option<&str> {
        self.force_crop_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRecommendation {
    pub crop_name: String,
    pub reason: String,
    pub predicted_farm_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateRequest {
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityClimate {
    pub average_temp: f64,
    pub average_humidity: f64,
    pub climate_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsRequest {
    pub city: String,
    pub state: String,
    pub crop_name: String,
    pub farm_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    pub const NAMES: &'static [&'static str] = &["Critical", "Warning", "Info"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertType {
    Temperature,
    Moisture,
    Nutrients,
    Light,
    Hardware,
    Power,
}

impl AlertType {
    pub const NAMES: &'static [&'static str] =
        &["Temperature", "Moisture", "Nutrients", "Light", "Hardware", "Power"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertStatus {
    Active,
    Resolved,
}

impl AlertStatus {
    pub const NAMES: &'static [&'static str] = &["Active", "Resolved"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: AlertType,
    pub component: String,
    pub message: String,
    /// Relative, e.g. "5m ago".
    pub timestamp: String,
    pub status: AlertStatus,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertBatch {
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FertilizerRequest {
    pub temperature: f64,
    pub humidity: f64,
    pub moisture: f64,
    pub soil_type: String,
    pub crop_type: String,
    pub nitrogen: f64,
    pub phosphorous: f64,
    pub potassium: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FertilizerRecommendation {
    pub fertilizer_name: String,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdealConditionsRequest {
    pub crop_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdealConditions {
    pub temperature_range: String,
    pub humidity_range: String,
    pub light_info: String,
    pub description: String,
}
