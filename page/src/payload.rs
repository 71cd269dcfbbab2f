use serde::{Deserialize, Serialize, Serializer};

use crate::coerce::parse_or_null;
use crate::dom::Document;

/// Input ids on the page, in request order. Each id doubles as the JSON key.
pub const FIELD_NAMES: [&str; 13] = [
    "child_age_months",
    "child_sex",
    "child_weight_kg",
    "child_height_cm",
    "birth_order",
    "birth_interval_months",
    "mother_age_years",
    "mother_weight_kg",
    "mother_height_cm",
    "mother_education_level_summary",
    "cigarettes_last24h",
    "marital_status",
    "currently_pregnant",
];

/// Body of `POST /predict`. Absent values are sent as `null`, never omitted.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PredictionRequest {
    #[serde(serialize_with = "finite_or_null")]
    pub child_age_months: Option<f64>,
    #[serde(serialize_with = "finite_or_null")]
    pub child_sex: Option<f64>,
    #[serde(serialize_with = "finite_or_null")]
    pub child_weight_kg: Option<f64>,
    #[serde(serialize_with = "finite_or_null")]
    pub child_height_cm: Option<f64>,

    #[serde(serialize_with = "finite_or_null")]
    pub birth_order: Option<f64>,
    #[serde(serialize_with = "finite_or_null")]
    pub birth_interval_months: Option<f64>,

    #[serde(serialize_with = "finite_or_null")]
    pub mother_age_years: Option<f64>,
    #[serde(serialize_with = "finite_or_null")]
    pub mother_weight_kg: Option<f64>,
    #[serde(serialize_with = "finite_or_null")]
    pub mother_height_cm: Option<f64>,
    #[serde(serialize_with = "finite_or_null")]
    pub mother_education_level_summary: Option<f64>,

    #[serde(serialize_with = "finite_or_null")]
    pub cigarettes_last24h: Option<f64>,
    #[serde(serialize_with = "finite_or_null")]
    pub marital_status: Option<f64>,
    #[serde(serialize_with = "finite_or_null")]
    pub currently_pregnant: Option<f64>,
}

// NaN and infinities have no JSON form; they go out as null.
fn finite_or_null<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) if v.is_finite() => serializer.serialize_f64(*v),
        _ => serializer.serialize_none(),
    }
}

impl PredictionRequest {
    /// Reads every field input from the document. A missing input element
    /// counts as an empty value.
    pub fn from_document(doc: &Document) -> Self {
        let field = |name: &str| {
            parse_or_null(doc.input_value(name), true).and_then(|v| v.as_number())
        };
        Self {
            child_age_months: field("child_age_months"),
            child_sex: field("child_sex"),
            child_weight_kg: field("child_weight_kg"),
            child_height_cm: field("child_height_cm"),
            birth_order: field("birth_order"),
            birth_interval_months: field("birth_interval_months"),
            mother_age_years: field("mother_age_years"),
            mother_weight_kg: field("mother_weight_kg"),
            mother_height_cm: field("mother_height_cm"),
            mother_education_level_summary: field("mother_education_level_summary"),
            cigarettes_last24h: field("cigarettes_last24h"),
            marital_status: field("marital_status"),
            currently_pregnant: field("currently_pregnant"),
        }
    }
}

/// Body returned by `POST /predict`. Unknown keys are ignored.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PredictionResult {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub prob: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PredictionResult {
    /// The backend error, if it carries a non-empty one.
    pub fn backend_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    pub status: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
