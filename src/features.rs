use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Continuous model inputs. Those the form does not collect are always
/// missing and fall back to the model's imputation.
pub const NUMERIC_FEATURES: [&str; 16] = [
    "child_age_months",
    "child_weight_kg",
    "child_height_cm",
    "zscore_height_for_age",
    "zscore_weight_for_age",
    "zscore_weight_for_height",
    "zscore_bmi_for_age",
    "mother_age_years",
    "mother_weight_kg",
    "mother_height_cm",
    "mother_bmi",
    "mother_rohrer_index",
    "mother_weight_for_height_std_dv",
    "mother_weight_for_height_percent_dhs",
    "mother_weight_for_height_percent_fogarty",
    "mother_weight_for_height_percent_oms",
];

/// Coded model inputs, keyed by their category text.
pub const CATEGORICAL_FEATURES: [&str; 15] = [
    "birth_interval_months",
    "birth_order",
    "child_sex",
    "cigarettes_last24h",
    "currently_pregnant",
    "dob_info_completeness",
    "education_level_summary",
    "highest_education_level",
    "marital_status",
    "measurement_position",
    "mother_education_level_summary",
    "mother_highest_education_level",
    "mother_year_of_highest_education",
    "not_measured_reason",
    "year_of_highest_education",
];

/// Body of `POST /predict` as the page sends it: every field may be null.
#[derive(Deserialize, Default, Debug, Clone)]
pub struct PredictInput {
    #[serde(default)]
    pub child_age_months: Option<f64>,
    #[serde(default)]
    pub child_sex: Option<f64>,
    #[serde(default)]
    pub child_weight_kg: Option<f64>,
    #[serde(default)]
    pub child_height_cm: Option<f64>,
    #[serde(default)]
    pub birth_order: Option<f64>,
    #[serde(default)]
    pub birth_interval_months: Option<f64>,
    #[serde(default)]
    pub mother_age_years: Option<f64>,
    #[serde(default)]
    pub mother_weight_kg: Option<f64>,
    #[serde(default)]
    pub mother_height_cm: Option<f64>,
    #[serde(default)]
    pub mother_education_level_summary: Option<f64>,
    #[serde(default)]
    pub cigarettes_last24h: Option<f64>,
    #[serde(default)]
    pub marital_status: Option<f64>,
    #[serde(default)]
    pub currently_pregnant: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    Missing(&'static str),
    NotWhole(&'static str, f64),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Missing(field) => write!(f, "Missing field: {}", field),
            InputError::NotWhole(field, value) => {
                write!(f, "Field '{}' must be a whole number, got {}", field, value)
            }
        }
    }
}

/// A complete, validated form submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    pub child_age_months: f64,
    pub child_sex: i64,
    pub child_weight_kg: f64,
    pub child_height_cm: f64,
    pub birth_order: i64,
    pub birth_interval_months: f64,
    pub mother_age_years: f64,
    pub mother_weight_kg: f64,
    pub mother_height_cm: f64,
    pub mother_education_level_summary: i64,
    pub cigarettes_last24h: i64,
    pub marital_status: i64,
    pub currently_pregnant: i64,
}

fn required(value: Option<f64>, field: &'static str) -> Result<f64, InputError> {
    value.ok_or(InputError::Missing(field))
}

fn whole(value: Option<f64>, field: &'static str) -> Result<i64, InputError> {
    let v = required(value, field)?;
    if v.fract() != 0.0 || !v.is_finite() {
        return Err(InputError::NotWhole(field, v));
    }
    Ok(v as i64)
}

impl PredictInput {
    pub fn validate(&self) -> Result<PatientRecord, InputError> {
        Ok(PatientRecord {
            child_age_months: required(self.child_age_months, "child_age_months")?,
            child_sex: whole(self.child_sex, "child_sex")?,
            child_weight_kg: required(self.child_weight_kg, "child_weight_kg")?,
            child_height_cm: required(self.child_height_cm, "child_height_cm")?,
            birth_order: whole(self.birth_order, "birth_order")?,
            birth_interval_months: required(self.birth_interval_months, "birth_interval_months")?,
            mother_age_years: required(self.mother_age_years, "mother_age_years")?,
            mother_weight_kg: required(self.mother_weight_kg, "mother_weight_kg")?,
            mother_height_cm: required(self.mother_height_cm, "mother_height_cm")?,
            mother_education_level_summary: whole(
                self.mother_education_level_summary,
                "mother_education_level_summary",
            )?,
            cigarettes_last24h: whole(self.cigarettes_last24h, "cigarettes_last24h")?,
            marital_status: whole(self.marital_status, "marital_status")?,
            currently_pregnant: whole(self.currently_pregnant, "currently_pregnant")?,
        })
    }
}

/// One row of model input: numeric values (possibly missing) and
/// categorical keys for every feature the model knows.
#[derive(Debug, Clone, Default)]
pub struct FeatureRow {
    pub numeric: BTreeMap<&'static str, Option<f64>>,
    pub categorical: BTreeMap<&'static str, String>,
}

impl FeatureRow {
    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.numeric.get(name).copied().flatten()
    }

    pub fn category(&self, name: &str) -> Option<&str> {
        self.categorical.get(name).map(String::as_str)
    }
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Category text for a coded value: whole numbers without a fraction.
pub fn category_key(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

pub fn derive_features(record: &PatientRecord) -> FeatureRow {
    let mut row = FeatureRow::default();
    for name in NUMERIC_FEATURES {
        row.numeric.insert(name, None);
    }

    row.numeric.insert("child_age_months", finite(record.child_age_months));
    row.numeric.insert("child_weight_kg", finite(record.child_weight_kg));
    row.numeric.insert("child_height_cm", finite(record.child_height_cm));
    row.numeric.insert("mother_age_years", finite(record.mother_age_years));
    row.numeric.insert("mother_weight_kg", finite(record.mother_weight_kg));
    row.numeric.insert("mother_height_cm", finite(record.mother_height_cm));

    let w = record.mother_weight_kg;
    let h = record.mother_height_cm;
    row.numeric.insert("mother_bmi", finite(w / (h / 100.0).powi(2)));
    row.numeric.insert("mother_rohrer_index", finite(w / h.powi(3) * 1e7));

    let edu = record.mother_education_level_summary.to_string();
    let categorical: [(&'static str, String); 15] = [
        ("birth_interval_months", category_key(record.birth_interval_months)),
        ("birth_order", record.birth_order.to_string()),
        ("child_sex", record.child_sex.to_string()),
        ("cigarettes_last24h", record.cigarettes_last24h.to_string()),
        ("currently_pregnant", record.currently_pregnant.to_string()),
        ("dob_info_completeness", "1".to_string()),
        ("education_level_summary", edu.clone()),
        ("highest_education_level", edu.clone()),
        ("marital_status", record.marital_status.to_string()),
        ("measurement_position", "1".to_string()),
        ("mother_education_level_summary", edu.clone()),
        ("mother_highest_education_level", edu),
        ("mother_year_of_highest_education", "0".to_string()),
        ("not_measured_reason", "0".to_string()),
        ("year_of_highest_education", "0".to_string()),
    ];
    row.categorical.extend(categorical);

    row
}

#[cfg(test)]
pub(crate) fn sample_input() -> PredictInput {
    PredictInput {
        child_age_months: Some(18.0),
        child_sex: Some(1.0),
        child_weight_kg: Some(10.2),
        child_height_cm: Some(78.0),
        birth_order: Some(2.0),
        birth_interval_months: Some(24.0),
        mother_age_years: Some(27.0),
        mother_weight_kg: Some(60.0),
        mother_height_cm: Some(155.0),
        mother_education_level_summary: Some(3.0),
        cigarettes_last24h: Some(0.0),
        marital_status: Some(1.0),
        currently_pregnant: Some(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_field_is_reported_by_name() {
        let input = PredictInput {
            mother_height_cm: None,
            ..sample_input()
        };
        assert_eq!(
            input.validate(),
            Err(InputError::Missing("mother_height_cm"))
        );
        assert_eq!(
            InputError::Missing("mother_height_cm").to_string(),
            "Missing field: mother_height_cm"
        );
    }

    #[test]
    fn coded_fields_must_be_whole() {
        let input = PredictInput {
            child_sex: Some(1.5),
            ..sample_input()
        };
        assert_eq!(input.validate(), Err(InputError::NotWhole("child_sex", 1.5)));
    }

    #[test]
    fn derives_mother_indices() {
        let row = derive_features(&sample_input().validate().unwrap());
        let bmi = row.numeric("mother_bmi").unwrap();
        assert!((bmi - 60.0 / 1.55f64.powi(2)).abs() < 1e-9);
        let rohrer = row.numeric("mother_rohrer_index").unwrap();
        assert!((rohrer - 60.0 / 155f64.powi(3) * 1e7).abs() < 1e-9);
        assert_eq!(row.numeric("zscore_height_for_age"), None);
    }

    #[test]
    fn zero_height_leaves_indices_missing() {
        let input = PredictInput {
            mother_height_cm: Some(0.0),
            ..sample_input()
        };
        let row = derive_features(&input.validate().unwrap());
        assert_eq!(row.numeric("mother_bmi"), None);
        assert_eq!(row.numeric("mother_rohrer_index"), None);
    }

    #[test]
    fn covers_every_feature_and_replicates_education() {
        let row = derive_features(&sample_input().validate().unwrap());
        assert_eq!(row.numeric.len(), NUMERIC_FEATURES.len());
        assert_eq!(row.categorical.len(), CATEGORICAL_FEATURES.len());
        for name in CATEGORICAL_FEATURES {
            assert!(row.category(name).is_some(), "{}", name);
        }
        assert_eq!(row.category("highest_education_level"), Some("3"));
        assert_eq!(row.category("education_level_summary"), Some("3"));
        assert_eq!(row.category("birth_interval_months"), Some("24"));
        assert_eq!(row.category("not_measured_reason"), Some("0"));
    }

    #[test]
    fn category_keys_drop_whole_fractions() {
        assert_eq!(category_key(24.0), "24");
        assert_eq!(category_key(24.5), "24.5");
    }
}
