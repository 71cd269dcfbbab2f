use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::features::{FeatureRow, CATEGORICAL_FEATURES, NUMERIC_FEATURES};

/// Standardised linear term: `weight * (x - mean) / scale`. A missing value
/// is imputed with `mean` and contributes nothing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NumericTerm {
    pub weight: f64,
    #[serde(default)]
    pub mean: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Deserialize)]
pub struct ModelToml {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub intercept: f64,
    #[serde(default)]
    pub numeric: BTreeMap<String, NumericTerm>,
    /// feature -> category key -> weight
    #[serde(default)]
    pub categorical: BTreeMap<String, BTreeMap<String, f64>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub numeric_terms: usize,
    pub categorical_terms: usize,
}

/// Logistic risk model over the derived feature row. Unknown categories are
/// ignored, mirroring a one-hot encoder that skips unseen values.
#[derive(Clone, Debug)]
pub struct RiskModel {
    descriptor: ModelDescriptor,
    intercept: f64,
    numeric: BTreeMap<String, NumericTerm>,
    categorical: BTreeMap<String, BTreeMap<String, f64>>,
}

impl RiskModel {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading model {:?}: {}", path, e))?;
        let model = Self::from_toml_str(&contents)?;
        info!(
            "[anemia-risk] Loaded model {} ({} numeric, {} categorical terms)",
            model.descriptor.id, model.descriptor.numeric_terms, model.descriptor.categorical_terms
        );
        Ok(model)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let toml_model: ModelToml = toml::from_str(contents)?;

        if !toml_model.intercept.is_finite() {
            anyhow::bail!("intercept must be finite");
        }
        for (name, term) in &toml_model.numeric {
            if !NUMERIC_FEATURES.contains(&name.as_str()) {
                anyhow::bail!("unknown numeric feature '{}'", name);
            }
            if !(term.scale.is_finite() && term.scale > 0.0) {
                anyhow::bail!("feature '{}' needs a positive scale", name);
            }
            if !(term.weight.is_finite() && term.mean.is_finite()) {
                anyhow::bail!("feature '{}' has a non-finite weight or mean", name);
            }
        }
        for (name, table) in &toml_model.categorical {
            if !CATEGORICAL_FEATURES.contains(&name.as_str()) {
                anyhow::bail!("unknown categorical feature '{}'", name);
            }
            if let Some((key, _)) = table.iter().find(|(_, w)| !w.is_finite()) {
                anyhow::bail!("feature '{}' category '{}' has a non-finite weight", name, key);
            }
        }

        let descriptor = ModelDescriptor {
            id: toml_model.id,
            name: toml_model.name,
            description: toml_model.description,
            numeric_terms: toml_model.numeric.len(),
            categorical_terms: toml_model.categorical.values().map(BTreeMap::len).sum(),
        };

        Ok(Self {
            descriptor,
            intercept: toml_model.intercept,
            numeric: toml_model.numeric,
            categorical: toml_model.categorical,
        })
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    /// Linear score before the sigmoid.
    pub fn logit(&self, row: &FeatureRow) -> f64 {
        let numeric: f64 = self
            .numeric
            .iter()
            .map(|(name, term)| {
                let x = row.numeric(name).unwrap_or(term.mean);
                term.weight * (x - term.mean) / term.scale
            })
            .sum();

        let categorical: f64 = self
            .categorical
            .iter()
            .filter_map(|(name, table)| row.category(name).and_then(|key| table.get(key)))
            .sum();

        self.intercept + numeric + categorical
    }

    /// Probability of the positive (anemic) class.
    pub fn predict_proba(&self, row: &FeatureRow) -> f64 {
        sigmoid(self.logit(row))
    }
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{derive_features, sample_input};

    const SMALL_MODEL: &str = r#"
        id = "test"
        name = "Test model"
        intercept = -1.0

        [numeric.child_age_months]
        weight = -0.5
        mean = 24.0
        scale = 12.0

        [numeric.mother_bmi]
        weight = -0.2
        mean = 25.0
        scale = 4.0

        [categorical.currently_pregnant]
        "1" = 0.8
    "#;

    #[test]
    fn loads_terms_and_counts_them() {
        let model = RiskModel::from_toml_str(SMALL_MODEL).unwrap();
        assert_eq!(model.descriptor().id, "test");
        assert_eq!(model.descriptor().numeric_terms, 2);
        assert_eq!(model.descriptor().categorical_terms, 1);
    }

    #[test]
    fn missing_values_contribute_nothing() {
        let model = RiskModel::from_toml_str(SMALL_MODEL).unwrap();
        let row = FeatureRow::default();
        assert!((model.logit(&row) - (-1.0)).abs() < 1e-12);
        assert!((model.predict_proba(&row) - sigmoid(-1.0)).abs() < 1e-12);
    }

    #[test]
    fn terms_move_the_logit() {
        let model = RiskModel::from_toml_str(SMALL_MODEL).unwrap();
        let record = sample_input().validate().unwrap();
        let mut row = derive_features(&record);
        let base = model.logit(&row);

        row.categorical.insert("currently_pregnant", "1".to_string());
        assert!((model.logit(&row) - base - 0.8).abs() < 1e-12);

        row.categorical.insert("currently_pregnant", "7".to_string());
        assert!((model.logit(&row) - base).abs() < 1e-12);
    }

    #[test]
    fn rejects_unknown_features_and_bad_scales() {
        let unknown = "id = \"x\"\nname = \"x\"\nintercept = 0.0\n[numeric.shoe_size]\nweight = 1.0\n";
        assert!(RiskModel::from_toml_str(unknown).is_err());

        let zero_scale =
            "id = \"x\"\nname = \"x\"\nintercept = 0.0\n[numeric.child_age_months]\nweight = 1.0\nscale = 0.0\n";
        assert!(RiskModel::from_toml_str(zero_scale).is_err());

        let bad_category = "id = \"x\"\nname = \"x\"\nintercept = 0.0\n[categorical.blood_type]\n\"A\" = 1.0\n";
        assert!(RiskModel::from_toml_str(bad_category).is_err());
    }

    #[test]
    fn bundled_model_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("model/anemia.toml");
        let model = RiskModel::load(&path).unwrap();
        let row = derive_features(&sample_input().validate().unwrap());
        let p = model.predict_proba(&row);
        assert!(p > 0.0 && p < 1.0);
    }

    #[test]
    fn sigmoid_is_centred() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
    }
}
