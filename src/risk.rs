use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Bajo,
    Moderado,
    Alto,
}

impl RiskLevel {
    /// `< 0.25` low, `< 0.65` moderate, otherwise high.
    pub fn from_probability(prob: f64) -> Self {
        if prob < 0.25 {
            RiskLevel::Bajo
        } else if prob < 0.65 {
            RiskLevel::Moderado
        } else {
            RiskLevel::Alto
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Bajo => "Bajo",
            RiskLevel::Moderado => "Moderado",
            RiskLevel::Alto => "Alto",
        }
    }
}

/// Probability on a 0-10 scale, one decimal, halves rounded to even.
pub fn score(prob: f64) -> f64 {
    (prob * 100.0).round_ties_even() / 10.0
}
