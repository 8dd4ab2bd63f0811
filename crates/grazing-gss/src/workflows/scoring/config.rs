use super::ScoringError;
use crate::workflows::plots::Indicator;
use serde::{Deserialize, Serialize};

/// Direction in which an indicator contributes to suitability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Higher readings raise the score.
    #[default]
    Direct,
    /// Higher readings lower the score (`1 - scaled`).
    Inverse,
}

impl Polarity {
    pub fn orient(self, scaled: f64) -> f64 {
        match self {
            Self::Direct => scaled,
            Self::Inverse => 1.0 - scaled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorWeight {
    pub weight: f64,
    #[serde(default)]
    pub polarity: Polarity,
}

impl IndicatorWeight {
    pub const fn direct(weight: f64) -> Self {
        Self {
            weight,
            polarity: Polarity::Direct,
        }
    }

    pub const fn inverse(weight: f64) -> Self {
        Self {
            weight,
            polarity: Polarity::Inverse,
        }
    }
}

/// Combination rule for the suitability score.
///
/// The score is `sum(weight * polarity.orient(scaled))` over the four
/// indicators, with weights renormalised to sum to 1.0 so the score stays
/// in `[0, 1]`. The default weighs biomass at 0.4 and each of shrub cover,
/// grazing pressure and woody count at 0.2, all `Direct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub biomass: IndicatorWeight,
    pub shrub_cover: IndicatorWeight,
    pub grazing_pressure: IndicatorWeight,
    pub woody_count: IndicatorWeight,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            biomass: IndicatorWeight::direct(0.4),
            shrub_cover: IndicatorWeight::direct(0.2),
            grazing_pressure: IndicatorWeight::direct(0.2),
            woody_count: IndicatorWeight::direct(0.2),
        }
    }
}

impl ScoringConfig {
    /// Default weights with shrub cover, grazing pressure and woody count
    /// counting against suitability.
    pub fn inverted_pressures() -> Self {
        Self {
            biomass: IndicatorWeight::direct(0.4),
            shrub_cover: IndicatorWeight::inverse(0.2),
            grazing_pressure: IndicatorWeight::inverse(0.2),
            woody_count: IndicatorWeight::inverse(0.2),
        }
    }

    pub fn weight(&self, indicator: Indicator) -> IndicatorWeight {
        match indicator {
            Indicator::Biomass => self.biomass,
            Indicator::ShrubCover => self.shrub_cover,
            Indicator::GrazingPressure => self.grazing_pressure,
            Indicator::WoodyCount => self.woody_count,
        }
    }

    /// Replaces one indicator's weight, keeping its polarity.
    pub fn set_weight(&mut self, indicator: Indicator, weight: f64) {
        self.weight_mut(indicator).weight = weight;
    }

    fn weight_mut(&mut self, indicator: Indicator) -> &mut IndicatorWeight {
        match indicator {
            Indicator::Biomass => &mut self.biomass,
            Indicator::ShrubCover => &mut self.shrub_cover,
            Indicator::GrazingPressure => &mut self.grazing_pressure,
            Indicator::WoodyCount => &mut self.woody_count,
        }
    }

    /// Validates the weights and rescales them to sum to 1.0.
    pub fn normalized(&self) -> Result<Self, ScoringError> {
        for indicator in Indicator::ALL {
            let weight = self.weight(indicator).weight;
            if !weight.is_finite() || weight < 0.0 {
                return Err(ScoringError::InvalidWeights(format!(
                    "{} weight must be a finite, non-negative number (got {weight})",
                    indicator.label()
                )));
            }
        }

        let total: f64 = Indicator::ALL
            .iter()
            .map(|indicator| self.weight(*indicator).weight)
            .sum();
        if !total.is_finite() {
            return Err(ScoringError::InvalidWeights(format!(
                "indicator weights must have a finite sum (got {total})"
            )));
        }
        if total <= 0.0 {
            return Err(ScoringError::InvalidWeights(
                "at least one indicator weight must be positive".to_string(),
            ));
        }

        let mut normalized = self.clone();
        for indicator in Indicator::ALL {
            normalized.weight_mut(indicator).weight /= total;
        }
        Ok(normalized)
    }
}
