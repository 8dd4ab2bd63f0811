use super::config::{Polarity, ScoringConfig};
use crate::workflows::plots::{Indicator, IndicatorValues};
use serde::Serialize;

pub const UNSUITABLE_BELOW: f64 = 0.30;
pub const POOR_BELOW: f64 = 0.50;
pub const MODERATE_BELOW: f64 = 0.75;
/// Oriented indicator score under which an unsuitable plot blames that indicator.
pub const DEFICIT_BELOW: f64 = 0.30;

/// Indicators checked, in order, when naming why a plot is unsuitable.
/// Biomass is the fallback when none of them falls short.
const DEFICIT_PRIORITY: [Indicator; 3] = [
    Indicator::ShrubCover,
    Indicator::GrazingPressure,
    Indicator::WoodyCount,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuitabilityBand {
    Unsuitable,
    Poor,
    Moderate,
    High,
}

impl SuitabilityBand {
    pub const ALL: [SuitabilityBand; 4] = [
        SuitabilityBand::Unsuitable,
        SuitabilityBand::Poor,
        SuitabilityBand::Moderate,
        SuitabilityBand::High,
    ];

    /// A NaN score never earns a band above `Unsuitable`.
    pub fn from_score(score: f64) -> Self {
        if score.is_nan() || score < UNSUITABLE_BELOW {
            Self::Unsuitable
        } else if score < POOR_BELOW {
            Self::Poor
        } else if score < MODERATE_BELOW {
            Self::Moderate
        } else {
            Self::High
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Unsuitable => "Unsuitable",
            Self::Poor => "Poor",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }
}

/// Short categorical reading of a plot's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub band: SuitabilityBand,
    pub label: &'static str,
}

impl Diagnosis {
    pub fn summary(&self) -> String {
        format!("{} ({})", self.label, self.band.label())
    }
}

pub(crate) fn diagnose(score: f64, scaled: &IndicatorValues, config: &ScoringConfig) -> Diagnosis {
    let band = SuitabilityBand::from_score(score);
    let label = match band {
        SuitabilityBand::Unsuitable => dominant_deficit(scaled, config),
        SuitabilityBand::Poor => "Poor condition, needs intervention",
        SuitabilityBand::Moderate => "Moderately suitable",
        SuitabilityBand::High => "Highly suitable",
    };

    Diagnosis { band, label }
}

fn dominant_deficit(scaled: &IndicatorValues, config: &ScoringConfig) -> &'static str {
    DEFICIT_PRIORITY
        .iter()
        .copied()
        .find(|indicator| {
            let polarity = config.weight(*indicator).polarity;
            polarity.orient(scaled.get(*indicator)) < DEFICIT_BELOW
        })
        .map(|indicator| deficit_label(indicator, config.weight(indicator).polarity))
        .unwrap_or_else(|| deficit_label(Indicator::Biomass, config.biomass.polarity))
}

fn deficit_label(indicator: Indicator, polarity: Polarity) -> &'static str {
    match (indicator, polarity) {
        (Indicator::Biomass, Polarity::Direct) => "Very low biomass",
        (Indicator::Biomass, Polarity::Inverse) => "Excessive biomass",
        (Indicator::ShrubCover, Polarity::Direct) => "Sparse shrub cover",
        (Indicator::ShrubCover, Polarity::Inverse) => "Too much shrub cover",
        (Indicator::GrazingPressure, Polarity::Direct) => "Low grazing pressure",
        (Indicator::GrazingPressure, Polarity::Inverse) => "Excessive grazing pressure",
        (Indicator::WoodyCount, Polarity::Direct) => "Low woody plant density",
        (Indicator::WoodyCount, Polarity::Inverse) => "High woody plant density",
    }
}
