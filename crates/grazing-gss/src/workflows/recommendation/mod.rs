//! Plain-language grazing advice for a single scored plot.
//!
//! Callers depend only on [`Recommender`]. [`TemplateRecommender`] answers from
//! fixed sentences keyed by suitability band; [`DelegatedRecommender`] forwards a
//! prompt to an external [`TextGenerator`].

mod delegated;
mod template;

pub use delegated::{DelegatedRecommender, GenerationError, TextGenerator};
pub use template::TemplateRecommender;

use crate::workflows::plots::{IndicatorValues, PlotId};
use crate::workflows::scoring::{Diagnosis, ScoredPlot};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Hausa,
}

impl Language {
    pub const fn label(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hausa => "Hausa",
        }
    }

    /// ISO 639-1 code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hausa => "ha",
        }
    }
}

impl FromStr for Language {
    type Err = RecommendationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Self::English),
            "hausa" | "ha" => Ok(Self::Hausa),
            other => Err(RecommendationError::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// Every field a recommender may draw on for one plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRequest {
    pub plot_id: PlotId,
    pub raw: IndicatorValues,
    pub scaled: IndicatorValues,
    pub score: f64,
    pub diagnosis: Diagnosis,
}

impl From<&ScoredPlot> for RecommendationRequest {
    fn from(plot: &ScoredPlot) -> Self {
        Self {
            plot_id: plot.record.plot_id.clone(),
            raw: plot.record.indicators,
            scaled: plot.scaled,
            score: plot.score,
            diagnosis: plot.diagnosis,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Template,
    Generated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub plot_id: PlotId,
    pub language: Language,
    pub score: f64,
    pub diagnosis: &'static str,
    pub text: String,
    pub source: RecommendationSource,
}

pub trait Recommender: Send + Sync {
    fn recommend(
        &self,
        request: &RecommendationRequest,
        language: Language,
    ) -> Result<Recommendation, RecommendationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("unsupported language '{0}' (expected 'english' or 'hausa')")]
    UnsupportedLanguage(String),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_parses_names_and_codes() {
        assert_eq!("English".parse::<Language>().ok(), Some(Language::English));
        assert_eq!(" HA ".parse::<Language>().ok(), Some(Language::Hausa));
        match "french".parse::<Language>() {
            Err(RecommendationError::UnsupportedLanguage(value)) => assert_eq!(value, "french"),
            other => panic!("expected unsupported language, got {other:?}"),
        }
        assert_eq!(Language::Hausa.code(), "ha");
    }
}
