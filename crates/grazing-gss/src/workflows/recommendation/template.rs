use super::{
    Language, Recommendation, RecommendationError, RecommendationRequest, RecommendationSource,
    Recommender,
};
use crate::workflows::scoring::SuitabilityBand;

/// Fixed advice keyed by suitability band.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRecommender;

impl TemplateRecommender {
    pub fn text(band: SuitabilityBand, language: Language) -> &'static str {
        match (band, language) {
            (SuitabilityBand::Unsuitable, Language::English) => {
                "This plot is not suitable for grazing. Water is limited and vegetation is poor."
            }
            (SuitabilityBand::Unsuitable, Language::Hausa) => {
                "Wannan fili bai dace da kiwo ba. Babu ruwan sha sosai, kuma ganyen ciyawa ya ragu."
            }
            (SuitabilityBand::Poor, Language::English) => {
                "This plot can be grazed cautiously. Monitor livestock load."
            }
            (SuitabilityBand::Poor, Language::Hausa) => {
                "Za a iya kiwo a hankali a wannan fili. Amma a kula da yawancin shanu da za a kai."
            }
            (SuitabilityBand::Moderate | SuitabilityBand::High, Language::English) => {
                "This is a very suitable plot for grazing. Water and forage are sufficient."
            }
            (SuitabilityBand::Moderate | SuitabilityBand::High, Language::Hausa) => {
                "Wannan fili yana da kyau sosai don kiwo. Ruwan sha da ciyawa sun isa."
            }
        }
    }
}

impl Recommender for TemplateRecommender {
    fn recommend(
        &self,
        request: &RecommendationRequest,
        language: Language,
    ) -> Result<Recommendation, RecommendationError> {
        Ok(Recommendation {
            plot_id: request.plot_id.clone(),
            language,
            score: request.score,
            diagnosis: request.diagnosis.label,
            text: Self::text(request.diagnosis.band, language).to_string(),
            source: RecommendationSource::Template,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::plots::{IndicatorValues, PlotId};
    use crate::workflows::scoring::Diagnosis;

    fn request(score: f64, band: SuitabilityBand) -> RecommendationRequest {
        let values = IndicatorValues {
            biomass: 0.5,
            shrub_pct: 0.5,
            grazing_pressure: 0.5,
            woody_count: 0.5,
        };
        RecommendationRequest {
            plot_id: PlotId::from("P7"),
            raw: values,
            scaled: values,
            score,
            diagnosis: Diagnosis {
                band,
                label: "Moderately suitable",
            },
        }
    }

    #[test]
    fn template_follows_band() {
        let recommender = TemplateRecommender;
        let unsuitable = recommender
            .recommend(&request(0.1, SuitabilityBand::Unsuitable), Language::English)
            .expect("template never fails");
        assert!(unsuitable.text.starts_with("This plot is not suitable"));
        assert_eq!(unsuitable.source, RecommendationSource::Template);

        let cautious = recommender
            .recommend(&request(0.4, SuitabilityBand::Poor), Language::English)
            .expect("template never fails");
        assert!(cautious.text.contains("grazed cautiously"));

        let suitable = recommender
            .recommend(&request(0.6, SuitabilityBand::Moderate), Language::English)
            .expect("template never fails");
        assert!(suitable.text.starts_with("This is a very suitable plot"));
    }

    #[test]
    fn template_speaks_hausa() {
        let recommendation = TemplateRecommender
            .recommend(&request(0.9, SuitabilityBand::High), Language::Hausa)
            .expect("template never fails");
        assert_eq!(recommendation.language, Language::Hausa);
        assert!(recommendation.text.starts_with("Wannan fili yana da kyau"));
        assert_eq!(recommendation.plot_id, PlotId::from("P7"));
    }
}
