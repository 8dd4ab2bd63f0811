use super::{
    Language, Recommendation, RecommendationError, RecommendationRequest, RecommendationSource,
    Recommender, TemplateRecommender,
};
use crate::workflows::plots::Indicator;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::warn;

/// External text-generation collaborator (e.g. a hosted language model).
/// Timeouts and retries belong to the implementation.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("text generator unavailable: {0}")]
    Unavailable(String),
    #[error("text generator returned an empty response")]
    EmptyResponse,
}

/// Recommender that asks a [`TextGenerator`] for the advice text.
pub struct DelegatedRecommender<G> {
    generator: Arc<G>,
    fallback: Option<TemplateRecommender>,
}

impl<G> DelegatedRecommender<G>
where
    G: TextGenerator,
{
    pub fn new(generator: Arc<G>) -> Self {
        Self {
            generator,
            fallback: None,
        }
    }

    /// Answer from the fixed templates when the generator fails.
    pub fn with_template_fallback(mut self) -> Self {
        self.fallback = Some(TemplateRecommender);
        self
    }

    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let text = self.generator.generate(prompt)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(trimmed.to_string())
    }
}

impl<G> Recommender for DelegatedRecommender<G>
where
    G: TextGenerator,
{
    fn recommend(
        &self,
        request: &RecommendationRequest,
        language: Language,
    ) -> Result<Recommendation, RecommendationError> {
        let prompt = build_prompt(request, language);

        match self.generate(&prompt) {
            Ok(text) => Ok(Recommendation {
                plot_id: request.plot_id.clone(),
                language,
                score: request.score,
                diagnosis: request.diagnosis.label,
                text,
                source: RecommendationSource::Generated,
            }),
            Err(error) => match &self.fallback {
                Some(fallback) => {
                    warn!(plot_id = %request.plot_id, %error, "text generation failed; using template");
                    fallback.recommend(request, language)
                }
                None => Err(error.into()),
            },
        }
    }
}

pub(crate) fn build_prompt(request: &RecommendationRequest, language: Language) -> String {
    let mut prompt = format!(
        "You are advising a pastoralist on rangeland grazing. Reply in {} with two or three short sentences.\n",
        language.label()
    );
    let _ = writeln!(prompt, "Plot: {}", request.plot_id);
    for indicator in Indicator::ALL {
        let _ = writeln!(
            prompt,
            "- {}: {} (scaled {:.2})",
            indicator.label(),
            request.raw.get(indicator),
            request.scaled.get(indicator)
        );
    }
    let _ = writeln!(prompt, "Grazing suitability score: {:.2} of 1.00", request.score);
    let _ = write!(prompt, "Diagnosis: {}", request.diagnosis.summary());
    prompt
}
