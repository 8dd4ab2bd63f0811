use std::io::Read;
use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::info;

use super::repository::{SessionId, SessionRecord, SessionStore, StoreError};
use crate::workflows::plots::{PlotId, PlotImportError, PlotImporter};
use crate::workflows::recommendation::{
    Language, Recommendation, RecommendationError, RecommendationRequest, Recommender,
};
use crate::workflows::scoring::{
    ExportError, ExportView, ScoredPlot, ScoringError, SuitabilityScorer, UnknownExportView,
};

/// Session-scoped analysis: extraction, scoring and the views built on top.
pub struct AnalysisService<S, R> {
    store: Arc<S>,
    recommender: Arc<R>,
    scorer: Arc<SuitabilityScorer>,
}

/// 128 random bits from the thread-local CSPRNG, so one client cannot
/// reach another's session by guessing its id.
fn next_session_id() -> SessionId {
    let token: u128 = rand::thread_rng().gen();
    SessionId(format!("session-{token:032x}"))
}

impl<S, R> AnalysisService<S, R>
where
    S: SessionStore + 'static,
    R: Recommender + 'static,
{
    pub fn new(store: Arc<S>, recommender: Arc<R>, scorer: SuitabilityScorer) -> Self {
        Self {
            store,
            recommender,
            scorer: Arc::new(scorer),
        }
    }

    pub fn scorer(&self) -> &SuitabilityScorer {
        &self.scorer
    }

    /// Extract and score an upload, opening a new session for the result.
    /// Nothing is stored when extraction or scoring fails.
    pub fn upload<U: Read>(
        &self,
        upload: U,
        source_name: Option<String>,
    ) -> Result<SessionRecord, AnalysisError> {
        let table = PlotImporter::from_reader(upload)?;
        let scored = self.scorer.score(&table)?;

        let record = SessionRecord {
            id: next_session_id(),
            created_at: Utc::now(),
            source_name,
            table: Arc::new(scored),
        };
        self.store.insert(record.clone())?;

        info!(
            session_id = %record.id,
            plots = record.table.len(),
            "plot upload scored"
        );
        Ok(record)
    }

    pub fn session(&self, session_id: &SessionId) -> Result<SessionRecord, AnalysisError> {
        self.store
            .fetch(session_id)?
            .ok_or_else(|| AnalysisError::SessionNotFound(session_id.clone()))
    }

    pub fn plot(
        &self,
        session_id: &SessionId,
        plot_id: &PlotId,
    ) -> Result<ScoredPlot, AnalysisError> {
        let session = self.session(session_id)?;
        session
            .table
            .get(plot_id)
            .cloned()
            .ok_or_else(|| AnalysisError::PlotNotFound {
                session_id: session_id.clone(),
                plot_id: plot_id.clone(),
            })
    }

    pub fn recommend(
        &self,
        session_id: &SessionId,
        plot_id: &PlotId,
        language: Language,
    ) -> Result<Recommendation, AnalysisError> {
        let plot = self.plot(session_id, plot_id)?;
        let request = RecommendationRequest::from(&plot);
        let recommendation = self.recommender.recommend(&request, language)?;
        Ok(recommendation)
    }

    pub fn export(
        &self,
        session_id: &SessionId,
        view: ExportView,
    ) -> Result<Vec<u8>, AnalysisError> {
        let session = self.session(session_id)?;
        let bytes = session.table.to_csv(view)?;
        Ok(bytes)
    }

    /// Drop a session and its table.
    pub fn close(&self, session_id: &SessionId) -> Result<(), AnalysisError> {
        if self.store.remove(session_id)? {
            info!(session_id = %session_id, "session closed");
            Ok(())
        } else {
            Err(AnalysisError::SessionNotFound(session_id.clone()))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Import(#[from] PlotImportError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Recommendation(#[from] RecommendationError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    View(#[from] UnknownExportView),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("session '{0}' not found")]
    SessionNotFound(SessionId),
    #[error("plot '{plot_id}' not found in session '{session_id}'")]
    PlotNotFound {
        session_id: SessionId,
        plot_id: PlotId,
    },
}
