use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::workflows::recommendation::TemplateRecommender;
use crate::workflows::scoring::SuitabilityScorer;
use crate::workflows::session::repository::{
    InMemorySessionStore, SessionId, SessionRecord, SessionStore, StoreError,
};
use crate::workflows::session::{session_router, AnalysisService};

pub(super) const PLOTS_CSV: &str = "\
Plot Name,available_biomass,Shrub %,grazing_pressure,total woody count,latitude,longitude
North,100,10,2,1,12.0,8.5
South,300,30,6,5,11.5,8.6
East,200,20,4,3,,
";

pub(super) type MemoryService = AnalysisService<InMemorySessionStore, TemplateRecommender>;

pub(super) fn build_service() -> (MemoryService, Arc<InMemorySessionStore>) {
    let store = Arc::new(InMemorySessionStore::default());
    let service = AnalysisService::new(
        store.clone(),
        Arc::new(TemplateRecommender),
        SuitabilityScorer::default(),
    );
    (service, store)
}

pub(super) fn session_router_with_service(service: MemoryService) -> axum::Router {
    session_router(Arc::new(service))
}

pub(super) struct UnavailableStore;

impl SessionStore for UnavailableStore {
    fn insert(&self, _record: SessionRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn remove(&self, _id: &SessionId) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_slice(&read_body(response).await).expect("json payload")
}
