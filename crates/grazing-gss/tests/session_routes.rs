use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use grazing_gss::workflows::recommendation::{
    DelegatedRecommender, GenerationError, TextGenerator,
};
use grazing_gss::workflows::scoring::SuitabilityScorer;
use grazing_gss::workflows::session::{session_router, AnalysisService, InMemorySessionStore};
use serde_json::{json, Value};
use tower::ServiceExt;

const FIXTURE: &str = include_str!("fixtures/rangeland_plots.csv");

struct EchoGenerator;

impl TextGenerator for EchoGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let plot = prompt
            .lines()
            .find_map(|line| line.strip_prefix("Plot: "))
            .unwrap_or("unknown");
        Ok(format!("Rotate herds away from {plot} for two weeks."))
    }
}

struct OfflineGenerator;

impl TextGenerator for OfflineGenerator {
    fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Unavailable("connection refused".to_string()))
    }
}

fn router_with<G: TextGenerator + 'static>(recommender: DelegatedRecommender<G>) -> axum::Router {
    let service = AnalysisService::new(
        Arc::new(InMemorySessionStore::with_capacity(4)),
        Arc::new(recommender),
        SuitabilityScorer::default(),
    );
    session_router(Arc::new(service))
}

async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("route executes");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    (status, serde_json::from_slice(&body).expect("json payload"))
}

async fn open_session(router: &axum::Router) -> String {
    let (status, payload) = send(
        router,
        Request::post("/api/v1/sessions")
            .body(Body::from(FIXTURE))
            .expect("request builds"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    payload["session_id"]
        .as_str()
        .expect("session id")
        .to_string()
}

#[tokio::test]
async fn generated_recommendations_flow_through_the_api() {
    let router = router_with(DelegatedRecommender::new(Arc::new(EchoGenerator)));
    let session_id = open_session(&router).await;

    let (status, payload) = send(
        &router,
        Request::get(format!(
            "/api/v1/sessions/{session_id}/plots/Gwarzo-2/recommendation?language=english"
        ))
        .body(Body::empty())
        .expect("request builds"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["source"], json!("generated"));
    assert_eq!(
        payload["text"],
        json!("Rotate herds away from Gwarzo-2 for two weeks.")
    );
}

#[tokio::test]
async fn generator_outage_is_a_bad_gateway_without_fallback() {
    let router = router_with(DelegatedRecommender::new(Arc::new(OfflineGenerator)));
    let session_id = open_session(&router).await;

    let (status, payload) = send(
        &router,
        Request::get(format!(
            "/api/v1/sessions/{session_id}/plots/Rano-1/recommendation"
        ))
        .body(Body::empty())
        .expect("request builds"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("connection refused"));
}

#[tokio::test]
async fn generator_outage_falls_back_to_templates_when_enabled() {
    let router = router_with(
        DelegatedRecommender::new(Arc::new(OfflineGenerator)).with_template_fallback(),
    );
    let session_id = open_session(&router).await;

    let (status, payload) = send(
        &router,
        Request::get(format!(
            "/api/v1/sessions/{session_id}/plots/Rano-1/recommendation"
        ))
        .body(Body::empty())
        .expect("request builds"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["source"], json!("template"));
    assert_eq!(
        payload["text"],
        json!("This is a very suitable plot for grazing. Water and forage are sufficient.")
    );
}

#[tokio::test]
async fn sessions_are_isolated_and_bounded() {
    let router = router_with(DelegatedRecommender::new(Arc::new(EchoGenerator)));

    let first = open_session(&router).await;
    for _ in 0..4 {
        open_session(&router).await;
    }

    let (status, _) = send(
        &router,
        Request::get(format!("/api/v1/sessions/{first}"))
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
