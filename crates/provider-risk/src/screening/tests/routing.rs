use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tokio::sync::Semaphore;
use tower::ServiceExt;

use super::common::*;
use crate::screening::{screening_router, ApplyOutcome, SessionId};

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

async fn open_session(router: &axum::Router) -> String {
    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/screening/sessions",
            json!({"provider_id": 7}),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);

    let payload = read_json_body(response).await;
    assert_eq!(payload["session"]["status"], "idle");
    assert_eq!(payload["session"]["target"]["display_name"], LEGAL_NAME);
    payload["session_id"]
        .as_str()
        .expect("session id")
        .to_string()
}

#[tokio::test]
async fn sources_route_lists_the_catalog() {
    let (service, _) = service(ScriptedRiskApi::new());
    let router = screening_router(service);

    let response = router
        .oneshot(get("/api/v1/sources"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["sources"][0]["id"], "all");
    assert_eq!(payload["sources"][3]["display_name"], "The World Bank");
}

#[tokio::test]
async fn opening_a_session_for_an_unknown_provider_is_not_found() {
    let (service, _) = service(ScriptedRiskApi::new());
    let router = screening_router(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/screening/sessions",
            json!({"provider_id": 404}),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn toggle_route_schedules_a_run_and_view_shows_the_result() {
    let (service, _) = service(ScriptedRiskApi::new().reply(
        "all",
        json!({"total_hits": 3, "sources": [{"source": "OFAC", "hits": 3, "results": [{}, {}, {}]}]}),
    ));
    let router = screening_router(service.clone());
    let session_id = open_session(&router).await;

    let outcome = service
        .toggle(&SessionId(session_id.clone()), "all")
        .expect("toggle accepted");
    assert_eq!(outcome.view.status, "loading");
    let applied = outcome
        .run
        .expect("run scheduled")
        .await
        .expect("run task joins");
    assert_eq!(applied, ApplyOutcome::Applied);

    let response = router
        .oneshot(get(&format!("/api/v1/screening/sessions/{session_id}")))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "ready");
    assert_eq!(payload["selection"], json!(["all"]));
    assert_eq!(payload["result"]["entity_name"], LEGAL_NAME);
    assert_eq!(payload["result"]["headline"], "Risk Detected");
    assert_eq!(payload["result"]["summary"][0]["status"], "MATCH");
}

#[tokio::test]
async fn toggle_route_accepts_known_sources_only() {
    let (service, _) = service(ScriptedRiskApi::new());
    let router = screening_router(service);
    let session_id = open_session(&router).await;

    let response = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/screening/sessions/{session_id}/toggle"),
            json!({"source": "interpol"}),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/screening/sessions/{session_id}/toggle"),
            json!({"source": "ofac"}),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["selection"], json!(["ofac"]));
}

#[tokio::test]
async fn superseded_background_run_is_dropped() {
    let gate = Arc::new(Semaphore::new(0));
    let (service, api) = service(
        ScriptedRiskApi::new()
            .reply("ofac", json!({"source": "ofac", "hits": 9, "results": [{}]}))
            .gated(gate.clone()),
    );
    let router = screening_router(service.clone());
    let session_id = SessionId(open_session(&router).await);

    let first = service.toggle(&session_id, "ofac").expect("toggle accepted");
    let second = service
        .toggle(&session_id, "world-bank")
        .expect("toggle accepted");
    gate.add_permits(8);

    let first = first.run.expect("run scheduled").await.expect("joins");
    let second = second.run.expect("run scheduled").await.expect("joins");
    assert_eq!(first, ApplyOutcome::DiscardedStale);
    assert_eq!(second, ApplyOutcome::Applied);
    assert_eq!(api.calls().len(), 3);

    let view = service.session_view(&session_id).expect("session open");
    let result = view.result.expect("ready");
    assert_eq!(result.total_hits, 9);
    assert_eq!(result.summary.len(), 2);
}

#[tokio::test]
async fn page_route_moves_one_table() {
    let (service, _) =
        service(ScriptedRiskApi::new().reply("world-bank", world_bank_matches(23)));
    let router = screening_router(service.clone());
    let session_id = open_session(&router).await;

    let outcome = service
        .toggle(&SessionId(session_id.clone()), "world-bank")
        .expect("toggle accepted");
    outcome.run.expect("run scheduled").await.expect("joins");

    let response = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/screening/sessions/{session_id}/page"),
            json!({"entry": 0, "page": 3}),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let table = &payload["result"]["tables"][0];
    assert_eq!(table["rows"].as_array().map(Vec::len), Some(3));
    assert_eq!(table["page"]["total_pages"], 3);
    assert_eq!(table["rows"][0]["number"], 21);

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/screening/sessions/{session_id}/page"),
            json!({"entry": 5, "page": 1}),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn closed_sessions_are_gone() {
    let (service, _) = service(ScriptedRiskApi::new());
    let router = screening_router(service.clone());
    let session_id = open_session(&router).await;

    let response = router
        .clone()
        .oneshot(
            Request::delete(format!("/api/v1/screening/sessions/{session_id}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(service.sessions().is_empty());

    let response = router
        .oneshot(get(&format!("/api/v1/screening/sessions/{session_id}")))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
