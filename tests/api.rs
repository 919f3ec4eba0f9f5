//! HTTP integration tests driving the full router.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{
    body_json, build_degraded_app, build_test_app, delete, get, get_with_token, post_json,
    post_json_with_token, unlock_panel,
};
use http_body_util::BodyExt;
use serde_json::json;

fn whitelist_form() -> serde_json::Value {
    json!({
        "kind": "whitelist",
        "applicant_handle": "night_owl",
        "character_name": "Vera Cruz",
        "age": 24,
        "answers": {
            "backstory": "Former courier trying to go straight.",
            "rules": "Read and accepted."
        }
    })
}

#[tokio::test]
async fn healthcheck_reports_ok_with_a_backend() {
    let app = build_test_app().await;
    let response = get(&app.router, "/healthcheck").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["game_sessions"], 0);
}

#[tokio::test]
async fn healthcheck_reports_degraded_without_a_backend() {
    let app = build_degraded_app();
    let json = body_json(get(&app, "/healthcheck").await).await;
    assert_eq!(json["status"], "degraded");
}

#[tokio::test]
async fn catalogue_lists_seven_games() {
    let app = build_test_app().await;
    let json = body_json(get(&app.router, "/games").await).await;
    let kinds: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds.len(), 7);
    assert!(kinds.contains(&"mystery_box"));
    assert!(kinds.contains(&"smuggle_run"));
}

#[tokio::test]
async fn mystery_box_session_over_http() {
    let app = build_test_app().await;

    let response = post_json(
        &app.router,
        "/games/sessions",
        json!({ "kind": "mystery_box", "seed": 11 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let mounted = body_json(response).await;
    assert_eq!(mounted["phase"], "setup");
    let id = mounted["id"].as_str().unwrap().to_string();
    let actions = format!("/games/sessions/{id}/actions");

    let started = post_json(&app.router, &actions, json!({ "type": "start" })).await;
    assert_eq!(started.status(), StatusCode::OK);

    let revealed = body_json(
        post_json(&app.router, &actions, json!({ "type": "reveal", "cell": 4 })).await,
    )
    .await;
    assert_eq!(revealed["phase"], "result");
    let cells = revealed["view"]["cells"].as_array().unwrap();
    assert_eq!(cells.len(), 9);
    assert!(cells.iter().all(|cell| cell["locked"] == true));
    assert!(cells[4]["value"].is_number());

    let again = post_json(&app.router, &actions, json!({ "type": "reveal", "cell": 5 })).await;
    assert_eq!(again.status(), StatusCode::BAD_REQUEST);

    let malformed = post_json(&app.router, &actions, json!({ "type": "juggle" })).await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

    let reset = body_json(
        post_json(&app.router, &format!("/games/sessions/{id}/reset"), json!({})).await,
    )
    .await;
    assert_eq!(reset["phase"], "setup");

    let session = format!("/games/sessions/{id}");
    assert_eq!(
        delete(&app.router, &session).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        get(&app.router, &session).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn unknown_game_kind_is_rejected() {
    let app = build_test_app().await;
    let response = post_json(&app.router, "/games/sessions", json!({ "kind": "poker" })).await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn application_is_submitted_and_reviewed_through_the_panel() {
    let app = build_test_app().await;

    let response = post_json(&app.router, "/applications", whitelist_form()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["status"], "pending");
    let id = created["id"].as_str().unwrap().to_string();

    let token = unlock_panel(&app.router).await;

    let listed = body_json(
        get_with_token(&app.router, "/admin/applications?status=pending", &token).await,
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let updated = post_json_with_token(
        &app.router,
        &format!("/admin/applications/{id}/status"),
        &token,
        json!({ "status": "approved", "reviewer_note": "Welcome aboard", "notify_applicant": true }),
    )
    .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let updated = body_json(updated).await;
    assert_eq!(updated["status"], "approved");
    assert_eq!(updated["reviewer_note"], "Welcome aboard");

    let sent = app.store.sent_notifications().await;
    assert_eq!(sent.len(), 2);

    let stats = body_json(
        get_with_token(&app.router, "/admin/applications/stats", &token).await,
    )
    .await;
    assert_eq!(stats["total"], 1);
}

#[tokio::test]
async fn invalid_application_is_rejected() {
    let app = build_test_app().await;

    let mut form = whitelist_form();
    form["age"] = json!(9);
    let response = post_json(&app.router, "/applications", form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut form = whitelist_form();
    form["answers"] = json!({});
    let response = post_json(&app.router, "/applications", form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut form = whitelist_form();
    form["applicant_handle"] = json!("bad handle!");
    let response = post_json(&app.router, "/applications", form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn application_submission_is_unavailable_in_degraded_mode() {
    let app = build_degraded_app();
    let response = post_json(&app, "/applications", whitelist_form()).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn admin_routes_require_an_unlocked_panel() {
    let app = build_test_app().await;

    assert_eq!(
        get(&app.router, "/admin/applications").await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        get_with_token(&app.router, "/admin/applications", "forged").await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        get(&app.router, "/sse/admin").await.status(),
        StatusCode::UNAUTHORIZED
    );

    let wrong = post_json(&app.router, "/panel/unlock", json!({ "code": "0000" })).await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let token = unlock_panel(&app.router).await;
    let session = get_with_token(&app.router, "/panel/session", &token).await;
    assert_eq!(session.status(), StatusCode::OK);
    let session = body_json(session).await;
    assert!(session.get("token").is_none());

    assert_eq!(
        get(&app.router, &format!("/admin/applications?panel_token={token}"))
            .await
            .status(),
        StatusCode::OK
    );

    let locked = post_json_with_token(&app.router, "/panel/lock", &token, json!({})).await;
    assert_eq!(locked.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        get_with_token(&app.router, "/admin/applications", &token).await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(app.state.panel().active_sessions(), 0);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = build_test_app().await;
    let response = get(&app.router, "/api-doc/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert!(doc["paths"]["/games/sessions/{id}/actions"].is_object());
    assert!(doc["paths"]["/panel/unlock"].is_object());
    assert!(doc["components"]["schemas"]["GameActionRequest"].is_object());
}

#[tokio::test]
async fn heist_plan_cannot_change_once_the_job_runs() {
    let app = build_test_app().await;
    let mounted = body_json(
        post_json(&app.router, "/games/sessions", json!({ "kind": "heist", "seed": 3 })).await,
    )
    .await;
    let actions = format!("/games/sessions/{}/actions", mounted["id"].as_str().unwrap());

    for (category, option) in [
        ("approach", "ghost"),
        ("crew", "duo"),
        ("vehicle", "bike"),
        ("escape", "tunnel"),
    ] {
        let picked = post_json(
            &app.router,
            &actions,
            json!({ "type": "select", "category": category, "option": option }),
        )
        .await;
        assert_eq!(picked.status(), StatusCode::OK);
    }
    let unknown = post_json(
        &app.router,
        &actions,
        json!({ "type": "select", "category": "crew", "option": "army" }),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

    let executed = post_json(&app.router, &actions, json!({ "type": "execute" })).await;
    assert_eq!(executed.status(), StatusCode::OK);

    let late = post_json(
        &app.router,
        &actions,
        json!({ "type": "select", "category": "crew", "option": "solo" }),
    )
    .await;
    assert_eq!(late.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn panel_payloads_are_validated() {
    let app = build_test_app().await;

    let empty = post_json(&app.router, "/panel/unlock", json!({ "code": "" })).await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let id = body_json(post_json(&app.router, "/applications", whitelist_form()).await).await["id"]
        .as_str()
        .unwrap()
        .to_string();
    let token = unlock_panel(&app.router).await;
    let long_note = post_json_with_token(
        &app.router,
        &format!("/admin/applications/{id}/status"),
        &token,
        json!({ "status": "approved", "reviewer_note": "x".repeat(2001) }),
    )
    .await;
    assert_eq!(long_note.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_stream_ends_when_the_panel_locks() {
    let app = build_test_app().await;
    let token = unlock_panel(&app.router).await;

    let stream = get(&app.router, &format!("/sse/admin?panel_token={token}")).await;
    assert_eq!(stream.status(), StatusCode::OK);

    let locked = post_json_with_token(&app.router, "/panel/lock", &token, json!({})).await;
    assert_eq!(locked.status(), StatusCode::NO_CONTENT);
    let submitted = post_json(&app.router, "/applications", whitelist_form()).await;
    assert_eq!(submitted.status(), StatusCode::CREATED);

    let body = tokio::time::timeout(Duration::from_secs(5), stream.into_body().collect())
        .await
        .expect("admin stream ends after lock")
        .unwrap()
        .to_bytes();
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("handshake"));
    assert!(!body.contains("application.submitted"));
}
