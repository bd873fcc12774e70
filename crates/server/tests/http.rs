use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;
use voltdesk_core::entities::Vendor;
use voltdesk_core::{Mutation, Uid};
use voltdesk_server::{build_router, AppState};

fn vendor(name: &str, city: &str, category: &str, status: &str) -> Vendor {
    Vendor {
        uid: Uid::new(),
        name: name.into(),
        city: city.into(),
        category: category.into(),
        status: status.into(),
        gst_no: None,
        rating: 4.0,
        onboarded_on: NaiveDate::from_ymd_opt(2023, 6, 15).unwrap(),
    }
}

fn seeded_state() -> AppState {
    let state = AppState::new();
    state.vendors.apply(vec![
        Mutation::Upsert(vendor("Shakti Auto Castings", "Pune", "Castings", "Active")),
        Mutation::Upsert(vendor("Meridian Wheels", "Chennai", "Wheels", "Active")),
        Mutation::Upsert(vendor("Apex Harness Works", "Pune", "Wiring", "Blocked")),
    ]);
    state
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn list_applies_filter_and_search() {
    let app = build_router(&seeded_state());
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/v1/vendors?q=castings&filter_field=city&filter_value=pune")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["total_matching"], 1);
    assert_eq!(body["items"][0]["name"], "Shakti Auto Castings");
}

#[tokio::test]
async fn list_paginates_with_metadata() {
    let app = build_router(&seeded_state());
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/v1/vendors?page=2&page_size=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["total_matching"], 3);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["page"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn zero_page_size_is_a_validation_error() {
    let app = build_router(&seeded_state());
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/v1/vendors?page_size=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "validation");
}

#[tokio::test]
async fn dangling_filter_field_is_rejected() {
    let app = build_router(&seeded_state());
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/v1/vendors?filter_field=city")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_assigns_uid_and_returns_201() {
    let app = build_router(&AppState::new());
    let payload = json!({
        "name": "Nova Battery Labs",
        "city": "Bengaluru",
        "category": "Batteries",
        "status": "Active",
        "rating": 4.8,
        "onboarded_on": "2024-01-09"
    });
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/vendors")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    let uid = body["uid"].as_str().unwrap();
    assert!(uid.parse::<Uid>().is_ok());
}

#[tokio::test]
async fn get_patch_delete_round_trip() {
    let state = seeded_state();
    let uid = state.vendors.current().items[0].uid;
    let path = format!("/v1/vendors/{uid}");

    let resp = build_router(&state)
        .oneshot(Request::builder().uri(&path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = build_router(&state)
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(&path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "status": "Blocked" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "Blocked");
    assert_eq!(body["name"], "Shakti Auto Castings");

    let resp = build_router(&state)
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = build_router(&state)
        .oneshot(Request::builder().uri(&path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_may_not_change_the_uid() {
    let state = seeded_state();
    let uid = state.vendors.current().items[0].uid;
    let resp = build_router(&state)
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/v1/vendors/{uid}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "uid": Uid::new().to_string() }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_uid_is_not_found_and_garbage_uid_is_invalid() {
    let state = seeded_state();
    let resp = build_router(&state)
        .oneshot(
            Request::builder()
                .uri(format!("/v1/vendors/{}", Uid::new()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "not_found");

    let resp = build_router(&state)
        .oneshot(
            Request::builder()
                .uri("/v1/vendors/not-a-uid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn readyz_reports_an_epoch_per_kind() {
    let state = seeded_state();
    let resp = build_router(&state)
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["epochs"]["vendors"], 1);
    assert_eq!(body["epochs"]["users"], 0);
}
