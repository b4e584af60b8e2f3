mod common;

use axum::http::StatusCode;
use chrono::{NaiveDate, TimeZone, Utc, Weekday};
use common::{upcoming, TestApp};
use serde_json::{json, Value};

async fn quote(app: &TestApp, payload: Value) -> (StatusCode, Value) {
    app.request("POST", "/api/v1/bookings/quote", None, Some(payload)).await
}

#[tokio::test]
async fn test_quote_picks_matching_tier() {
    let app = TestApp::new().await;
    let resource = app.seed_resource("Room A").await;

    let (status, small) = quote(&app, json!({
        "resource_id": resource.id, "participants": 3, "hours": 1.5, "activity_type": "rehearsal"
    })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(small["price_per_hour"], 10_000);
    assert_eq!(small["minutes"], 90);
    assert_eq!(small["total_price"], 15_000);
    assert!(small["available"].is_null());

    let (_, band) = quote(&app, json!({
        "resource_id": resource.id, "participants": 12, "hours": 2, "activity_type": "rehearsal"
    })).await;
    assert_eq!(band["price_per_hour"], 15_000);
    assert_eq!(band["total_price"], 30_000);

    // 9950 * 75 / 60 = 12437.5, rounded half up
    let (_, lesson) = quote(&app, json!({
        "resource_id": resource.id, "participants": 1, "hours": 1.25, "activity_type": "lesson"
    })).await;
    assert_eq!(lesson["total_price"], 12_438);
}

#[tokio::test]
async fn test_quote_rejects_unpriced_or_invalid_requests() {
    let app = TestApp::new().await;
    let resource = app.seed_resource("Room A").await;

    let (status, body) = quote(&app, json!({
        "resource_id": resource.id, "participants": 3, "hours": 1, "activity_type": "workshop"
    })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, _) = quote(&app, json!({
        "resource_id": resource.id, "participants": 3, "hours": 1, "activity_type": "rehearsal", "is_commercial": true
    })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let invalid = [
        json!({"resource_id": resource.id, "participants": 21, "hours": 1, "activity_type": "rehearsal"}),
        json!({"resource_id": resource.id, "participants": 0, "hours": 1, "activity_type": "rehearsal"}),
        json!({"resource_id": resource.id, "participants": 3, "hours": 1.1, "activity_type": "rehearsal"}),
        json!({"resource_id": resource.id, "participants": 3, "hours": 0, "activity_type": "rehearsal"}),
        json!({"resource_id": resource.id, "participants": 3, "hours": 24.25, "activity_type": "rehearsal"}),
        json!({"resource_id": resource.id, "participants": 3, "hours": 1e15, "activity_type": "rehearsal"}),
        json!({"resource_id": resource.id, "participants": 3, "hours": 1, "activity_type": "rehearsal", "date": "2026-01-27"}),
    ];
    for payload in invalid {
        let (status, _) = quote(&app, payload.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", payload);
    }
}

#[tokio::test]
async fn test_quote_reports_slot_availability() {
    let app = TestApp::new().await;
    let resource = app.seed_resource("Room A").await;
    let date = upcoming(Weekday::Tue);

    let (_, free) = quote(&app, json!({
        "resource_id": resource.id, "participants": 3, "hours": 1, "activity_type": "rehearsal",
        "date": date, "start_time": "10:00"
    })).await;
    assert_eq!(free["available"], true);

    let day = NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap();
    let local = chrono_tz::Asia::Jerusalem
        .from_local_datetime(&day.and_hms_opt(10, 30, 0).unwrap())
        .single()
        .unwrap();
    app.insert_booking(&resource.id, "user-9", local.with_timezone(&Utc), 60).await;

    let (status, taken) = quote(&app, json!({
        "resource_id": resource.id, "participants": 3, "hours": 1, "activity_type": "rehearsal",
        "date": date, "start_time": "10:00"
    })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(taken["available"], false);
    assert_eq!(taken["total_price"], 10_000);

    let (_, closed) = quote(&app, json!({
        "resource_id": resource.id, "participants": 3, "hours": 2, "activity_type": "rehearsal",
        "date": date, "start_time": "21:00"
    })).await;
    assert_eq!(closed["available"], false);
}
