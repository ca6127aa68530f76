mod common;

use common::TestApp;
use grades_service::models::{GradeRecord, ScoreEntry};
use mongodb::bson::{doc, Document};
use reqwest::Client;

fn record(class_id: i32, learner_id: i32) -> GradeRecord {
    GradeRecord::new(
        class_id,
        learner_id,
        vec![ScoreEntry {
            kind: "quiz".to_string(),
            score: 75.0,
        }],
    )
}

#[tokio::test]
async fn debug_returns_at_most_five_records() {
    let app = TestApp::spawn().await;
    let records: Vec<GradeRecord> = (0..7).map(|i| record(1, i)).collect();
    app.seed_grades(&records).await;

    let client = Client::new();
    let response = client
        .get(format!("{}/grades/debug", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body.as_array().expect("array body").len(), 5);

    app.cleanup().await;
}

#[tokio::test]
async fn debug_returns_whole_collection_when_small() {
    let app = TestApp::spawn().await;
    app.seed_grades(&[record(1, 0), record(2, 1)]).await;

    let client = Client::new();
    let response = client
        .get(format!("{}/grades/debug", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let records = body.as_array().expect("array body");
    assert_eq!(records.len(), 2);
    // Records come back unmodified
    assert_eq!(records[0]["class_id"], 1);
    assert_eq!(records[0]["scores"][0]["type"], "quiz");
    assert_eq!(records[0]["scores"][0]["score"], 75.0);

    app.cleanup().await;
}

#[tokio::test]
async fn debug_returns_non_conforming_documents_verbatim() {
    let app = TestApp::spawn().await;

    // Warn-mode validation lets external writers store documents that do not
    // fit the GradeRecord shape; the debug route must still return them.
    app.db
        .database()
        .collection::<Document>("grades")
        .insert_one(doc! { "learner_id": 1, "note": "imported" }, None)
        .await
        .expect("Failed to insert raw document");

    let client = Client::new();
    let response = client
        .get(format!("{}/grades/debug", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let records = body.as_array().expect("array body");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["learner_id"], 1);
    assert_eq!(records[0]["note"], "imported");
    assert!(records[0].get("class_id").is_none());

    app.cleanup().await;
}

#[tokio::test]
async fn debug_on_empty_collection_is_empty_array() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/grades/debug", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, serde_json::json!([]));

    app.cleanup().await;
}
