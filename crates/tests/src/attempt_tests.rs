use crate::fixtures::test_app::TestApp;
use serde_json::{Value, json};

fn attempt(user_id: &str, score: u8, range: Value) -> Value {
    json!({
        "userId": user_id,
        "verseRange": range,
        "recordingMetadata": { "duration_secs": 4.2, "size_bytes": 67000, "mime_type": "audio/webm" },
        "transcription": {
            "text": "بسم الله الرحمن الرحيم",
            "confidence": 0.9,
            "backend": "gemini",
            "attempts": 1
        },
        "assessment": {
            "score": score,
            "feedback": "",
            "accuracy": { "overall_accuracy": score, "pronunciation": score, "completeness": 100, "ordering": 100 },
            "discrepancies": [],
            "suggestions": [],
            "confidence": 0.8
        }
    })
}

fn fatiha(start: u16, end: u16) -> Value {
    json!({ "start_chapter": 1, "start_verse": start, "end_chapter": 1, "end_verse": end })
}

async fn save(app: &TestApp, body: &Value) -> reqwest::Response {
    app.client
        .post(app.url("/api/attempt"))
        .json(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn saves_attempt_and_updates_ledger() {
    let app = TestApp::spawn().await;

    let resp = save(&app, &attempt("student-1", 95, fatiha(1, 4))).await;

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["ledger_updated"], true);
    assert_eq!(json["attempt_id"].as_str().unwrap().len(), 24);
    assert_eq!(app.attempts.count_for_user("student-1"), 1);

    let resp = app
        .client
        .get(app.url("/api/user/student-1/mastery/1"))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["total_attempts"], 1);
    assert_eq!(json["verses_mastered"], json!([1, 2, 3, 4]));
}

#[tokio::test]
async fn missing_composites_are_rejected() {
    let app = TestApp::spawn().await;

    for field in ["userId", "verseRange", "recordingMetadata", "transcription", "assessment"] {
        let mut body = attempt("student-2", 80, fatiha(1, 1));
        body.as_object_mut().unwrap().remove(field);
        let resp = save(&app, &body).await;
        assert_eq!(resp.status().as_u16(), 400, "without {field}");
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["success"], false);
    }

    let resp = save(&app, &attempt("  ", 80, fatiha(1, 1))).await;
    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(app.attempts.count_for_user("student-2"), 0);
}

#[tokio::test]
async fn ledger_tracks_best_and_average() {
    let app = TestApp::spawn().await;

    for score in [60, 95, 71] {
        let resp = save(&app, &attempt("student-3", score, fatiha(1, 7))).await;
        assert_eq!(resp.status().as_u16(), 200);
    }

    let resp = app
        .client
        .get(app.url("/api/user/student-3/mastery"))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    let entry = &json[0];
    assert_eq!(entry["chapter"], 1);
    assert_eq!(entry["total_attempts"], 3);
    assert_eq!(entry["best_score"], 95);
    assert!((entry["average_score"].as_f64().unwrap() - 226.0 / 3.0).abs() < 1e-9);
    assert_eq!(entry["verses_attempted"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn cross_chapter_attempt_touches_every_chapter() {
    let app = TestApp::spawn().await;

    let range = json!({ "start_chapter": 1, "start_verse": 6, "end_chapter": 2, "end_verse": 5 });
    let resp = save(&app, &attempt("student-4", 91, range)).await;
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .client
        .get(app.url("/api/user/student-4/mastery"))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[0]["verses_attempted"], json!([6, 7]));
    assert_eq!(json[1]["verses_mastered"], json!([1, 2, 3, 4, 5]));
}

#[tokio::test]
async fn history_is_newest_first_and_paginated() {
    let app = TestApp::spawn().await;

    let mut ids = Vec::new();
    for score in [10, 20, 30] {
        let json: Value = save(&app, &attempt("student-5", score, fatiha(1, 1)))
            .await
            .json()
            .await
            .unwrap();
        ids.push(json["attempt_id"].as_str().unwrap().to_string());
    }

    let resp = app
        .client
        .get(app.url("/api/user/student-5/attempt?page=1&per_page=2"))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["total"], 3);
    assert_eq!(json["total_pages"], 2);
    assert_eq!(json["items"].as_array().unwrap().len(), 2);
    assert_eq!(json["items"][0]["assessment"]["score"], 30);
    assert_eq!(json["items"][0]["reference"], "1:1");

    let resp = app
        .client
        .get(app.url(&format!("/api/user/student-5/attempt/{}", ids[0])))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["assessment"]["score"], 10);

    // Attempts are only visible to their owner
    let resp = app
        .client
        .get(app.url(&format!("/api/user/someone-else/attempt/{}", ids[0])))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let resp = app
        .client
        .get(app.url("/api/user/student-5/attempt/not-an-id"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn out_of_range_numbers_are_clamped_not_rejected() {
    let app = TestApp::spawn().await;

    let mut body = attempt("student-6", 80, fatiha(1, 2));
    body["assessment"]["score"] = json!(150);
    body["assessment"]["accuracy"]["pronunciation"] = json!(-5);
    body["transcription"]["confidence"] = json!(7.5);
    let resp = save(&app, &body).await;
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .client
        .get(app.url("/api/user/student-6/attempt"))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    let stored = &json["items"][0];
    assert_eq!(stored["assessment"]["score"], 100);
    assert_eq!(stored["assessment"]["accuracy"]["pronunciation"], 0);
    assert_eq!(stored["transcription"]["confidence"], 1.0);
}

#[tokio::test]
async fn ledger_ignores_verses_past_chapter_end() {
    let app = TestApp::spawn().await;

    let resp = save(&app, &attempt("student-7", 95, fatiha(5, 40))).await;
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .client
        .get(app.url("/api/user/student-7/mastery/1"))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["verses_attempted"], json!([5, 6, 7]));
    assert_eq!(json["verses_mastered"], json!([5, 6, 7]));
}
